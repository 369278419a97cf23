//! Plain-text rendering of a [`MissionReport`] and saving it to disk.

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use super::{format_clock, MissionReport};
use crate::error::ReportError;

const TITLE: &str = "Net Escape - Mission report";
const RULE: &str = "----------------------------------------";

pub fn render(report: &MissionReport, generated: DateTime<Local>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, report, generated);
    out
}

fn write_report(out: &mut String, report: &MissionReport, generated: DateTime<Local>) -> fmt::Result {
    let r = &report.record;
    let p = &report.participants;

    writeln!(out, "{TITLE}")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Date    : {}", generated.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "Teacher : {}", p.teacher())?;
    if p.agents().is_empty() {
        writeln!(out, "Agents  : (none)")?;
    } else {
        writeln!(out, "Agents  : {}", p.agents().join(", "))?;
    }

    writeln!(out)?;
    writeln!(out, "Mission summary")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Status         : {}", if r.won { "SUCCEEDED" } else { "FAILED" })?;
    writeln!(out, "Score          : {} / {}", r.score, r.max_score)?;
    writeln!(out, "Total time     : {}", format_clock(r.total_secs))?;
    writeln!(out, "Time remaining : {}", format_clock(r.time_remaining_secs))?;
    writeln!(
        out,
        "First attempt  : {}",
        if r.first_attempt_of_session { "yes" } else { "no" }
    )?;
    writeln!(out, "Errors         : {}", r.error_count)?;

    writeln!(out)?;
    writeln!(out, "Skills assessment")?;
    writeln!(out, "{RULE}")?;
    for row in &report.puzzles {
        writeln!(out, "* {} : {}", row.skill, row.competency)?;
    }

    writeln!(out)?;
    writeln!(out, "Detail by puzzle")?;
    writeln!(out, "{RULE}")?;
    for row in &report.puzzles {
        writeln!(
            out,
            "Puzzle {} : {} | Attempts : {}",
            row.puzzle.number(),
            if row.succeeded { "Solved" } else { "Not solved" },
            row.attempts_label(),
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Levels")?;
    for (level, rule) in report.competency_table {
        writeln!(out, "  {:<18} {rule}", level.label())?;
    }

    Ok(())
}

/// Write the report to `<dir>/mission_report_<timestamp>.txt`.
pub fn save(report: &MissionReport, dir: &Path, generated: DateTime<Local>) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(format!("mission_report_{}.txt", generated.format("%Y%m%d_%H%M%S")));
    std::fs::write(&path, render(report, generated)).map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), won = report.record.won, "mission report saved");
    Ok(path)
}
