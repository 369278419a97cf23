//! Mission report: everything the report generator needs once a run is over.
//!
//! [`MissionRecord`] is the scoring summary built at the terminal
//! transition. [`MissionReport`] adds the participants and the per-puzzle
//! competency rows; it can only be built from a terminal mission.

pub mod text;

use crate::domain::attempts::{AttemptTracker, CompetencyLevel};
use crate::domain::puzzle::PuzzleId;
use crate::error::MissionError;
use crate::sim::mission::MissionState;
use crate::sim::session::Participants;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MissionRecord {
    pub won: bool,
    pub time_remaining_secs: u32,
    pub total_secs: u32,
    /// False once any earlier run of the session has failed.
    pub first_attempt_of_session: bool,
    pub error_count: u32,
    pub score: u32,
    pub max_score: u32,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PuzzleSummary {
    pub puzzle: PuzzleId,
    pub skill: &'static str,
    pub attempts: u32,
    pub succeeded: bool,
    pub competency: CompetencyLevel,
}

impl PuzzleSummary {
    /// Attempts as printed in the report: three or more read "2+".
    pub fn attempts_label(&self) -> String {
        match self.attempts {
            0..=2 => self.attempts.to_string(),
            _ => "2+".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MissionReport {
    pub record: MissionRecord,
    pub participants: Participants,
    pub puzzles: Vec<PuzzleSummary>,
    pub competency_table: &'static [(CompetencyLevel, &'static str)],
}

impl MissionReport {
    /// Aggregate a finished run. Fails if the mission is not terminal.
    pub fn build(
        state: MissionState,
        record: Option<&MissionRecord>,
        tracker: &AttemptTracker,
        participants: &Participants,
    ) -> Result<Self, MissionError> {
        let record = match (state.is_terminal(), record) {
            (true, Some(record)) => *record,
            _ => return Err(MissionError::NotTerminal { state }),
        };

        let puzzles = tracker
            .iter()
            .map(|(puzzle, entry)| PuzzleSummary {
                puzzle,
                skill: puzzle.skill(),
                attempts: entry.attempts,
                succeeded: entry.succeeded,
                competency: CompetencyLevel::from_attempt(entry),
            })
            .collect();

        Ok(MissionReport {
            record,
            participants: participants.clone(),
            puzzles,
            competency_table: &CompetencyLevel::TABLE,
        })
    }
}

/// `mm:ss`, as shown on the HUD and in reports.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
