//! Session context: what survives from one mission run to the next
//! within a single process. Never persisted.

use crate::domain::puzzle::{PuzzleContext, DEFAULT_LEAD_AGENT};

pub const MAX_AGENTS: usize = 4;
pub const DEFAULT_TEACHER: &str = "Teacher";

/// Names typed on the setup screen. Labels only.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Participants {
    teacher: String,
    agents: Vec<String>,
}

impl Participants {
    /// Names are trimmed, blank agents dropped, extra agents ignored.
    pub fn new<I, S>(teacher: &str, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let teacher = match teacher.trim() {
            "" => DEFAULT_TEACHER.to_string(),
            t => t.to_string(),
        };
        let agents = agents
            .into_iter()
            .map(|a| a.as_ref().trim().to_string())
            .filter(|a| !a.is_empty())
            .take(MAX_AGENTS)
            .collect();
        Participants { teacher, agents }
    }

    pub fn teacher(&self) -> &str {
        &self.teacher
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    /// First named agent; shown in the ping prompt.
    pub fn lead_agent(&self) -> &str {
        self.agents.first().map_or(DEFAULT_LEAD_AGENT, String::as_str)
    }
}

impl Default for Participants {
    fn default() -> Self {
        Participants::new("", std::iter::empty::<&str>())
    }
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    participants: Participants,
    has_failed_once: bool,
    runs_started: u32,
    runs_failed: u32,
}

impl Session {
    pub fn new(participants: Participants) -> Self {
        Session { participants, ..Default::default() }
    }

    pub fn participants(&self) -> &Participants {
        &self.participants
    }

    pub fn set_participants(&mut self, participants: Participants) {
        self.participants = participants;
    }

    pub fn puzzle_context(&self) -> PuzzleContext {
        PuzzleContext::new(self.participants.lead_agent())
    }

    pub fn has_failed_once(&self) -> bool {
        self.has_failed_once
    }

    pub fn runs_started(&self) -> u32 {
        self.runs_started
    }

    pub fn runs_failed(&self) -> u32 {
        self.runs_failed
    }

    /// Returns the 1-based run number.
    pub(crate) fn begin_run(&mut self) -> u32 {
        self.runs_started += 1;
        self.runs_started
    }

    pub(crate) fn record_failure(&mut self) {
        self.has_failed_once = true;
        self.runs_failed += 1;
    }
}
