//! Attempt bookkeeping for the five puzzles of a run.
//!
//! The first attempt at a puzzle is free; every further attempt on the
//! same puzzle counts as one error, whether or not it ends in success.

use std::fmt;

use super::puzzle::PuzzleId;

/// Result of recording one validation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Advance,
    Retry,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PuzzleAttempt {
    pub attempts: u32,
    /// Only ever goes false → true within a run.
    pub succeeded: bool,
}

impl PuzzleAttempt {
    pub fn errors(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}

/// Formative mastery label derived from a puzzle's attempts.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CompetencyLevel {
    NotAchieved,
    VeryGoodMastery,
    Satisfactory,
    Fragile,
}

impl CompetencyLevel {
    /// Label table handed to the report, with the rule behind each label.
    pub const TABLE: [(CompetencyLevel, &'static str); 4] = [
        (CompetencyLevel::VeryGoodMastery, "solved on the first attempt"),
        (CompetencyLevel::Satisfactory, "solved on the second attempt"),
        (CompetencyLevel::Fragile, "solved after three or more attempts"),
        (CompetencyLevel::NotAchieved, "not solved"),
    ];

    pub fn from_attempt(entry: &PuzzleAttempt) -> Self {
        match (entry.succeeded, entry.attempts) {
            (false, _) => CompetencyLevel::NotAchieved,
            (true, 0 | 1) => CompetencyLevel::VeryGoodMastery,
            (true, 2) => CompetencyLevel::Satisfactory,
            (true, _) => CompetencyLevel::Fragile,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompetencyLevel::NotAchieved => "Not achieved",
            CompetencyLevel::VeryGoodMastery => "Very good mastery",
            CompetencyLevel::Satisfactory => "Satisfactory",
            CompetencyLevel::Fragile => "Fragile",
        }
    }
}

impl fmt::Display for CompetencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry per puzzle, indexed by [`PuzzleId::index`].
#[derive(Clone, Debug, Default)]
pub struct AttemptTracker {
    entries: [PuzzleAttempt; 5],
}

impl AttemptTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one submission. Recording on an already solved puzzle still
    /// counts the attempt but leaves it solved.
    pub fn record_attempt(&mut self, puzzle: PuzzleId, correct: bool) -> Outcome {
        let entry = &mut self.entries[puzzle.index()];
        entry.attempts = entry.attempts.saturating_add(1);
        if correct {
            entry.succeeded = true;
            Outcome::Advance
        } else {
            Outcome::Retry
        }
    }

    pub fn get(&self, puzzle: PuzzleId) -> &PuzzleAttempt {
        &self.entries[puzzle.index()]
    }

    pub fn error_count(&self) -> u32 {
        self.entries.iter().map(PuzzleAttempt::errors).sum()
    }

    pub fn competency(&self, puzzle: PuzzleId) -> CompetencyLevel {
        CompetencyLevel::from_attempt(self.get(puzzle))
    }

    pub fn iter(&self) -> impl Iterator<Item = (PuzzleId, &PuzzleAttempt)> {
        PuzzleId::ALL.into_iter().zip(self.entries.iter())
    }

    pub fn reset(&mut self) {
        self.entries = Default::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_answer_retries_and_counts() {
        let mut t = AttemptTracker::new();
        assert_eq!(t.record_attempt(PuzzleId::Wifi, false), Outcome::Retry);
        assert_eq!(t.get(PuzzleId::Wifi).attempts, 1);
        assert!(!t.get(PuzzleId::Wifi).succeeded);
    }

    #[test]
    fn first_try_contributes_no_error() {
        let mut t = AttemptTracker::new();
        assert_eq!(t.record_attempt(PuzzleId::Cabling, true), Outcome::Advance);
        assert_eq!(t.error_count(), 0);
    }

    #[test]
    fn errors_sum_extra_attempts_across_puzzles() {
        let mut t = AttemptTracker::new();
        t.record_attempt(PuzzleId::Cabling, false);
        t.record_attempt(PuzzleId::Cabling, true);
        t.record_attempt(PuzzleId::Ping, false);
        t.record_attempt(PuzzleId::Ping, false);
        t.record_attempt(PuzzleId::Ping, false);
        assert_eq!(t.error_count(), 1 + 2);
    }

    #[test]
    fn repeated_success_stays_succeeded_and_counts_attempts() {
        let mut t = AttemptTracker::new();
        t.record_attempt(PuzzleId::IpAddressing, true);
        t.record_attempt(PuzzleId::IpAddressing, true);
        let e = t.get(PuzzleId::IpAddressing);
        assert!(e.succeeded);
        assert_eq!(e.attempts, 2);
    }

    #[test]
    fn failure_after_success_does_not_unset_success() {
        let mut t = AttemptTracker::new();
        t.record_attempt(PuzzleId::Wifi, true);
        t.record_attempt(PuzzleId::Wifi, false);
        assert!(t.get(PuzzleId::Wifi).succeeded);
    }

    #[test]
    fn competency_follows_attempt_count() {
        let mut t = AttemptTracker::new();
        assert_eq!(t.competency(PuzzleId::Cabling), CompetencyLevel::NotAchieved);

        t.record_attempt(PuzzleId::Cabling, true);
        assert_eq!(t.competency(PuzzleId::Cabling), CompetencyLevel::VeryGoodMastery);

        t.record_attempt(PuzzleId::Wifi, false);
        t.record_attempt(PuzzleId::Wifi, true);
        assert_eq!(t.competency(PuzzleId::Wifi), CompetencyLevel::Satisfactory);

        for _ in 0..4 {
            t.record_attempt(PuzzleId::Ping, false);
        }
        assert_eq!(t.competency(PuzzleId::Ping), CompetencyLevel::NotAchieved);
        t.record_attempt(PuzzleId::Ping, true);
        assert_eq!(t.competency(PuzzleId::Ping), CompetencyLevel::Fragile);
    }

    #[test]
    fn reset_clears_everything() {
        let mut t = AttemptTracker::new();
        t.record_attempt(PuzzleId::Troubleshooting, false);
        t.record_attempt(PuzzleId::Troubleshooting, true);
        t.reset();
        assert!(t.iter().all(|(_, e)| e.attempts == 0 && !e.succeeded));
    }

    #[test]
    fn labels_match_table() {
        assert_eq!(CompetencyLevel::NotAchieved.to_string(), "Not achieved");
        assert_eq!(CompetencyLevel::Fragile.label(), "Fragile");
        assert_eq!(CompetencyLevel::TABLE.len(), 4);
    }
}
