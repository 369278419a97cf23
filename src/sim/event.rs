//! Events emitted by the mission.
//! The presentation layer consumes these for feedback and sound.

use crate::domain::puzzle::PuzzleId;

/// Timer notifications delivered to alert observers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AlertKind {
    FiveMinutesLeft,
    ThirtySecondsLeft,
    TimeUp,
}

/// Sound cue identifiers understood by the audio layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cue {
    AlertFiveMinute,
    AlertThirtySecond,
    PuzzleCorrect,
    PuzzleIncorrect,
    MissionSucceeded,
    MissionFailed,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum MissionEvent {
    Started { run: u32 },
    Alert(AlertKind),
    PuzzleSolved { puzzle: PuzzleId, attempts: u32 },
    PuzzleMissed { puzzle: PuzzleId, attempts: u32 },
    LockoutStarted { puzzle: PuzzleId, seconds: u64 },
    LockoutEnded { puzzle: PuzzleId },
    Paused,
    Resumed,
    Succeeded { score: u32, max_score: u32 },
    Failed,
    RestartScheduled { seconds: u64 },
}

impl MissionEvent {
    pub fn cue(&self) -> Option<Cue> {
        match self {
            MissionEvent::Alert(AlertKind::FiveMinutesLeft) => Some(Cue::AlertFiveMinute),
            MissionEvent::Alert(AlertKind::ThirtySecondsLeft) => Some(Cue::AlertThirtySecond),
            MissionEvent::PuzzleSolved { .. } => Some(Cue::PuzzleCorrect),
            MissionEvent::PuzzleMissed { .. } => Some(Cue::PuzzleIncorrect),
            MissionEvent::Succeeded { .. } => Some(Cue::MissionSucceeded),
            MissionEvent::Failed => Some(Cue::MissionFailed),
            _ => None,
        }
    }
}
