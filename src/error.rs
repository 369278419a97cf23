//! Error types.
//!
//! Wrong answers are not errors; they are `Outcome::Retry`. What ends up
//! here is integration misuse and I/O at the edges.

use std::path::PathBuf;

use thiserror::Error;

use crate::sim::mission::MissionState;

/// Misuse of the mission API by the presentation layer.
#[derive(Debug, Error)]
pub enum MissionError {
    /// The report only exists once the mission has succeeded or failed.
    #[error("mission report requested while mission is {state:?}")]
    NotTerminal { state: MissionState },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("could not write report to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::puzzle::PuzzleId;

    #[test]
    fn not_terminal_names_the_state() {
        let err = MissionError::NotTerminal { state: MissionState::InProgress(PuzzleId::Ping) };
        assert_eq!(err.to_string(), "mission report requested while mission is InProgress(Ping)");
    }

    #[test]
    fn io_error_keeps_its_source() {
        let err = ReportError::Io {
            path: PathBuf::from("reports/x.txt"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("reports/x.txt"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
