//! Logging initialization.
//!
//! The terminal is in raw mode while the game runs, so log lines go to a
//! file instead of stderr. `NETESCAPE_LOG` overrides the configured filter.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

pub const LOG_ENV: &str = "NETESCAPE_LOG";

/// Build the filter: environment first, then the configured directive,
/// then `info` if the configured one does not parse.
pub fn build_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Safe to call more than once.
///
/// Returns false when the log file could not be opened; logging is then
/// discarded rather than written over the game screen.
pub fn init_logging(cfg: &LogConfig) -> bool {
    let filter = build_filter(&cfg.level);
    let file = OpenOptions::new().create(true).append(true).open(&cfg.file);

    match file {
        Ok(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file))
                .try_init();
            true
        }
        Err(_) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .try_init();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn bad_directive_falls_back() {
        // Must not panic whatever the environment holds.
        let _ = build_filter("not a [valid filter");
    }

    #[test]
    fn init_logging_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LogConfig { file: dir.path().join("game.log"), level: "debug".into() };
        assert!(init_logging(&cfg));
        assert!(init_logging(&cfg));
        assert!(cfg.file.exists());
    }

    #[test]
    fn unwritable_log_file_reports_false() {
        let cfg = LogConfig {
            file: PathBuf::from("/nonexistent-dir/definitely/missing/game.log"),
            level: "info".into(),
        };
        assert!(!init_logging(&cfg));
    }
}
