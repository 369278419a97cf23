//! Net Escape core: mission state machine, countdown, attempt tracking,
//! scoring and reporting for a five-puzzle networking escape game.
//!
//! The crate has no I/O of its own apart from saving text reports and
//! loading `config.toml`; the terminal front-end lives in the binary.

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod report;
pub mod sim;

pub use domain::attempts::{AttemptTracker, CompetencyLevel, Outcome};
pub use domain::puzzle::{Answer, FlowStep, Network, PuzzleId};
pub use error::{ConfigError, MissionError, ReportError};
pub use report::{MissionRecord, MissionReport};
pub use sim::event::{AlertKind, Cue, MissionEvent};
pub use sim::mission::{Mission, MissionSettings, MissionState};
pub use sim::session::{Participants, Session};
