//! External configuration loader.
//!
//! Reads `config.toml` from the executable's directory, the working
//! directory, or `~/.local/share/netescape`. A missing file or missing keys
//! fall back to defaults; a file that does not parse is reported so the
//! caller can log it and carry on with defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::domain::puzzle::PuzzleId;
use crate::error::ConfigError;
use crate::sim::mission::MissionSettings;

const CONFIG_FILE: &str = "config.toml";

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub report_dir: PathBuf,
    pub log: LogConfig,
    pub sound_enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub frame_ms: u64,
    pub ping_lockout_secs: u64,
    pub network_reset_secs: u64,
    /// 0 disables the automatic restart after a failed run.
    pub auto_restart_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    pub file: PathBuf,
    /// `tracing` filter directive, e.g. `info` or `netescape=debug`.
    pub level: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    report: TomlReport,
    #[serde(default)]
    log: TomlLog,
    #[serde(default)]
    sound: TomlSound,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct TomlTiming {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_ping_lockout")]
    ping_lockout_secs: u64,
    #[serde(default = "default_network_reset")]
    network_reset_secs: u64,
    #[serde(default = "default_auto_restart")]
    auto_restart_secs: u64,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct TomlReport {
    #[serde(default = "default_report_dir")]
    dir: String,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct TomlSound {
    #[serde(default = "default_sound_enabled")]
    enabled: bool,
}

// ── Defaults ──

fn default_frame_ms() -> u64 { 50 }
fn default_ping_lockout() -> u64 { 10 }
fn default_network_reset() -> u64 { 10 }
fn default_auto_restart() -> u64 { 60 }
fn default_report_dir() -> String { "reports".into() }
fn default_log_file() -> String { "netescape.log".into() }
fn default_log_level() -> String { "info".into() }
fn default_sound_enabled() -> bool { true }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            frame_ms: default_frame_ms(),
            ping_lockout_secs: default_ping_lockout(),
            network_reset_secs: default_network_reset(),
            auto_restart_secs: default_auto_restart(),
        }
    }
}

impl Default for TomlReport {
    fn default() -> Self {
        TomlReport { dir: default_report_dir() }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { file: default_log_file(), level: default_log_level() }
    }
}

impl Default for TomlSound {
    fn default() -> Self {
        TomlSound { enabled: default_sound_enabled() }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        GameConfig {
            timing: TimingConfig {
                frame_ms: t.timing.frame_ms.max(1),
                ping_lockout_secs: t.timing.ping_lockout_secs,
                network_reset_secs: t.timing.network_reset_secs,
                auto_restart_secs: t.timing.auto_restart_secs,
            },
            report_dir: PathBuf::from(t.report.dir),
            log: LogConfig {
                file: PathBuf::from(t.log.file),
                level: t.log.level,
            },
            sound_enabled: t.sound.enabled,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

// ── Loading ──

impl GameConfig {
    /// Load `config.toml` from the first candidate directory that has one.
    /// No file at all is not an error: defaults are returned.
    pub fn load() -> Result<Self, ConfigError> {
        for dir in candidate_dirs() {
            let path = dir.join(CONFIG_FILE);
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parse config text; `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str::<TomlConfig>(text)
            .map(GameConfig::from)
            .map_err(|e| ConfigError::Parse {
                path: origin.to_path_buf(),
                message: e.message().to_string(),
            })
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_millis(self.timing.frame_ms)
    }

    pub fn network_reset(&self) -> Duration {
        Duration::from_secs(self.timing.network_reset_secs)
    }

    pub fn mission_settings(&self) -> MissionSettings {
        let mut settings = MissionSettings::default();
        settings.lockouts[PuzzleId::Ping.index()] = match self.timing.ping_lockout_secs {
            0 => None,
            s => Some(Duration::from_secs(s)),
        };
        settings.auto_restart = match self.timing.auto_restart_secs {
            0 => None,
            s => Some(Duration::from_secs(s)),
        };
        settings
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.contains(&cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/netescape)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(home).join(".local/share/netescape");
        if xdg.is_dir() && !dirs.contains(&xdg) {
            dirs.push(xdg);
        }
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<GameConfig, ConfigError> {
        GameConfig::parse(text, Path::new("config.toml"))
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg, GameConfig::default());
        assert_eq!(cfg.timing.ping_lockout_secs, 10);
        assert_eq!(cfg.timing.auto_restart_secs, 60);
        assert_eq!(cfg.report_dir, PathBuf::from("reports"));
        assert!(cfg.sound_enabled);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = parse("[timing]\nping_lockout_secs = 5\n\n[sound]\nenabled = false\n").unwrap();
        assert_eq!(cfg.timing.ping_lockout_secs, 5);
        assert_eq!(cfg.timing.network_reset_secs, 10);
        assert!(!cfg.sound_enabled);
        assert_eq!(cfg.log.level, "info");
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let err = parse("[timing\nframe_ms = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let err = parse("[timing]\nframe_ms = \"fast\"\n").unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert!(parse("[speed]\ntick_rate_ms = 75\n").is_err());
    }

    #[test]
    fn misspelled_key_is_rejected() {
        let err = parse("[timing]\nping_lockout_sec = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(parse("[sound]\nenable = false\n").is_err());
    }

    #[test]
    fn zero_delays_disable_lockout_and_restart() {
        let cfg = parse("[timing]\nping_lockout_secs = 0\nauto_restart_secs = 0\n").unwrap();
        let s = cfg.mission_settings();
        assert_eq!(s.lockout_for(PuzzleId::Ping), None);
        assert_eq!(s.auto_restart, None);
    }

    #[test]
    fn settings_follow_config() {
        let cfg = parse("[timing]\nping_lockout_secs = 15\nauto_restart_secs = 30\n").unwrap();
        let s = cfg.mission_settings();
        assert_eq!(s.lockout_for(PuzzleId::Ping), Some(Duration::from_secs(15)));
        assert_eq!(s.lockout_for(PuzzleId::Wifi), None);
        assert_eq!(s.auto_restart, Some(Duration::from_secs(30)));
    }

    #[test]
    fn load_from_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[report]\ndir = \"out\"\n").unwrap();
        let cfg = GameConfig::load_from(&path).unwrap();
        assert_eq!(cfg.report_dir, PathBuf::from("out"));
    }
}
