//! On-disk daemon configuration (`nova-daemon.toml`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn default_log_file() -> PathBuf {
    PathBuf::from("nova-daemon.log")
}

fn default_backlog_batch_size() -> usize {
    256
}

/// Configuration loaded once at startup and held for the process lifetime.
/// Unlike `PathResolver`, this is never mutated after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Directory the log file and its rotated predecessor are written to.
    pub log_dir: PathBuf,
    /// Log file name within `log_dir`.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// How many backlog entries the Change-Backlog Processor drains per
    /// cooperative step before yielding back to the daemon loop.
    #[serde(default = "default_backlog_batch_size")]
    pub backlog_batch_size: usize,
    /// Directory materialized standard-library stub files are written to.
    pub stdlib_stub_dir: PathBuf,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("."),
            log_file: default_log_file(),
            backlog_batch_size: default_backlog_batch_size(),
            stdlib_stub_dir: std::env::temp_dir().join("nova-daemon-stdlib-stubs"),
        }
    }
}

impl DaemonConfig {
    /// Load from a TOML file, falling back to defaults if it does not exist.
    pub fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}
