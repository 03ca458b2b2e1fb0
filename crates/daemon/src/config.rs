// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: paths and per-match defaults.

use std::path::PathBuf;

use match_engine::MatchConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/matchd).
    pub state_dir: PathBuf,
    /// Path to the daemon log file.
    pub log_path: PathBuf,
    /// Node name this daemon presents to collaborators.
    pub node: String,
    /// Default per-match queue sizing and tick rate, used when a match's
    /// creator doesn't override it.
    pub default_match_config: MatchConfig,
}

impl Config {
    /// Loads configuration from the environment.
    ///
    /// `MATCHD_STATE_DIR` takes priority (used by tests for isolation), then
    /// `XDG_STATE_HOME/matchd`, then `~/.local/state/matchd`.
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = state_dir()?;
        let node = std::env::var("MATCHD_NODE").unwrap_or_else(|_| "local".to_string());

        Ok(Self {
            log_path: state_dir.join("matchd.log"),
            state_dir,
            node,
            default_match_config: MatchConfig::default(),
        })
    }
}

fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("MATCHD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }

    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("matchd"));
    }

    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/matchd"))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine a state directory: neither MATCHD_STATE_DIR, XDG_STATE_HOME, nor HOME is set")]
    NoStateDir,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
