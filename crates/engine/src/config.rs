// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-match queue sizing and tick rate.
//!
//! The core itself never reads environment variables or files (see the
//! spec's external-interfaces boundary note) — an embedding host is
//! expected to build a `MatchConfig` from its own configuration source and
//! validate it before calling `MatchHandler::new`.

/// Three queue capacities and a tick rate. Zero means unbuffered for a
/// queue size; `tick_rate` must be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    pub input_queue_size: usize,
    pub call_queue_size: usize,
    pub join_attempt_queue_size: usize,
    pub tick_rate: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            input_queue_size: 128,
            call_queue_size: 64,
            join_attempt_queue_size: 32,
            tick_rate: 10,
        }
    }
}

impl MatchConfig {
    /// Validate and return `self`, or the reason it cannot be used.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::InvalidTickRate);
        }
        Ok(self)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("tick rate must be >= 1")]
    InvalidTickRate,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
