// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_config_validates() {
    assert!(MatchConfig::default().validated().is_ok());
}

#[test]
fn zero_tick_rate_is_rejected() {
    let config = MatchConfig {
        tick_rate: 0,
        ..MatchConfig::default()
    };
    assert!(matches!(config.validated(), Err(ConfigError::InvalidTickRate)));
}
