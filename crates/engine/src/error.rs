// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by handler construction.
//!
//! Everything that can go wrong *after* a `MatchHandler` exists is not
//! represented as a `Result` returned up a call stack — a mid-life callback
//! failure stops the match in isolation (see `handler::Inner::self_stop`),
//! matching the propagation policy that no caller is positioned to recover
//! a single match's state on another match's behalf.

/// Failure to construct a `MatchHandler`.
///
/// The source contract additionally treats a "nil state" return from the
/// init callback as fatal. That case can't arise here: `MatchCore::State`
/// is an owned, non-optional value, so a callback that wants to signal
/// init failure has only one way to do it — return `Err`, which surfaces
/// as `CoreInit`.
#[derive(Debug, thiserror::Error)]
pub enum MatchInitError {
    #[error("match init callback failed: {0}")]
    CoreInit(String),
    #[error("invalid tick rate {0}: must be >= 1")]
    InvalidRate(u32),
    #[error("label registration failed: {0}")]
    LabelRegistration(String),
}
