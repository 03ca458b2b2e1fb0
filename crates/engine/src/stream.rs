// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pub/sub channel identity collaborators use to address a match.

use match_core::MatchId;

/// Stable, module-local identifier for a stream's purpose. This crate only
/// ever produces `AuthoritativeMatch` streams; the numeric value is a
/// contract with this runtime's own collaborators (registry/tracker/router),
/// not an assertion about any external wire protocol's numbering.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    AuthoritativeMatch = 2,
}

/// `(mode, subject, label)` — the addressing triple collaborators use to
/// route presence and message traffic for one match.
///
/// Immutable after construction: it is derived once from the match id and
/// node at `MatchHandler::new` and never changes, independent of the
/// handler's separate, mutable display `label`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchStream {
    pub mode: MatchMode,
    pub subject: MatchId,
    pub label: String,
}

impl MatchStream {
    pub fn new(subject: MatchId, label: impl Into<String>) -> Self {
        Self {
            mode: MatchMode::AuthoritativeMatch,
            subject,
            label: label.into(),
        }
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
