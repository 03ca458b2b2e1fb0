// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Presence identity and the per-match presence list.
//!
//! `PresenceList` is the one piece of handler-owned state with concurrent
//! external readers: `MatchCore` implementations may call `list()`/
//! `contains()` from other threads while a callback is in flight. Writers
//! (`join`/`leave`) only ever run on the dispatcher task, so a plain
//! reader/writer lock is enough — there is never more than one writer.

use crate::id::{SessionId, UserId};
use parking_lot::RwLock;

/// Structural identity of a live connection to a match: `(node, session)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PresenceId {
    pub node: String,
    pub session: SessionId,
}

impl PresenceId {
    pub fn new(node: impl Into<String>, session: SessionId) -> Self {
        Self {
            node: node.into(),
            session,
        }
    }
}

/// A candidate or admitted participant, as passed to `MatchJoin`/`MatchLeave`.
///
/// Only `(node, session)` — i.e. `PresenceId` — participate in identity and
/// equality; the remaining fields are metadata the match core may use but
/// that a `PresenceList` never inspects.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MatchPresence {
    pub node: String,
    pub session: SessionId,
    pub user_id: UserId,
    pub username: String,
    /// Whether this presence should be tracked beyond the current connection
    /// (the wire-level `UserPresence.persistence` field).
    pub persistence: bool,
    /// Freeform status carried from the wire-level `UserPresence.status`.
    pub status: Option<String>,
}

impl MatchPresence {
    pub fn presence_id(&self) -> PresenceId {
        PresenceId::new(self.node.clone(), self.session)
    }
}

/// Ordered, deduplication-tolerant set of presences for one match.
///
/// Invariants upheld by `join`/`leave`:
/// - no duplicate `(node, session)` pairs ever accumulate (first join wins);
/// - `leave` removes at most one matching entry per input;
/// - iteration order is insertion order;
/// - `list()` returns an independent snapshot, stable for the caller's use
///   regardless of concurrent writers.
#[derive(Default)]
pub struct PresenceList {
    entries: RwLock<Vec<PresenceId>>,
}

impl PresenceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append each input's presence id, skipping any already present.
    ///
    /// Tolerates duplicate inputs (including duplicates against each other
    /// within the same call) without corrupting the list; the handler is
    /// responsible for gating admission via `MatchJoinAttempt` before
    /// calling this.
    pub fn join<'a>(&self, presences: impl IntoIterator<Item = &'a PresenceId>) {
        let mut entries = self.entries.write();
        for presence in presences {
            if !entries.contains(presence) {
                entries.push(presence.clone());
            }
        }
    }

    /// Remove at most one entry matching each input. Missing entries are
    /// silently ignored.
    pub fn leave<'a>(&self, presences: impl IntoIterator<Item = &'a PresenceId>) {
        let mut entries = self.entries.write();
        for presence in presences {
            if let Some(pos) = entries.iter().position(|stored| stored == presence) {
                entries.remove(pos);
            }
        }
    }

    /// True iff `presence_id` (node *and* session) is present.
    ///
    /// The source implementation this is ported from compared the queried
    /// session against the wrong node (the iteration variable's own node,
    /// making the node check trivially true). This compares both fields of
    /// the *queried* id against each stored entry.
    pub fn contains(&self, presence_id: &PresenceId) -> bool {
        self.entries.read().iter().any(|stored| stored == presence_id)
    }

    /// Independent snapshot, safe for the caller to iterate without holding
    /// any lock on this list.
    pub fn list(&self) -> Vec<PresenceId> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
#[path = "presence_tests.rs"]
mod tests;
