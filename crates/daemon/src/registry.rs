// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process implementations of the collaborator traits `match-engine`
//! calls into: a match registry keyed by id, and presence/message
//! collaborators that log what they would otherwise ship over the wire.
//!
//! Real deployments would back `MessageRouter`/`PresenceTracker` with a
//! realtime transport; this daemon's job is only to prove the wiring.

use std::collections::HashMap;
use std::sync::Arc;

use match_core::{MatchId, MatchPresence, PresenceId};
use match_engine::{MatchRegistry, MatchStream, MessageRouter, PresenceTracker, RegistryError};
use parking_lot::Mutex;
use tracing::info;

/// Maps match ids to labels and tracks which ids are currently live.
///
/// `MatchHandler` itself is held by whoever created the match (the daemon's
/// own task spawning logic); the registry only needs label/removal
/// bookkeeping per the collaborator contract.
#[derive(Default)]
pub struct Registry {
    labels: Mutex<HashMap<MatchId, String>>,
}

impl Registry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn live_count(&self) -> usize {
        self.labels.lock().len()
    }
}

impl MatchRegistry for Registry {
    fn update_match_label(&self, id: MatchId, label: &str) -> Result<(), RegistryError> {
        self.labels.lock().insert(id, label.to_string());
        Ok(())
    }

    fn remove_match(&self, id: MatchId, _stream: MatchStream) {
        self.labels.lock().remove(&id);
    }
}

/// Logs presence churn instead of publishing it anywhere.
#[derive(Default)]
pub struct LoggingTracker;

impl PresenceTracker for LoggingTracker {
    fn track(&self, stream: &MatchStream, presence: &MatchPresence) {
        info!(
            match_id = %stream.subject,
            user = %presence.user_id,
            node = %presence.node,
            "presence tracked"
        );
    }

    fn untrack(&self, stream: &MatchStream, presence_id: &PresenceId) {
        info!(match_id = %stream.subject, node = %presence_id.node, "presence untracked");
    }
}

/// Logs outbound frames instead of shipping them over a transport.
#[derive(Default)]
pub struct LoggingRouter;

impl MessageRouter for LoggingRouter {
    fn send(&self, stream: &MatchStream, presence_ids: &[PresenceId], op_code: i64, data: &[u8]) {
        info!(
            match_id = %stream.subject,
            recipients = presence_ids.len(),
            op_code,
            bytes = data.len(),
            "match data routed"
        );
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
