// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Boundary interfaces to components this crate does not implement: the
//! match registry, the presence tracker, and the message router.
//!
//! The dispatcher itself never calls `PresenceTracker`/`MessageRouter`
//! directly — they are handed to `MatchCore::match_init` as part of a
//! `Collaborators` bundle so user callback code can emit outbound frames
//! and track presences on its own terms. The dispatcher *does* call
//! `MatchRegistry::update_match_label` once at init and
//! `MatchRegistry::remove_match` on stop.

use std::sync::Arc;

use match_core::{MatchId, MatchPresence, PresenceId};

use crate::stream::MatchStream;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to update label for match {id}: {reason}")]
    UpdateLabel { id: MatchId, reason: String },
}

/// Maps match ids to handlers, updates labels globally, and removes
/// stopped matches. Implemented by the embedding host, not this crate.
pub trait MatchRegistry: Send + Sync {
    fn update_match_label(&self, id: MatchId, label: &str) -> Result<(), RegistryError>;

    /// Must tolerate being called for an id it no longer (or never) knew
    /// about — `MatchHandler::stop` calls this unconditionally.
    fn remove_match(&self, id: MatchId, stream: MatchStream);
}

/// Publishes presence join/leave changes for a match stream.
pub trait PresenceTracker: Send + Sync {
    fn track(&self, stream: &MatchStream, presence: &MatchPresence);
    fn untrack(&self, stream: &MatchStream, presence_id: &PresenceId);
}

/// Ships outbound data frames to a set of presences on a match stream.
pub trait MessageRouter: Send + Sync {
    fn send(&self, stream: &MatchStream, presence_ids: &[PresenceId], op_code: i64, data: &[u8]);
}

/// The bundle of collaborators handed to `MatchCore::match_init`.
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn MatchRegistry>,
    pub tracker: Arc<dyn PresenceTracker>,
    pub router: Arc<dyn MessageRouter>,
}
