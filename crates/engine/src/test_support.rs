// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory collaborator implementations for tests.
//!
//! None of these talk to a network, a database, or another match — they
//! exist so tests of [`crate::handler::MatchHandler`] can construct a
//! [`crate::collaborators::Collaborators`] bundle without a real host.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use match_core::{MatchId, MatchPresence, PresenceId, PresenceList};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::collaborators::{Collaborators, MatchRegistry, MessageRouter, PresenceTracker, RegistryError};
use crate::data_drain::DataDrain;
use crate::match_core::{JoinAttemptOutcome, MatchCore, MatchCoreError, MatchInitOutcome};
use crate::stream::MatchStream;

/// Records every label update and removal it sees; never errors.
#[derive(Default)]
pub struct InMemoryRegistry {
    labels: Mutex<Vec<(MatchId, String)>>,
    removed: Mutex<Vec<MatchId>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Vec<(MatchId, String)> {
        self.labels.lock().clone()
    }

    pub fn removed(&self) -> Vec<MatchId> {
        self.removed.lock().clone()
    }

    pub fn removed_count(&self, id: MatchId) -> usize {
        self.removed()
            .into_iter()
            .filter(|removed_id| *removed_id == id)
            .count()
    }
}

impl MatchRegistry for InMemoryRegistry {
    fn update_match_label(&self, id: MatchId, label: &str) -> Result<(), RegistryError> {
        self.labels.lock().push((id, label.to_string()));
        Ok(())
    }

    fn remove_match(&self, id: MatchId, _stream: MatchStream) {
        self.removed.lock().push(id);
    }
}

/// A registry whose `update_match_label` always fails, for construction
/// failure tests.
#[derive(Default)]
pub struct FailingRegistry;

impl MatchRegistry for FailingRegistry {
    fn update_match_label(&self, id: MatchId, _label: &str) -> Result<(), RegistryError> {
        Err(RegistryError::UpdateLabel {
            id,
            reason: "registry unavailable".to_string(),
        })
    }

    fn remove_match(&self, _id: MatchId, _stream: MatchStream) {}
}

/// Discards everything. Used where a test doesn't care about presence
/// tracking or outbound routing.
#[derive(Default)]
pub struct NullTracker;

impl PresenceTracker for NullTracker {
    fn track(&self, _stream: &MatchStream, _presence: &MatchPresence) {}
    fn untrack(&self, _stream: &MatchStream, _presence_id: &PresenceId) {}
}

#[derive(Default)]
pub struct NullRouter;

impl MessageRouter for NullRouter {
    fn send(&self, _stream: &MatchStream, _presence_ids: &[PresenceId], _op_code: i64, _data: &[u8]) {}
}

/// A `MatchCore` whose behavior is dialed in by the test instead of hardcoded:
/// tick rate, an optional per-tick delay (to simulate a slow callback), and
/// whether join attempts are allowed. Exists so integration tests exercising
/// `MatchHandler` end to end don't each need their own throwaway core.
pub struct ProgrammableCore {
    rate: u32,
    loop_delay: Mutex<Option<Duration>>,
    allow_joins: AtomicBool,
    fail_join_attempt: AtomicBool,
    cancelled: Arc<AtomicBool>,
    ticks_run: AtomicU64,
}

impl ProgrammableCore {
    pub fn new(rate: u32) -> Self {
        Self {
            rate,
            loop_delay: Mutex::new(None),
            allow_joins: AtomicBool::new(true),
            fail_join_attempt: AtomicBool::new(false),
            cancelled: Arc::new(AtomicBool::new(false)),
            ticks_run: AtomicU64::new(0),
        }
    }

    pub fn with_loop_delay(self, delay: Duration) -> Self {
        *self.loop_delay.lock() = Some(delay);
        self
    }

    pub fn deny_joins(&self) {
        self.allow_joins.store(false, Ordering::Relaxed);
    }

    pub fn fail_join_attempts(&self) {
        self.fail_join_attempt.store(true, Ordering::Relaxed);
    }

    pub fn cancelled_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn ticks_run(&self) -> u64 {
        self.ticks_run.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MatchCore for ProgrammableCore {
    type State = ();

    async fn match_init(
        &self,
        _presence_list: Arc<PresenceList>,
        _params: HashMap<String, serde_json::Value>,
        _collaborators: Collaborators,
    ) -> Result<MatchInitOutcome<Self::State>, MatchCoreError> {
        Ok(MatchInitOutcome {
            state: (),
            rate: self.rate,
            label: "programmable".to_string(),
        })
    }

    async fn match_loop(
        &self,
        _tick: i64,
        state: Self::State,
        input: &mut DataDrain<'_>,
    ) -> Result<Option<Self::State>, MatchCoreError> {
        self.ticks_run.fetch_add(1, Ordering::Relaxed);
        for _ in input {}
        let delay = *self.loop_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(Some(state))
    }

    async fn match_join_attempt(
        &self,
        _tick: i64,
        state: Self::State,
        _candidate: &MatchPresence,
    ) -> Result<JoinAttemptOutcome<Self::State>, MatchCoreError> {
        if self.fail_join_attempt.load(Ordering::Relaxed) {
            return Err(MatchCoreError::new("join attempt exploded"));
        }
        Ok(JoinAttemptOutcome {
            state,
            allow: self.allow_joins.load(Ordering::Relaxed),
            reason: None,
        })
    }

    async fn match_join(
        &self,
        _tick: i64,
        state: Self::State,
        _joins: &[MatchPresence],
    ) -> Result<Option<Self::State>, MatchCoreError> {
        Ok(Some(state))
    }

    async fn match_leave(
        &self,
        _tick: i64,
        state: Self::State,
        _leaves: &[MatchPresence],
    ) -> Result<Option<Self::State>, MatchCoreError> {
        Ok(Some(state))
    }

    async fn match_terminate(
        &self,
        _tick: i64,
        state: Self::State,
        _grace_seconds: u32,
    ) -> Result<Option<Self::State>, MatchCoreError> {
        Ok(Some(state))
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}
