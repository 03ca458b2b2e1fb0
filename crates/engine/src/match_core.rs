// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `MatchCore`: the opaque, user-scriptable callback contract.
//!
//! Methods are invoked serially by one dispatcher task and never run
//! concurrently with each other for the same match. A callback that
//! returns `Ok(None)` (for the state-returning callbacks) is the
//! cooperative termination signal — the dispatcher stops the match.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use match_core::{MatchPresence, PresenceList};

use crate::collaborators::Collaborators;
use crate::data_drain::DataDrain;

/// A `MatchCore` callback failed. The dispatcher never attempts to
/// interpret *why* — any error here stops the affected match in isolation.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MatchCoreError(pub String);

impl MatchCoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Result of a successful `match_init`.
pub struct MatchInitOutcome<S> {
    pub state: S,
    pub rate: u32,
    pub label: String,
}

/// Result of a successful `match_join_attempt`.
pub struct JoinAttemptOutcome<S> {
    pub state: S,
    pub allow: bool,
    pub reason: Option<String>,
}

/// User-supplied match callbacks, generic over the concrete (statically
/// typed) state the implementation keeps internally.
///
/// The dispatcher never sees `Self::State` directly — it talks to an
/// erased adapter (see [`ErasedMatchCore`]) so that `MatchHandler` itself
/// stays state-type-agnostic, mirroring the "opaque user state" the
/// original runtime passes around as a dynamically typed value.
#[async_trait]
pub trait MatchCore: Send + Sync + 'static {
    type State: Send + 'static;

    async fn match_init(
        &self,
        presence_list: Arc<PresenceList>,
        params: HashMap<String, serde_json::Value>,
        collaborators: Collaborators,
    ) -> Result<MatchInitOutcome<Self::State>, MatchCoreError>;

    async fn match_loop(
        &self,
        tick: i64,
        state: Self::State,
        input: &mut DataDrain<'_>,
    ) -> Result<Option<Self::State>, MatchCoreError>;

    async fn match_join_attempt(
        &self,
        tick: i64,
        state: Self::State,
        candidate: &MatchPresence,
    ) -> Result<JoinAttemptOutcome<Self::State>, MatchCoreError>;

    async fn match_join(
        &self,
        tick: i64,
        state: Self::State,
        joins: &[MatchPresence],
    ) -> Result<Option<Self::State>, MatchCoreError>;

    async fn match_leave(
        &self,
        tick: i64,
        state: Self::State,
        leaves: &[MatchPresence],
    ) -> Result<Option<Self::State>, MatchCoreError>;

    async fn match_terminate(
        &self,
        tick: i64,
        state: Self::State,
        grace_seconds: u32,
    ) -> Result<Option<Self::State>, MatchCoreError>;

    /// Invoked exactly once, when the match stops, regardless of cause.
    fn cancel(&self);
}

/// Type-erased match state, as the dispatcher actually holds it.
pub(crate) type ErasedState = Box<dyn Any + Send>;

/// Internal adapter that lets `MatchHandler` drive any `MatchCore` without
/// being generic over its associated state type. Blanket-implemented for
/// every `MatchCore` — user code never implements this directly.
#[async_trait]
pub(crate) trait ErasedMatchCore: Send + Sync {
    async fn match_init(
        &self,
        presence_list: Arc<PresenceList>,
        params: HashMap<String, serde_json::Value>,
        collaborators: Collaborators,
    ) -> Result<(ErasedState, u32, String), MatchCoreError>;

    async fn match_loop(
        &self,
        tick: i64,
        state: ErasedState,
        input: &mut DataDrain<'_>,
    ) -> Result<Option<ErasedState>, MatchCoreError>;

    async fn match_join_attempt(
        &self,
        tick: i64,
        state: ErasedState,
        candidate: &MatchPresence,
    ) -> Result<(ErasedState, bool, Option<String>), MatchCoreError>;

    async fn match_join(
        &self,
        tick: i64,
        state: ErasedState,
        joins: &[MatchPresence],
    ) -> Result<Option<ErasedState>, MatchCoreError>;

    async fn match_leave(
        &self,
        tick: i64,
        state: ErasedState,
        leaves: &[MatchPresence],
    ) -> Result<Option<ErasedState>, MatchCoreError>;

    async fn match_terminate(
        &self,
        tick: i64,
        state: ErasedState,
        grace_seconds: u32,
    ) -> Result<Option<ErasedState>, MatchCoreError>;

    fn cancel(&self);
}

fn downcast<S: Send + 'static>(state: ErasedState) -> Result<S, MatchCoreError> {
    state
        .downcast::<S>()
        .map(|boxed| *boxed)
        .map_err(|_| MatchCoreError::new("match state type mismatch"))
}

#[async_trait]
impl<C: MatchCore> ErasedMatchCore for C {
    async fn match_init(
        &self,
        presence_list: Arc<PresenceList>,
        params: HashMap<String, serde_json::Value>,
        collaborators: Collaborators,
    ) -> Result<(ErasedState, u32, String), MatchCoreError> {
        let outcome = MatchCore::match_init(self, presence_list, params, collaborators).await?;
        Ok((
            Box::new(outcome.state) as ErasedState,
            outcome.rate,
            outcome.label,
        ))
    }

    async fn match_loop(
        &self,
        tick: i64,
        state: ErasedState,
        input: &mut DataDrain<'_>,
    ) -> Result<Option<ErasedState>, MatchCoreError> {
        let state = downcast::<C::State>(state)?;
        let next = MatchCore::match_loop(self, tick, state, input).await?;
        Ok(next.map(|s| Box::new(s) as ErasedState))
    }

    async fn match_join_attempt(
        &self,
        tick: i64,
        state: ErasedState,
        candidate: &MatchPresence,
    ) -> Result<(ErasedState, bool, Option<String>), MatchCoreError> {
        let state = downcast::<C::State>(state)?;
        let outcome = MatchCore::match_join_attempt(self, tick, state, candidate).await?;
        Ok((
            Box::new(outcome.state) as ErasedState,
            outcome.allow,
            outcome.reason,
        ))
    }

    async fn match_join(
        &self,
        tick: i64,
        state: ErasedState,
        joins: &[MatchPresence],
    ) -> Result<Option<ErasedState>, MatchCoreError> {
        let state = downcast::<C::State>(state)?;
        let next = MatchCore::match_join(self, tick, state, joins).await?;
        Ok(next.map(|s| Box::new(s) as ErasedState))
    }

    async fn match_leave(
        &self,
        tick: i64,
        state: ErasedState,
        leaves: &[MatchPresence],
    ) -> Result<Option<ErasedState>, MatchCoreError> {
        let state = downcast::<C::State>(state)?;
        let next = MatchCore::match_leave(self, tick, state, leaves).await?;
        Ok(next.map(|s| Box::new(s) as ErasedState))
    }

    async fn match_terminate(
        &self,
        tick: i64,
        state: ErasedState,
        grace_seconds: u32,
    ) -> Result<Option<ErasedState>, MatchCoreError> {
        let state = downcast::<C::State>(state)?;
        let next = MatchCore::match_terminate(self, tick, state, grace_seconds).await?;
        Ok(next.map(|s| Box::new(s) as ErasedState))
    }

    fn cancel(&self) {
        MatchCore::cancel(self)
    }
}

#[cfg(test)]
#[path = "match_core_tests.rs"]
mod tests;
