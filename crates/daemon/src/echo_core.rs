// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A minimal demonstration `MatchCore`: admits every join, echoes data
//! back to every current presence, and never ends on its own.
//!
//! This exists to prove `match-engine` end to end from a real binary; it is
//! not meant to be a template for production match logic.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use match_core::{MatchPresence, PresenceList};
use match_engine::{
    Collaborators, DataDrain, JoinAttemptOutcome, MatchCore, MatchCoreError, MatchInitOutcome,
    MatchStream,
};
use tracing::info;

pub struct EchoCore {
    pub stream: MatchStream,
}

pub struct EchoState {
    collaborators: Collaborators,
    presence_list: Arc<PresenceList>,
}

#[async_trait]
impl MatchCore for EchoCore {
    type State = EchoState;

    async fn match_init(
        &self,
        presence_list: Arc<PresenceList>,
        _params: HashMap<String, serde_json::Value>,
        collaborators: Collaborators,
    ) -> Result<MatchInitOutcome<Self::State>, MatchCoreError> {
        Ok(MatchInitOutcome {
            state: EchoState {
                collaborators,
                presence_list,
            },
            rate: 10,
            label: "echo".to_string(),
        })
    }

    async fn match_loop(
        &self,
        _tick: i64,
        state: Self::State,
        input: &mut DataDrain<'_>,
    ) -> Result<Option<Self::State>, MatchCoreError> {
        let recipients = state.presence_list.list();
        for message in input {
            if recipients.is_empty() {
                continue;
            }
            state.collaborators.router.send(
                &self.stream,
                &recipients,
                message.op_code,
                &message.data,
            );
        }
        Ok(Some(state))
    }

    async fn match_join_attempt(
        &self,
        _tick: i64,
        state: Self::State,
        _candidate: &MatchPresence,
    ) -> Result<JoinAttemptOutcome<Self::State>, MatchCoreError> {
        Ok(JoinAttemptOutcome {
            state,
            allow: true,
            reason: None,
        })
    }

    async fn match_join(
        &self,
        _tick: i64,
        state: Self::State,
        joins: &[MatchPresence],
    ) -> Result<Option<Self::State>, MatchCoreError> {
        for presence in joins {
            state.collaborators.tracker.track(&self.stream, presence);
        }
        Ok(Some(state))
    }

    async fn match_leave(
        &self,
        _tick: i64,
        state: Self::State,
        leaves: &[MatchPresence],
    ) -> Result<Option<Self::State>, MatchCoreError> {
        for presence in leaves {
            state
                .collaborators
                .tracker
                .untrack(&self.stream, &presence.presence_id());
        }
        Ok(Some(state))
    }

    async fn match_terminate(
        &self,
        _tick: i64,
        state: Self::State,
        grace_seconds: u32,
    ) -> Result<Option<Self::State>, MatchCoreError> {
        info!(grace_seconds, "echo match terminating");
        Ok(Some(state))
    }

    fn cancel(&self) {}
}
