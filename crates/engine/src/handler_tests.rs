// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::collaborators::MatchRegistry;
use crate::match_core::{JoinAttemptOutcome, MatchInitOutcome};
use crate::test_support::{FailingRegistry, InMemoryRegistry, NullRouter, NullTracker};
use async_trait::async_trait;
use match_core::{SessionId, UserId};
use std::sync::atomic::{AtomicBool, AtomicU32};
use std::time::Duration;
use tokio::sync::oneshot;

fn presence(node: &str) -> MatchPresence {
    MatchPresence {
        node: node.to_string(),
        session: SessionId::new_v4(),
        user_id: UserId::new("u"),
        username: "u".to_string(),
        persistence: false,
        status: None,
    }
}

fn collaborators_with(registry: Arc<dyn MatchRegistry>) -> Collaborators {
    Collaborators {
        registry,
        tracker: Arc::new(NullTracker),
        router: Arc::new(NullRouter),
    }
}

fn collaborators() -> Collaborators {
    collaborators_with(Arc::new(InMemoryRegistry::new()))
}

/// A core whose every callback is independently controllable by the test:
/// `match_loop` can be made to block past the call queue's capacity, every
/// callback can be forced to error, and a counter tracks `cancel()` calls.
#[derive(Default)]
struct ScriptedCore {
    loop_delay: Mutex<Option<Duration>>,
    fail_join_attempt: AtomicBool,
    allow_joins: AtomicBool,
    cancelled: Arc<AtomicBool>,
    loop_calls: AtomicU32,
}

use std::sync::Mutex;

impl ScriptedCore {
    fn new() -> Self {
        Self {
            allow_joins: AtomicBool::new(true),
            ..Default::default()
        }
    }
}

#[async_trait]
impl MatchCore for ScriptedCore {
    type State = ();

    async fn match_init(
        &self,
        _presence_list: Arc<PresenceList>,
        _params: HashMap<String, serde_json::Value>,
        _collaborators: Collaborators,
    ) -> Result<MatchInitOutcome<Self::State>, MatchCoreError> {
        Ok(MatchInitOutcome {
            state: (),
            rate: 50,
            label: "scripted".to_string(),
        })
    }

    async fn match_loop(
        &self,
        _tick: i64,
        state: Self::State,
        input: &mut DataDrain<'_>,
    ) -> Result<Option<Self::State>, MatchCoreError> {
        self.loop_calls.fetch_add(1, Ordering::Relaxed);
        for _ in input {}
        if let Some(delay) = *self.loop_delay.lock().unwrap() {
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

async fn spawn(core: ScriptedCore, config: MatchConfig) -> (MatchHandler, Arc<InMemoryRegistry>) {
    let registry = Arc::new(InMemoryRegistry::new());
    let handler = MatchHandler::new(
        MatchId::new_v4(),
        "node-a",
        core,
        HashMap::new(),
        config,
        collaborators_with(registry.clone()),
    )
    .await
    .unwrap();
    (handler, registry)
}

// Scenario: happy loop. Ticks run, state survives, nothing stops the match.
#[tokio::test]
async fn happy_loop_runs_ticks_without_stopping() {
    let (handler, registry) = spawn(ScriptedCore::new(), MatchConfig {
        tick_rate: 200,
        ..MatchConfig::default()
    })
    .await;

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(!handler.is_stopped());
    assert!(handler.stats().ticks_run > 0);
    assert!(registry.removed().is_empty());

    handler.stop();
}

// Scenario: data dropped when the input queue is full, without affecting
// match health.
#[tokio::test]
async fn data_queue_overflow_drops_silently_and_counts_it() {
    let (handler, _registry) = spawn(
        ScriptedCore {
            loop_delay: Mutex::new(Some(Duration::from_millis(200))),
            ..ScriptedCore::new()
        },
        MatchConfig {
            input_queue_size: 2,
            tick_rate: 1000,
            ..MatchConfig::default()
        },
    )
    .await;

    // give the dispatcher time to pick up the first tick and block in match_loop
    tokio::time::sleep(Duration::from_millis(20)).await;

    for i in 0..8 {
        handler.queue_data(DataMessage {
            user_id: UserId::new("u"),
            session_id: SessionId::new_v4(),
            username: "u".to_string(),
            node: "n".to_string(),
            op_code: i,
            data: Vec::new(),
            receive_time_ns: 0,
        });
    }

    assert!(handler.stats().data_dropped > 0);
    assert!(!handler.is_stopped());
    handler.stop();
}

// Scenario: call queue overload stops the match and removes it from the
// registry exactly once. The dispatcher is stuck draining a slow tick; an
// unrelated join notification fills the one remaining queue slot, so when
// the dispatcher wakes and the ticker tries to enqueue its own next tick,
// it finds no room and stops the match.
#[tokio::test]
async fn call_queue_overload_self_stops_and_removes_from_registry_once() {
    let (handler, registry) = spawn(
        ScriptedCore {
            loop_delay: Mutex::new(Some(Duration::from_millis(300))),
            ..ScriptedCore::new()
        },
        MatchConfig {
            call_queue_size: 1,
            tick_rate: 100,
            ..MatchConfig::default()
        },
    )
    .await;

    let id = handler.id();
    // let the dispatcher pick up its first tick and block inside match_loop
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(handler.queue_join(vec![presence("node-a")]));

    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(handler.is_stopped());
    assert_eq!(registry.removed_count(id), 1);
}

// Scenario: a join attempt cancelled before the dispatcher reaches it is
// denied without invoking the core.
#[tokio::test]
async fn cancelled_join_attempt_is_denied_without_invoking_core() {
    let core = ScriptedCore::new();
    core.fail_join_attempt.store(true, Ordering::Relaxed);
    let (handler, _registry) = spawn(core, MatchConfig::default()).await;

    let cancel = CancelToken::new();
    cancel.cancel();
    let (tx, rx) = oneshot::channel();
    assert!(handler.queue_join_attempt(presence("n"), cancel, tx));

    let reply = rx.await.unwrap();
    assert!(!reply.allow);
    assert!(!handler.is_stopped());

    handler.stop();
}

// Scenario: a terminate call with grace=0 stops the match immediately after
// the callback returns.
#[tokio::test]
async fn terminate_with_zero_grace_stops_immediately() {
    let (handler, registry) = spawn(ScriptedCore::new(), MatchConfig::default()).await;
    let id = handler.id();

    assert!(handler.queue_terminate(0));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(handler.is_stopped());
    assert_eq!(registry.removed_count(id), 1);
}

// Scenario: join then leave round-trips through the presence list.
#[tokio::test]
async fn join_then_leave_round_trips_through_presence_list() {
    let (handler, _registry) = spawn(ScriptedCore::new(), MatchConfig::default()).await;

    let p = presence("node-a");
    assert!(handler.queue_join(vec![p.clone()]));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(handler.presence_list().contains(&p.presence_id()));

    assert!(handler.queue_leave(vec![p.clone()]));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!handler.presence_list().contains(&p.presence_id()));

    handler.stop();
}

#[tokio::test]
async fn close_cancels_core_exactly_once_without_touching_registry() {
    let core = ScriptedCore::new();
    let cancelled = core.cancelled.clone();
    let (handler, registry) = spawn(core, MatchConfig::default()).await;

    handler.close();
    handler.close();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(cancelled.load(Ordering::Relaxed));
    assert!(registry.removed().is_empty());
}

#[tokio::test]
async fn stop_is_idempotent_and_removes_from_registry_exactly_once() {
    let (handler, registry) = spawn(ScriptedCore::new(), MatchConfig::default()).await;
    let id = handler.id();

    handler.stop();
    handler.stop();
    handler.close();

    assert_eq!(registry.removed_count(id), 1);
}

#[tokio::test]
async fn construction_fails_when_the_registry_rejects_the_label() {
    let err = MatchHandler::new(
        MatchId::new_v4(),
        "node-a",
        ScriptedCore::new(),
        HashMap::new(),
        MatchConfig::default(),
        collaborators_with(Arc::new(FailingRegistry)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, MatchInitError::LabelRegistration(_)));
}

#[tokio::test]
async fn construction_fails_on_zero_rate_without_spawning_a_dispatcher() {
    struct ZeroRateCore;

    #[async_trait]
    impl MatchCore for ZeroRateCore {
        type State = ();

        async fn match_init(
            &self,
            _presence_list: Arc<PresenceList>,
            _params: HashMap<String, serde_json::Value>,
            _collaborators: Collaborators,
        ) -> Result<MatchInitOutcome<Self::State>, MatchCoreError> {
            Ok(MatchInitOutcome {
                state: (),
                rate: 0,
                label: "zero".to_string(),
            })
        }

        async fn match_loop(
            &self,
            _tick: i64,
            state: Self::State,
            _input: &mut DataDrain<'_>,
        ) -> Result<Option<Self::State>, MatchCoreError> {
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

        fn cancel(&self) {}
    }

    let err = MatchHandler::new(
        MatchId::new_v4(),
        "node-a",
        ZeroRateCore,
        HashMap::new(),
        MatchConfig::default(),
        collaborators(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, MatchInitError::InvalidRate(0)));
}
