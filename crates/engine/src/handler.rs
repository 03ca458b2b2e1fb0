// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `MatchHandler`: the per-match single-writer dispatcher.
//!
//! One dispatcher task per match multiplexes ticks, calls (joins, leaves,
//! terminate, loop), and join-attempts onto a single `MatchCore`. All other
//! state lives only on that task; `MatchHandler` itself is a cheap-to-clone
//! handle producers use to enqueue work.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use match_core::{DataMessage, MatchId, MatchPresence, PresenceList};
use tokio::sync::{mpsc, oneshot, Notify};
use tracing::{debug, warn};

use crate::collaborators::Collaborators;
use crate::config::MatchConfig;
use crate::data_drain::DataDrain;
use crate::error::MatchInitError;
use crate::match_core::{ErasedMatchCore, ErasedState, MatchCore, MatchCoreError};
use crate::stats::{Counters, MatchStats};
use crate::stream::MatchStream;

/// Caller-supplied cancellation handle for a pending `QueueJoinAttempt`.
///
/// Cloning shares the same cancellation flag; cancelling from any clone
/// is observed by the dispatcher before it invokes the core.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// The admission decision streamed back to a `QueueJoinAttempt` caller.
#[derive(Debug, Clone)]
pub struct JoinAttemptReply {
    pub allow: bool,
    pub reason: Option<String>,
}

impl JoinAttemptReply {
    fn deny() -> Self {
        Self {
            allow: false,
            reason: None,
        }
    }
}

/// Work delivered through the bounded call queue. Ticks, joins, leaves, and
/// terminate requests all share this one queue so a stuck user callback
/// backs up (and eventually stops) the whole match, not just one kind of
/// event.
enum CallJob {
    Loop,
    Join(Vec<MatchPresence>),
    Leave(Vec<MatchPresence>),
    Terminate(u32),
}

struct JoinAttemptJob {
    candidate: MatchPresence,
    cancel: CancelToken,
    reply: oneshot::Sender<JoinAttemptReply>,
}

struct Inner {
    id: MatchId,
    node: String,
    stream: MatchStream,
    label: parking_lot::RwLock<String>,
    tick: AtomicI64,
    stopped: AtomicBool,
    removed: AtomicBool,
    stop_notify: Notify,
    presence_list: Arc<PresenceList>,
    collaborators: Collaborators,
    core: Arc<dyn ErasedMatchCore>,
    counters: Counters,
    input_tx: mpsc::Sender<DataMessage>,
    call_tx: mpsc::Sender<CallJob>,
    join_attempt_tx: mpsc::Sender<JoinAttemptJob>,
}

impl Inner {
    /// Idempotent: `cancel()` and the stop signal fire at most once,
    /// guaranteed by the `stopped` compare-exchange succeeding exactly once.
    fn do_close(&self) -> bool {
        if self
            .stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.core.cancel();
            self.stop_notify.notify_one();
            true
        } else {
            false
        }
    }

    /// `Close()` + registry removal, invoked both by the public `Stop()`
    /// and by the dispatcher itself when it must stop the match with no
    /// external caller driving the removal (overload, callback failure,
    /// grace=0 terminate).
    fn self_stop(&self) {
        let _ = self.do_close();
        if self
            .removed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.collaborators
                .registry
                .remove_match(self.id, self.stream.clone());
        }
    }
}

/// The scheduler and state-ownership boundary for one authoritative match.
#[derive(Clone)]
pub struct MatchHandler {
    inner: Arc<Inner>,
}

impl MatchHandler {
    /// Construct a handler and start its dispatcher task.
    ///
    /// Invokes `core.match_init` once; on error, the core is cancelled and
    /// construction fails without ever spawning a dispatcher.
    pub async fn new<C: MatchCore>(
        id: MatchId,
        node: impl Into<String>,
        core: C,
        params: HashMap<String, serde_json::Value>,
        config: MatchConfig,
        collaborators: Collaborators,
    ) -> Result<Self, MatchInitError> {
        config
            .validated()
            .map_err(|_| MatchInitError::InvalidRate(config.tick_rate))?;

        let node = node.into();
        let stream = MatchStream::new(id, node.clone());
        let presence_list = Arc::new(PresenceList::new());
        let core: Arc<dyn ErasedMatchCore> = Arc::new(core);

        let (erased_state, rate, label) = core
            .match_init(Arc::clone(&presence_list), params, collaborators.clone())
            .await
            .map_err(|e| MatchInitError::CoreInit(e.0))?;

        if rate == 0 {
            core.cancel();
            return Err(MatchInitError::InvalidRate(rate));
        }

        collaborators
            .registry
            .update_match_label(id, &label)
            .map_err(|e| {
                core.cancel();
                MatchInitError::LabelRegistration(e.to_string())
            })?;

        let (input_tx, input_rx) = mpsc::channel(config.input_queue_size.max(1));
        let (call_tx, call_rx) = mpsc::channel(config.call_queue_size.max(1));
        let (join_attempt_tx, join_attempt_rx) = mpsc::channel(config.join_attempt_queue_size.max(1));

        let inner = Arc::new(Inner {
            id,
            node,
            stream,
            label: parking_lot::RwLock::new(label),
            tick: AtomicI64::new(0),
            stopped: AtomicBool::new(false),
            removed: AtomicBool::new(false),
            stop_notify: Notify::new(),
            presence_list,
            collaborators,
            core: Arc::clone(&core),
            counters: Counters::default(),
            input_tx,
            call_tx,
            join_attempt_tx,
        });

        tokio::spawn(dispatch(
            Arc::clone(&inner),
            rate,
            erased_state,
            input_rx,
            call_rx,
            join_attempt_rx,
        ));

        Ok(Self { inner })
    }

    pub fn id(&self) -> MatchId {
        self.inner.id
    }

    pub fn id_str(&self) -> String {
        self.inner.id.id_str(&self.inner.node)
    }

    pub fn node(&self) -> &str {
        &self.inner.node
    }

    pub fn stream(&self) -> MatchStream {
        self.inner.stream.clone()
    }

    pub fn label(&self) -> String {
        self.inner.label.read().clone()
    }

    pub fn presence_list(&self) -> &Arc<PresenceList> {
        &self.inner.presence_list
    }

    pub fn stats(&self) -> MatchStats {
        self.inner.counters.snapshot()
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Enqueue inbound data. Silently dropped (with a warning) if the data
    /// queue is full or the match is stopped — data loss is not a
    /// match-killing condition.
    pub fn queue_data(&self, msg: DataMessage) {
        if self.is_stopped() {
            return;
        }
        if self.inner.input_tx.try_send(msg).is_err() {
            self.inner
                .counters
                .data_dropped
                .fetch_add(1, Ordering::Relaxed);
            warn!(match_id = %self.inner.id, "data queue full, dropping message");
        }
    }

    /// Enqueue a join-attempt decision. Returns `false` (without affecting
    /// match health) if the join-attempt queue is full or the match is
    /// stopped — the caller must handle the absence of a reply either way.
    pub fn queue_join_attempt(
        &self,
        candidate: MatchPresence,
        cancel: CancelToken,
        reply: oneshot::Sender<JoinAttemptReply>,
    ) -> bool {
        if self.is_stopped() {
            return false;
        }
        let job = JoinAttemptJob {
            candidate,
            cancel,
            reply,
        };
        match self.inner.join_attempt_tx.try_send(job) {
            Ok(()) => true,
            Err(_) => {
                self.inner
                    .counters
                    .join_attempts_rejected
                    .fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Enqueue a notification of admitted joins. `false` if the call queue
    /// is full or the match is stopped — a full call queue additionally
    /// stops the match (see `CallJob` doc comment).
    pub fn queue_join(&self, joins: Vec<MatchPresence>) -> bool {
        self.queue_call(CallJob::Join(joins))
    }

    pub fn queue_leave(&self, leaves: Vec<MatchPresence>) -> bool {
        self.queue_call(CallJob::Leave(leaves))
    }

    pub fn queue_terminate(&self, grace_seconds: u32) -> bool {
        self.queue_call(CallJob::Terminate(grace_seconds))
    }

    fn queue_call(&self, job: CallJob) -> bool {
        if self.is_stopped() {
            return false;
        }
        self.inner.call_tx.try_send(job).is_ok()
    }

    /// Idempotent. Cancels the core, unblocks the dispatcher, and stops the
    /// ticker. Does not remove the match from the registry — use `stop()`
    /// for that.
    pub fn close(&self) {
        self.inner.do_close();
    }

    /// `close()` plus registry removal. Tolerates being called after the
    /// match already stopped itself (overload, callback failure).
    pub fn stop(&self) {
        self.inner.self_stop();
    }
}

/// The dispatcher loop: one task per match, started by `MatchHandler::new`.
async fn dispatch(
    inner: Arc<Inner>,
    rate: u32,
    mut state: ErasedState,
    mut input_rx: mpsc::Receiver<DataMessage>,
    mut call_rx: mpsc::Receiver<CallJob>,
    mut join_attempt_rx: mpsc::Receiver<JoinAttemptJob>,
) {
    let period = Duration::from_secs_f64(1.0 / f64::from(rate));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        // Backstop in case a close() landed while this task was away
        // running a callback and missed the stop_notify wakeup entirely.
        if inner.stopped.load(Ordering::Acquire) {
            debug!(match_id = %inner.id, "dispatcher stopping");
            break;
        }

        tokio::select! {
            biased;

            () = inner.stop_notify.notified() => {
                debug!(match_id = %inner.id, "dispatcher stopping");
                break;
            }

            _ = ticker.tick() => {
                if inner.call_tx.try_send(CallJob::Loop).is_err() {
                    warn!(match_id = %inner.id, "call queue full on tick, stopping match");
                    inner.counters.call_rejected.fetch_add(1, Ordering::Relaxed);
                    inner.self_stop();
                }
            }

            job = call_rx.recv() => {
                let Some(job) = job else { break };
                if inner.stopped.load(Ordering::Acquire) {
                    continue;
                }
                match run_call(&inner, &mut state, &mut input_rx, job).await {
                    Ok(should_continue) => {
                        if !should_continue {
                            inner.self_stop();
                        }
                    }
                    Err(e) => {
                        warn!(match_id = %inner.id, error = %e, "match callback failed, stopping match");
                        inner.self_stop();
                    }
                }
            }

            job = join_attempt_rx.recv() => {
                let Some(job) = job else { break };
                if inner.stopped.load(Ordering::Acquire) {
                    let _ = job.reply.send(JoinAttemptReply::deny());
                    continue;
                }
                if job.cancel.is_cancelled() {
                    let _ = job.reply.send(JoinAttemptReply::deny());
                    continue;
                }
                match run_join_attempt(&inner, &mut state, job.candidate).await {
                    Ok(reply) => {
                        let _ = job.reply.send(reply);
                    }
                    Err(e) => {
                        warn!(match_id = %inner.id, error = %e, "join attempt callback failed, stopping match");
                        let _ = job.reply.send(JoinAttemptReply::deny());
                        inner.self_stop();
                    }
                }
            }
        }
    }
}

/// Runs one `CallJob` against the current state. Returns `Ok(false)` when
/// the core returned no new state (cooperative stop); the caller is
/// responsible for actually stopping the match in that case.
async fn run_call(
    inner: &Arc<Inner>,
    state: &mut ErasedState,
    input_rx: &mut mpsc::Receiver<DataMessage>,
    job: CallJob,
) -> Result<bool, MatchCoreError> {
    let tick = inner.tick.load(Ordering::Acquire);
    let taken = std::mem::replace(state, Box::new(()));

    let next = match job {
        CallJob::Loop => {
            let mut drain = DataDrain::new(input_rx);
            let next = inner.core.match_loop(tick, taken, &mut drain).await?;
            if next.is_some() {
                inner.tick.fetch_add(1, Ordering::AcqRel);
                inner.counters.ticks_run.fetch_add(1, Ordering::Relaxed);
            }
            next
        }
        CallJob::Join(joins) => {
            for presence in &joins {
                inner.presence_list.join([&presence.presence_id()]);
            }
            inner.core.match_join(tick, taken, &joins).await?
        }
        CallJob::Leave(leaves) => {
            let next = inner.core.match_leave(tick, taken, &leaves).await?;
            for presence in &leaves {
                inner.presence_list.leave([&presence.presence_id()]);
            }
            next
        }
        CallJob::Terminate(grace_seconds) => {
            let next = inner.core.match_terminate(tick, taken, grace_seconds).await?;
            if grace_seconds == 0 {
                // caller stops the match immediately after the callback
                // returns, regardless of whether it returned a new state.
                if let Some(s) = next {
                    *state = s;
                }
                return Ok(false);
            }
            next
        }
    };

    match next {
        Some(s) => {
            *state = s;
            Ok(true)
        }
        None => Ok(false),
    }
}

async fn run_join_attempt(
    inner: &Arc<Inner>,
    state: &mut ErasedState,
    candidate: MatchPresence,
) -> Result<JoinAttemptReply, MatchCoreError> {
    let tick = inner.tick.load(Ordering::Acquire);
    let taken = std::mem::replace(state, Box::new(()));

    let (next_state, allow, reason) = inner
        .core
        .match_join_attempt(tick, taken, &candidate)
        .await?;
    *state = next_state;

    Ok(JoinAttemptReply { allow, reason })
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
