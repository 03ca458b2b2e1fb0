// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher-local diagnostic counters.
//!
//! Not part of the wire protocol, not persisted, and never read by the
//! dispatcher itself — purely for a host process to expose operational
//! visibility into one match instance.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub(crate) struct Counters {
    pub ticks_run: AtomicU64,
    pub data_dropped: AtomicU64,
    pub call_rejected: AtomicU64,
    pub join_attempts_rejected: AtomicU64,
}

impl Counters {
    pub(crate) fn snapshot(&self) -> MatchStats {
        MatchStats {
            ticks_run: self.ticks_run.load(Ordering::Relaxed),
            data_dropped: self.data_dropped.load(Ordering::Relaxed),
            call_rejected: self.call_rejected.load(Ordering::Relaxed),
            join_attempts_rejected: self.join_attempts_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of a match's dispatcher counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub ticks_run: u64,
    pub data_dropped: u64,
    pub call_rejected: u64,
    pub join_attempts_rejected: u64,
}
