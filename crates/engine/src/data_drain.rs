// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The consume-only, non-blocking view over the data queue handed to
//! `MatchCore::match_loop`.
//!
//! This is a capability, not the raw channel: it only supports pulling
//! whatever is buffered *right now*, never awaiting more. That preserves
//! the invariant that only the dispatcher ever sees the channel itself —
//! `MatchLoop` controls its own per-tick batching without being able to
//! block the dispatcher on an empty queue.

use match_core::DataMessage;
use tokio::sync::mpsc;

pub struct DataDrain<'a> {
    receiver: &'a mut mpsc::Receiver<DataMessage>,
}

impl<'a> DataDrain<'a> {
    pub(crate) fn new(receiver: &'a mut mpsc::Receiver<DataMessage>) -> Self {
        Self { receiver }
    }

    /// Pull the next buffered message, if any, without waiting.
    pub fn try_next(&mut self) -> Option<DataMessage> {
        self.receiver.try_recv().ok()
    }
}

impl Iterator for DataDrain<'_> {
    type Item = DataMessage;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_next()
    }
}

#[cfg(test)]
#[path = "data_drain_tests.rs"]
mod tests;
