// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound per-user data frames delivered into a match.

use crate::id::{SessionId, UserId};

/// One inbound data frame, immutable once enqueued.
///
/// `receive_time_ns` is stamped by the producer (network layer) at
/// enqueue time; the runtime treats it as an opaque timestamp and never
/// recomputes or validates it — whether it is wall-clock or monotonic time
/// is a decision left to the embedding host.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DataMessage {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub username: String,
    pub node: String,
    pub op_code: i64,
    pub data: Vec<u8>,
    pub receive_time_ns: i64,
}

#[cfg(test)]
#[path = "data_message_tests.rs"]
mod tests;
