// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! match-engine: the per-match single-writer scheduler.
//!
//! [`MatchHandler`] is the scheduler and state-ownership boundary for one
//! match. It serializes the tick loop, inbound data, joins, leaves, and
//! termination through bounded channels onto a single dispatcher task, and
//! invokes a user-supplied [`MatchCore`] implementation on that task.
//!
//! The *registry* that maps match ids to handlers, the *tracker*/*router*
//! that publish presence changes and outbound frames, and wire-protocol
//! serialization all live outside this crate — see [`collaborators`] for
//! the trait boundaries this crate calls into.

pub mod collaborators;
pub mod config;
pub mod data_drain;
pub mod error;
pub mod handler;
pub mod match_core;
pub mod stats;
pub mod stream;

pub use collaborators::{Collaborators, MatchRegistry, MessageRouter, PresenceTracker, RegistryError};
pub use config::{ConfigError, MatchConfig};
pub use data_drain::DataDrain;
pub use error::MatchInitError;
pub use handler::{CancelToken, JoinAttemptReply, MatchHandler};
pub use match_core::{JoinAttemptOutcome, MatchCore, MatchCoreError, MatchInitOutcome};
pub use stats::MatchStats;
pub use stream::{MatchMode, MatchStream};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
