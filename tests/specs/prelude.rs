#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

pub use match_core::{DataMessage, MatchId, MatchPresence, SessionId, UserId};
pub use match_engine::test_support::{FailingRegistry, InMemoryRegistry, NullRouter, NullTracker, ProgrammableCore};
pub use match_engine::{Collaborators, MatchConfig, MatchHandler};

use std::collections::HashMap;
use std::sync::Arc;

pub fn presence(node: &str) -> MatchPresence {
    MatchPresence {
        node: node.to_string(),
        session: SessionId::new_v4(),
        user_id: UserId::new("player"),
        username: "player".to_string(),
        persistence: false,
        status: None,
    }
}

pub fn data_message(op_code: i64) -> DataMessage {
    DataMessage {
        user_id: UserId::new("player"),
        session_id: SessionId::new_v4(),
        username: "player".to_string(),
        node: "node-a".to_string(),
        op_code,
        data: Vec::new(),
        receive_time_ns: 0,
    }
}

pub fn collaborators() -> (Collaborators, Arc<InMemoryRegistry>) {
    let registry = Arc::new(InMemoryRegistry::new());
    (
        Collaborators {
            registry: registry.clone(),
            tracker: Arc::new(NullTracker),
            router: Arc::new(NullRouter),
        },
        registry,
    )
}

pub async fn spawn(
    core: ProgrammableCore,
    config: MatchConfig,
) -> (MatchHandler, Arc<InMemoryRegistry>) {
    let (collaborators, registry) = collaborators();
    let handler = MatchHandler::new(
        MatchId::new_v4(),
        "node-a",
        core,
        HashMap::new(),
        config,
        collaborators,
    )
    .await
    .expect("match construction should succeed");
    (handler, registry)
}
