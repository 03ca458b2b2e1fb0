use crate::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn terminate_with_zero_grace_stops_the_match_immediately() {
    let (handler, registry) = spawn(ProgrammableCore::new(50), MatchConfig::default()).await;
    let id = handler.id();

    assert!(handler.queue_terminate(0));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(handler.is_stopped());
    assert_eq!(registry.removed_count(id), 1);
}
