use crate::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn join_then_leave_round_trips_through_the_presence_list() {
    let (handler, _registry) = spawn(ProgrammableCore::new(50), MatchConfig::default()).await;

    let p = presence("node-a");
    assert!(handler.queue_join(vec![p.clone()]));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(handler.presence_list().contains(&p.presence_id()));

    assert!(handler.queue_leave(vec![p.clone()]));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!handler.presence_list().contains(&p.presence_id()));

    handler.stop();
}
