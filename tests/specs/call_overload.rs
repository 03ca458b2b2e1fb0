use crate::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn call_queue_overload_stops_the_match_and_removes_it_from_the_registry_once() {
    let (handler, registry) = spawn(
        ProgrammableCore::new(100).with_loop_delay(Duration::from_millis(300)),
        MatchConfig {
            call_queue_size: 1,
            tick_rate: 100,
            ..MatchConfig::default()
        },
    )
    .await;

    let id = handler.id();
    // let the dispatcher pick up its first tick and block in match_loop
    tokio::time::sleep(Duration::from_millis(10)).await;
    // fills the one remaining call queue slot; when the dispatcher wakes,
    // the ticker's own attempt to enqueue the next tick finds no room
    assert!(handler.queue_join(vec![presence("node-a")]));

    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(handler.is_stopped());
    assert_eq!(registry.removed_count(id), 1);
}
