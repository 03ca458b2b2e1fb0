use crate::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn ticks_run_and_nothing_stops_the_match() {
    let (handler, registry) = spawn(
        ProgrammableCore::new(200),
        MatchConfig::default(),
    )
    .await;

    tokio::time::sleep(Duration::from_millis(60)).await;

    assert!(!handler.is_stopped());
    assert!(handler.stats().ticks_run > 0);
    assert!(registry.removed().is_empty());

    handler.stop();
}
