use crate::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn data_beyond_queue_capacity_is_dropped_not_fatal() {
    let (handler, _registry) = spawn(
        ProgrammableCore::new(1000).with_loop_delay(Duration::from_millis(200)),
        MatchConfig {
            input_queue_size: 2,
            tick_rate: 1000,
            ..MatchConfig::default()
        },
    )
    .await;

    // let the dispatcher pick up its first tick and block inside match_loop
    tokio::time::sleep(Duration::from_millis(20)).await;

    for op_code in 0..8 {
        handler.queue_data(data_message(op_code));
    }

    assert!(handler.stats().data_dropped > 0);
    assert!(!handler.is_stopped());

    handler.stop();
}
