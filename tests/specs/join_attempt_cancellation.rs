use crate::prelude::*;
use match_engine::CancelToken;
use tokio::sync::oneshot;

#[tokio::test]
async fn a_cancelled_join_attempt_is_denied_without_invoking_the_core() {
    let core = ProgrammableCore::new(50);
    core.fail_join_attempts(); // would error if the core were ever invoked
    let (handler, _registry) = spawn(core, MatchConfig::default()).await;

    let cancel = CancelToken::new();
    cancel.cancel();
    let (tx, rx) = oneshot::channel();
    assert!(handler.queue_join_attempt(presence("node-a"), cancel, tx));

    let reply = rx.await.expect("dispatcher should reply");
    assert!(!reply.allow);
    assert!(!handler.is_stopped());

    handler.stop();
}

#[tokio::test]
async fn an_uncancelled_join_attempt_reaches_the_core() {
    let core = ProgrammableCore::new(50);
    let (handler, _registry) = spawn(core, MatchConfig::default()).await;

    let (tx, rx) = oneshot::channel();
    assert!(handler.queue_join_attempt(presence("node-a"), CancelToken::new(), tx));

    let reply = rx.await.expect("dispatcher should reply");
    assert!(reply.allow);

    handler.stop();
}
