use std::time::{Duration, Instant};

use tandem_rpc_endpoint::error::InvokeError;
use tandem_rpc_endpoint::{CallOutcome, PendingCallTable};

#[tokio::test]
async fn parked_call_resolves_with_the_delivered_value() {
    let table = PendingCallTable::new();
    let completion = table
        .park(1, Instant::now() + Duration::from_secs(30))
        .expect("park failed");

    assert!(table.complete_value(1, b"\"ok\"".to_vec()));
    assert_eq!(
        completion.await.expect("completion dropped"),
        CallOutcome::Value(b"\"ok\"".to_vec())
    );
    assert!(table.is_empty());
}

#[tokio::test]
async fn first_completion_wins_and_later_ones_are_dropped() {
    let table = PendingCallTable::new();
    let completion = table
        .park(9, Instant::now() + Duration::from_secs(30))
        .expect("park failed");

    assert!(table.complete_value(9, b"1".to_vec()));
    // The call is gone; a racing exception reply for the same id is a no-op.
    assert!(!table.complete_remote_error(9, "too late".to_string()));
    assert!(!table.complete_value(9, b"2".to_vec()));

    assert_eq!(
        completion.await.expect("completion dropped"),
        CallOutcome::Value(b"1".to_vec())
    );
}

#[test]
fn parking_the_same_id_twice_fails() {
    let table = PendingCallTable::new();
    let deadline = Instant::now() + Duration::from_secs(30);

    let _completion = table.park(7, deadline).expect("first park failed");
    let err = table.park(7, deadline).expect_err("second park must fail");

    assert_eq!(err, InvokeError::DuplicateId { packet_id: 7 });
    assert_eq!(table.len(), 1);
}

#[tokio::test]
async fn take_all_empties_the_table_for_shutdown() {
    let table = PendingCallTable::new();
    let deadline = Instant::now() + Duration::from_secs(30);
    let completions: Vec<_> = (1..=3)
        .map(|id| table.park(id, deadline).expect("park failed"))
        .collect();

    let taken = table.take_all();
    assert_eq!(taken.len(), 3);
    assert!(table.is_empty());

    for call in taken {
        call.resolve(CallOutcome::Shutdown);
    }
    for completion in completions {
        assert_eq!(
            completion.await.expect("completion dropped"),
            CallOutcome::Shutdown
        );
    }
}

#[tokio::test]
async fn only_expired_calls_are_swept() {
    let table = PendingCallTable::new();
    let now = Instant::now();

    let expired = table.park(1, now - Duration::from_millis(1)).expect("park failed");
    let _alive = table.park(2, now + Duration::from_secs(30)).expect("park failed");

    let swept = table.take_expired(now);
    assert_eq!(swept.len(), 1);
    assert_eq!(swept[0].packet_id(), 1);
    assert_eq!(table.len(), 1);

    for call in swept {
        call.resolve(CallOutcome::TimedOut);
    }
    assert_eq!(
        expired.await.expect("completion dropped"),
        CallOutcome::TimedOut
    );
}

#[tokio::test]
async fn discarded_calls_never_resolve() {
    let table = PendingCallTable::new();
    let completion = table
        .park(4, Instant::now() + Duration::from_secs(30))
        .expect("park failed");

    table.discard(4);
    assert!(table.is_empty());
    assert!(completion.await.is_err());
}
