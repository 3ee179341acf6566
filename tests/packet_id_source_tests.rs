use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use tandem::utils::PacketIdSource;

#[test]
fn ids_start_at_one_and_increment() {
    let ids = PacketIdSource::new();
    assert_eq!(ids.next(), 1);
    assert_eq!(ids.next(), 2);
    assert_eq!(ids.next(), 3);
}

#[test]
fn zero_is_skipped_on_wrap() {
    let ids = PacketIdSource::starting_at(u32::MAX);
    assert_eq!(ids.next(), u32::MAX);
    // The counter wraps to 0 here, which is reserved and must be skipped.
    assert_eq!(ids.next(), 1);
}

#[test]
fn concurrent_callers_observe_distinct_ids() {
    let ids = Arc::new(PacketIdSource::new());
    let mut handles = Vec::new();

    for _ in 0..8 {
        let ids = Arc::clone(&ids);
        handles.push(thread::spawn(move || {
            (0..1000).map(|_| ids.next()).collect::<Vec<u32>>()
        }));
    }

    let mut seen = HashSet::new();
    for handle in handles {
        for id in handle.join().expect("id thread panicked") {
            assert!(seen.insert(id), "packet id {} was handed out twice", id);
        }
    }
    assert_eq!(seen.len(), 8 * 1000);
}
