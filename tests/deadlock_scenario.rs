use ragsim::{DeadlockReport, RagSim};
use std::sync::{Arc, Mutex};

mod common;
use common::{assert_acyclic, expect_cycle};

#[test]
fn test_request_then_allocation_then_release() {
    // Collect every report the deadlock callback sees
    let reports: Arc<Mutex<Vec<DeadlockReport>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);

    let session = RagSim::new()
        .on_deadlock(move |report| {
            sink.lock().unwrap().push(report);
        })
        .start()
        .expect("Failed to start session");

    // P1 waits for R1: a single edge cannot be a cycle
    session.add_process("P1").unwrap();
    session.add_resource("R1").unwrap();
    session.add_request_edge("P1", "R1").unwrap();
    assert_acyclic(&session);

    // R1 is also held by P1: the classic two-node deadlock
    session.add_allocation_edge("R1", "P1").unwrap();
    let cycle = expect_cycle(&session);
    assert_eq!(
        cycle.len(),
        2,
        "Deadlock should involve exactly P1 and R1, got {cycle:?}"
    );

    // Dropping the request breaks the cycle again
    session.remove_request_edge("P1", "R1").unwrap();
    assert_acyclic(&session);

    // The callback fired exactly once, for the deadlocked check only
    let reports = reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].verdict.is_deadlock());
    assert!(!reports[0].timestamp.is_empty());
}
