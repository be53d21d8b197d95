use ragsim::{DeadlockVerdict, NodeId, RagSim, Session};

#[allow(dead_code)]
pub fn start_session() -> Session {
    RagSim::new().start().expect("Failed to start session")
}

#[allow(dead_code)]
pub fn expect_cycle(session: &Session) -> Vec<NodeId> {
    match session.check_deadlock().verdict {
        DeadlockVerdict::CycleDetected(cycle) => cycle,
        other => panic!("Expected a deadlock, got {other:?}"),
    }
}

#[allow(dead_code)]
pub fn assert_acyclic(session: &Session) {
    assert_eq!(session.check_deadlock().verdict, DeadlockVerdict::Acyclic);
}
