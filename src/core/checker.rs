//! Deadlock checker
//!
//! A single-shot, side-effect-free query over a [`GraphSnapshot`]: does the
//! combined request/allocation graph contain a directed cycle? Under the
//! single-instance model a cycle is necessary and sufficient for deadlock
//! (unlike multi-instance graphs, where it is only necessary), so the answer
//! is the verdict.

use crate::core::graph::RagGraph;
use crate::core::store::GraphSnapshot;
use crate::core::types::DeadlockVerdict;

/// Decide whether the snapshot's graph implies a deadlock
///
/// Pure and deterministic: the same snapshot always yields the same verdict
/// (including the same witness cycle), independent of how the store was
/// populated.
///
/// # Returns
/// * `Empty` - the snapshot has no nodes; nothing to decide
/// * `Acyclic` - no directed cycle, no deadlock
/// * `CycleDetected` - a cycle exists; the graph is deadlocked
pub fn check_deadlock(snapshot: &GraphSnapshot) -> DeadlockVerdict {
    if snapshot.is_empty() {
        return DeadlockVerdict::Empty;
    }
    match RagGraph::from_snapshot(snapshot).find_cycle() {
        Some(cycle) => DeadlockVerdict::CycleDetected(cycle),
        None => DeadlockVerdict::Acyclic,
    }
}
