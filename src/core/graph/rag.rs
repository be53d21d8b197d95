//! Resource-Allocation Graph projection for detecting deadlocks
//!
//! This module derives the combined directed graph from a store snapshot and
//! searches it for cycles. Under single-instance semantics a directed cycle
//! is necessary and sufficient for deadlock, so cycle existence is the whole
//! decision.
//!
//! # How it works
//!
//! The projection is computed fresh from the snapshot on every check; it is
//! never kept as a second source of truth that could drift from the stored
//! collections. Nodes are laid out in sorted order (processes before
//! resources, then by name) and edges keep the snapshot's sorted order, so
//! the traversal — and with it the witness cycle — is fully deterministic.
//!
//! Cycle search is an iterative depth-first traversal tracking one of
//! {unvisited, in-progress, finished} per node. An edge back to an
//! in-progress node closes a cycle; the DFS stack suffix from that node to
//! the top is the witness. Every node is used as a start point, so cycles in
//! disconnected components are found too.

use crate::core::store::GraphSnapshot;
use crate::core::types::NodeId;
use fxhash::FxHashMap;

/// Per-node traversal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Finished,
}

/// The combined request/allocation graph of one snapshot
///
/// Request edges point process -> resource, allocation edges point
/// resource -> process. Nodes are indexed densely by their position in the
/// sorted node list.
pub struct RagGraph {
    /// All nodes, sorted; a node's position is its index
    nodes: Vec<NodeId>,
    /// Outgoing neighbors per node index, ascending
    edges: Vec<Vec<usize>>,
}

impl RagGraph {
    /// Build the projection from a snapshot
    ///
    /// The snapshot's referential integrity guarantees every edge endpoint
    /// resolves to a node; an endpoint that does not is skipped.
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Self {
        let nodes: Vec<NodeId> = snapshot.nodes().collect();

        let mut process_index: FxHashMap<&str, usize> = FxHashMap::default();
        let mut resource_index: FxHashMap<&str, usize> = FxHashMap::default();
        for (index, node) in nodes.iter().enumerate() {
            match node {
                NodeId::Process(name) => process_index.insert(name.as_str(), index),
                NodeId::Resource(name) => resource_index.insert(name.as_str(), index),
            };
        }

        let mut edges = vec![Vec::new(); nodes.len()];
        for edge in &snapshot.request_edges {
            if let (Some(&from), Some(&to)) = (
                process_index.get(edge.process.as_str()),
                resource_index.get(edge.resource.as_str()),
            ) {
                edges[from].push(to);
            }
        }
        for edge in &snapshot.allocation_edges {
            if let (Some(&from), Some(&to)) = (
                resource_index.get(edge.resource.as_str()),
                process_index.get(edge.process.as_str()),
            ) {
                edges[from].push(to);
            }
        }

        RagGraph { nodes, edges }
    }

    /// Number of nodes in the projection
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Find a directed cycle, if one exists
    ///
    /// Runs the tri-color DFS from every not-yet-visited node, so the whole
    /// graph is covered regardless of connectivity. O(V+E).
    ///
    /// # Returns
    /// * `Some(Vec<NodeId>)` - one witness cycle in traversal order, the
    ///   first node not repeated at the end
    /// * `None` - the graph is acyclic
    pub fn find_cycle(&self) -> Option<Vec<NodeId>> {
        let mut state = vec![Visit::Unvisited; self.nodes.len()];

        for start in 0..self.nodes.len() {
            if state[start] != Visit::Unvisited {
                continue;
            }
            state[start] = Visit::InProgress;

            // Explicit stack of (node, next neighbor cursor) frames
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
            while let Some(&(node, cursor)) = stack.last() {
                match self.edges[node].get(cursor) {
                    Some(&next) => {
                        if let Some(frame) = stack.last_mut() {
                            frame.1 += 1;
                        }
                        match state[next] {
                            Visit::Unvisited => {
                                state[next] = Visit::InProgress;
                                stack.push((next, 0));
                            }
                            Visit::InProgress => {
                                // Back edge. Every in-progress node is on the
                                // stack, and the suffix from `next` up closes
                                // the cycle. A self-loop reduces to a one-node
                                // suffix.
                                if let Some(position) =
                                    stack.iter().position(|&(stacked, _)| stacked == next)
                                {
                                    let cycle = stack[position..]
                                        .iter()
                                        .map(|&(index, _)| self.nodes[index].clone())
                                        .collect();
                                    return Some(cycle);
                                }
                            }
                            Visit::Finished => {}
                        }
                    }
                    None => {
                        state[node] = Visit::Finished;
                        stack.pop();
                    }
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::GraphStore;

    fn store_with_nodes(processes: &[&str], resources: &[&str]) -> GraphStore {
        let mut store = GraphStore::new();
        for name in processes {
            store.add_process(name).unwrap();
        }
        for name in resources {
            store.add_resource(name).unwrap();
        }
        store
    }

    #[test]
    fn test_empty_projection() {
        let store = GraphStore::new();
        let graph = RagGraph::from_snapshot(&store.snapshot());

        assert_eq!(graph.node_count(), 0);
        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn test_two_cycle_between_process_and_resource() {
        let mut store = store_with_nodes(&["P1"], &["R1"]);
        store.add_request_edge("P1", "R1").unwrap();
        store.add_allocation_edge("R1", "P1").unwrap();

        let cycle = RagGraph::from_snapshot(&store.snapshot())
            .find_cycle()
            .expect("2-cycle should be found");

        assert_eq!(cycle.len(), 2);
        assert!(cycle.contains(&NodeId::Process("P1".to_string())));
        assert!(cycle.contains(&NodeId::Resource("R1".to_string())));
    }

    #[test]
    fn test_chain_has_no_cycle() {
        let mut store = store_with_nodes(&["P1", "P2"], &["R1", "R2"]);
        // R1 -> P1 -> R2 -> P2, a straight line
        store.add_allocation_edge("R1", "P1").unwrap();
        store.add_request_edge("P1", "R2").unwrap();
        store.add_allocation_edge("R2", "P2").unwrap();

        assert!(
            RagGraph::from_snapshot(&store.snapshot())
                .find_cycle()
                .is_none()
        );
    }

    #[test]
    fn test_four_node_cycle() {
        let mut store = store_with_nodes(&["P1", "P2"], &["R1", "R2"]);
        // R1 -> P1 -> R2 -> P2 -> R1
        store.add_allocation_edge("R1", "P1").unwrap();
        store.add_request_edge("P1", "R2").unwrap();
        store.add_allocation_edge("R2", "P2").unwrap();
        store.add_request_edge("P2", "R1").unwrap();

        let cycle = RagGraph::from_snapshot(&store.snapshot())
            .find_cycle()
            .expect("4-cycle should be found");
        assert_eq!(cycle.len(), 4);
    }

    #[test]
    fn test_cycle_in_disconnected_component_is_found() {
        // A harmless connected chunk plus an isolated deadlocked pair whose
        // names sort after everything else
        let mut store = store_with_nodes(&["A", "Z1"], &["B", "Z2"]);
        store.add_request_edge("A", "B").unwrap();
        store.add_request_edge("Z1", "Z2").unwrap();
        store.add_allocation_edge("Z2", "Z1").unwrap();

        let cycle = RagGraph::from_snapshot(&store.snapshot())
            .find_cycle()
            .expect("cycle in second component should be found");

        assert_eq!(cycle.len(), 2);
        assert!(cycle.contains(&NodeId::Process("Z1".to_string())));
        assert!(cycle.contains(&NodeId::Resource("Z2".to_string())));
    }

    #[test]
    fn test_witness_is_deterministic_across_insertion_orders() {
        let mut a = store_with_nodes(&["P1", "P2"], &["R1", "R2"]);
        a.add_allocation_edge("R1", "P1").unwrap();
        a.add_request_edge("P1", "R2").unwrap();
        a.add_allocation_edge("R2", "P2").unwrap();
        a.add_request_edge("P2", "R1").unwrap();

        let mut b = store_with_nodes(&["P2", "P1"], &["R2", "R1"]);
        b.add_request_edge("P2", "R1").unwrap();
        b.add_allocation_edge("R2", "P2").unwrap();
        b.add_request_edge("P1", "R2").unwrap();
        b.add_allocation_edge("R1", "P1").unwrap();

        let cycle_a = RagGraph::from_snapshot(&a.snapshot()).find_cycle();
        let cycle_b = RagGraph::from_snapshot(&b.snapshot()).find_cycle();
        assert_eq!(cycle_a, cycle_b);
    }
}
