//! Graph store for the resource-allocation graph
//!
//! This module owns the authoritative sets of processes, resources, request
//! edges and allocation edges, and guards the model invariants under every
//! mutation:
//!
//! 1. Process and resource names are drawn from one namespace and stay
//!    pairwise disjoint.
//! 2. Every edge endpoint denotes a node that currently exists, with the
//!    right kind on each end.
//! 3. Edge sets have set semantics keyed on the endpoint pair.
//! 4. Removing a node removes every edge incident to it, atomically.
//!
//! A failed operation performs no mutation at all: every operation validates
//! first and only then touches the collections.

use crate::core::types::{NodeId, NodeKind, StoreError};
use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};

/// A request edge: `process` is waiting for `resource`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestEdge {
    /// The waiting process
    pub process: String,
    /// The resource it is waiting for
    pub resource: String,
}

/// An allocation edge: `resource` is currently held by `process`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AllocationEdge {
    /// The held resource
    pub resource: String,
    /// The process holding it
    pub process: String,
}

/// The authoritative owner of the four graph collections
///
/// Nothing else in the crate mutates these sets. The deadlock checker and the
/// rendering collaborator only ever see an immutable [`GraphSnapshot`] taken
/// through [`GraphStore::snapshot`].
#[derive(Debug, Default)]
pub struct GraphStore {
    processes: FxHashSet<String>,
    resources: FxHashSet<String>,
    request_edges: FxHashSet<RequestEdge>,
    allocation_edges: FxHashSet<AllocationEdge>,
}

impl GraphStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up what kind of node, if any, `name` currently denotes
    pub fn kind_of(&self, name: &str) -> Option<NodeKind> {
        if self.processes.contains(name) {
            Some(NodeKind::Process)
        } else if self.resources.contains(name) {
            Some(NodeKind::Resource)
        } else {
            None
        }
    }

    /// Add a process with the given name
    ///
    /// # Errors
    /// * `InvalidName` if the name is empty or contains whitespace
    /// * `DuplicateName` if the name already denotes a process or a resource
    pub fn add_process(&mut self, name: &str) -> Result<(), StoreError> {
        validate_name(name)?;
        if let Some(existing) = self.kind_of(name) {
            return Err(StoreError::DuplicateName {
                name: name.to_string(),
                existing,
            });
        }
        self.processes.insert(name.to_string());
        Ok(())
    }

    /// Add a resource with the given name
    ///
    /// Symmetric to [`GraphStore::add_process`]; the duplicate check spans
    /// both node sets because the namespace is shared.
    pub fn add_resource(&mut self, name: &str) -> Result<(), StoreError> {
        validate_name(name)?;
        if let Some(existing) = self.kind_of(name) {
            return Err(StoreError::DuplicateName {
                name: name.to_string(),
                existing,
            });
        }
        self.resources.insert(name.to_string());
        Ok(())
    }

    /// Remove a process and every edge incident to it
    ///
    /// # Errors
    /// `NotFound` if no process with this name exists. Nothing is removed in
    /// that case.
    pub fn remove_process(&mut self, name: &str) -> Result<(), StoreError> {
        if !self.processes.remove(name) {
            return Err(StoreError::NotFound {
                what: format!("process '{name}'"),
            });
        }
        self.request_edges.retain(|edge| edge.process != name);
        self.allocation_edges.retain(|edge| edge.process != name);
        Ok(())
    }

    /// Remove a resource and every edge incident to it
    pub fn remove_resource(&mut self, name: &str) -> Result<(), StoreError> {
        if !self.resources.remove(name) {
            return Err(StoreError::NotFound {
                what: format!("resource '{name}'"),
            });
        }
        self.request_edges.retain(|edge| edge.resource != name);
        self.allocation_edges.retain(|edge| edge.resource != name);
        Ok(())
    }

    /// Add a request edge: `process` starts waiting for `resource`
    ///
    /// # Errors
    /// * `UnknownNode` if either endpoint is missing (checked kind-wise)
    /// * `DuplicateEdge` if the pair is already present
    pub fn add_request_edge(&mut self, process: &str, resource: &str) -> Result<(), StoreError> {
        self.require_process(process)?;
        self.require_resource(resource)?;

        let edge = RequestEdge {
            process: process.to_string(),
            resource: resource.to_string(),
        };
        if self.request_edges.contains(&edge) {
            return Err(StoreError::DuplicateEdge {
                from: process.to_string(),
                to: resource.to_string(),
            });
        }
        self.request_edges.insert(edge);
        Ok(())
    }

    /// Add an allocation edge: `resource` is now held by `process`
    ///
    /// Symmetric to [`GraphStore::add_request_edge`] with the endpoint roles
    /// swapped.
    pub fn add_allocation_edge(&mut self, resource: &str, process: &str) -> Result<(), StoreError> {
        self.require_resource(resource)?;
        self.require_process(process)?;

        let edge = AllocationEdge {
            resource: resource.to_string(),
            process: process.to_string(),
        };
        if self.allocation_edges.contains(&edge) {
            return Err(StoreError::DuplicateEdge {
                from: resource.to_string(),
                to: process.to_string(),
            });
        }
        self.allocation_edges.insert(edge);
        Ok(())
    }

    /// Remove a request edge
    ///
    /// # Errors
    /// `NotFound` if the edge is not present. Callers that prefer idempotent
    /// removal can match on the error kind and ignore it.
    pub fn remove_request_edge(&mut self, process: &str, resource: &str) -> Result<(), StoreError> {
        let edge = RequestEdge {
            process: process.to_string(),
            resource: resource.to_string(),
        };
        if !self.request_edges.remove(&edge) {
            return Err(StoreError::NotFound {
                what: format!("request edge {process} -> {resource}"),
            });
        }
        Ok(())
    }

    /// Remove an allocation edge
    pub fn remove_allocation_edge(
        &mut self,
        resource: &str,
        process: &str,
    ) -> Result<(), StoreError> {
        let edge = AllocationEdge {
            resource: resource.to_string(),
            process: process.to_string(),
        };
        if !self.allocation_edges.remove(&edge) {
            return Err(StoreError::NotFound {
                what: format!("allocation edge {resource} -> {process}"),
            });
        }
        Ok(())
    }

    /// Take an immutable, fully-applied snapshot of the current graph
    ///
    /// The snapshot is an owned copy with every list sorted, so it is
    /// deterministic regardless of insertion order and safe to hand to the
    /// checker and the renderer while further mutations proceed.
    pub fn snapshot(&self) -> GraphSnapshot {
        let mut processes: Vec<String> = self.processes.iter().cloned().collect();
        let mut resources: Vec<String> = self.resources.iter().cloned().collect();
        let mut request_edges: Vec<RequestEdge> = self.request_edges.iter().cloned().collect();
        let mut allocation_edges: Vec<AllocationEdge> =
            self.allocation_edges.iter().cloned().collect();

        processes.sort();
        resources.sort();
        request_edges.sort();
        allocation_edges.sort();

        GraphSnapshot {
            processes,
            resources,
            request_edges,
            allocation_edges,
        }
    }

    fn require_process(&self, name: &str) -> Result<(), StoreError> {
        if self.processes.contains(name) {
            Ok(())
        } else {
            Err(StoreError::UnknownNode {
                name: name.to_string(),
                expected: NodeKind::Process,
            })
        }
    }

    fn require_resource(&self, name: &str) -> Result<(), StoreError> {
        if self.resources.contains(name) {
            Ok(())
        } else {
            Err(StoreError::UnknownNode {
                name: name.to_string(),
                expected: NodeKind::Resource,
            })
        }
    }
}

/// Names must be non-empty single tokens so every surface (CLI, log, viewer)
/// can round-trip them unquoted.
fn validate_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(StoreError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// An immutable view of the four graph collections at one instant
///
/// The directed graph the checker and the renderer work on is derived from
/// this on demand; it is never stored as a second source of truth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphSnapshot {
    /// Process names, sorted
    pub processes: Vec<String>,
    /// Resource names, sorted
    pub resources: Vec<String>,
    /// Request edges, sorted
    pub request_edges: Vec<RequestEdge>,
    /// Allocation edges, sorted
    pub allocation_edges: Vec<AllocationEdge>,
}

impl GraphSnapshot {
    /// Whether the snapshot has no nodes at all
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty() && self.resources.is_empty()
    }

    /// Total node count
    pub fn node_count(&self) -> usize {
        self.processes.len() + self.resources.len()
    }

    /// Total edge count across both edge sets
    pub fn edge_count(&self) -> usize {
        self.request_edges.len() + self.allocation_edges.len()
    }

    /// All nodes as tagged identifiers, processes first, each group sorted
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.processes
            .iter()
            .map(|name| NodeId::Process(name.clone()))
            .chain(
                self.resources
                    .iter()
                    .map(|name| NodeId::Resource(name.clone())),
            )
    }

    /// Project the snapshot into the shape the rendering collaborator consumes
    ///
    /// Node lists partitioned by kind plus one combined, typed edge list. The
    /// renderer gets no deadlock semantics from this.
    pub fn graph_state(&self) -> GraphState {
        let mut links = Vec::with_capacity(self.edge_count());

        for edge in &self.request_edges {
            links.push(GraphLink {
                source: edge.process.clone(),
                target: edge.resource.clone(),
                link_type: "Request".to_string(),
            });
        }
        for edge in &self.allocation_edges {
            links.push(GraphLink {
                source: edge.resource.clone(),
                target: edge.process.clone(),
                link_type: "Allocation".to_string(),
            });
        }

        GraphState {
            processes: self.processes.clone(),
            resources: self.resources.clone(),
            links,
        }
    }
}

/// A directed link between two named nodes, as the renderer sees it
#[derive(Debug, Serialize, Clone)]
pub struct GraphLink {
    /// Source node name
    pub source: String,
    /// Target node name
    pub target: String,
    /// Type of relationship (request or allocation)
    #[serde(rename = "type")]
    pub link_type: String,
}

/// Represents the complete renderable state of the graph
///
/// This is the rendering-collaborator contract: everything a layout/drawing
/// backend needs, and nothing it does not.
#[derive(Debug, Serialize, Clone)]
pub struct GraphState {
    /// All process names
    pub processes: Vec<String>,
    /// All resource names
    pub resources: Vec<String>,
    /// All edges, request and allocation combined
    pub links: Vec<GraphLink>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_disjointness_enforced_both_ways() {
        let mut store = GraphStore::new();
        store.add_process("A").unwrap();
        store.add_resource("B").unwrap();

        // A resource may not reuse a process name
        assert_eq!(
            store.add_resource("A"),
            Err(StoreError::DuplicateName {
                name: "A".to_string(),
                existing: NodeKind::Process,
            })
        );
        // A process may not reuse a resource name
        assert_eq!(
            store.add_process("B"),
            Err(StoreError::DuplicateName {
                name: "B".to_string(),
                existing: NodeKind::Resource,
            })
        );
        // And plain re-adds are rejected too
        assert!(store.add_process("A").is_err());
        assert!(store.add_resource("B").is_err());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.processes, vec!["A".to_string()]);
        assert_eq!(snapshot.resources, vec!["B".to_string()]);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut store = GraphStore::new();

        assert!(matches!(
            store.add_process(""),
            Err(StoreError::InvalidName { .. })
        ));
        assert!(matches!(
            store.add_resource("R 1"),
            Err(StoreError::InvalidName { .. })
        ));
        assert_eq!(store.snapshot().node_count(), 0);
    }

    #[test]
    fn test_duplicate_edge_rejected_and_set_unchanged() {
        let mut store = GraphStore::new();
        store.add_process("P1").unwrap();
        store.add_resource("R1").unwrap();

        store.add_request_edge("P1", "R1").unwrap();
        assert_eq!(
            store.add_request_edge("P1", "R1"),
            Err(StoreError::DuplicateEdge {
                from: "P1".to_string(),
                to: "R1".to_string(),
            })
        );
        assert_eq!(store.snapshot().request_edges.len(), 1);

        store.add_allocation_edge("R1", "P1").unwrap();
        assert!(store.add_allocation_edge("R1", "P1").is_err());
        assert_eq!(store.snapshot().allocation_edges.len(), 1);
    }

    #[test]
    fn test_edge_endpoints_must_exist_with_right_kind() {
        let mut store = GraphStore::new();
        store.add_process("P1").unwrap();
        store.add_resource("R1").unwrap();

        // Missing endpoints
        assert_eq!(
            store.add_request_edge("P2", "R1"),
            Err(StoreError::UnknownNode {
                name: "P2".to_string(),
                expected: NodeKind::Process,
            })
        );
        assert_eq!(
            store.add_request_edge("P1", "R2"),
            Err(StoreError::UnknownNode {
                name: "R2".to_string(),
                expected: NodeKind::Resource,
            })
        );

        // Existing nodes in the wrong role are unknown too: a request edge
        // cannot start at a resource
        assert!(store.add_request_edge("R1", "R1").is_err());
        assert!(store.add_allocation_edge("P1", "P1").is_err());

        // Nothing was inserted by the failed attempts
        assert_eq!(store.snapshot().edge_count(), 0);
    }

    #[test]
    fn test_remove_process_cascades_to_incident_edges() {
        let mut store = GraphStore::new();
        store.add_process("P1").unwrap();
        store.add_process("P2").unwrap();
        store.add_resource("Q").unwrap();
        store.add_resource("R").unwrap();

        // P1 holds R and requests Q; P2 requests R
        store.add_allocation_edge("R", "P1").unwrap();
        store.add_request_edge("P1", "Q").unwrap();
        store.add_request_edge("P2", "R").unwrap();

        store.remove_process("P1").unwrap();

        let snapshot = store.snapshot();
        // Both of P1's edges are gone, P2's edge is untouched
        assert_eq!(
            snapshot.request_edges,
            vec![RequestEdge {
                process: "P2".to_string(),
                resource: "R".to_string(),
            }]
        );
        assert!(snapshot.allocation_edges.is_empty());
        assert_eq!(snapshot.processes, vec!["P2".to_string()]);
    }

    #[test]
    fn test_remove_resource_cascades_to_incident_edges() {
        let mut store = GraphStore::new();
        store.add_process("P1").unwrap();
        store.add_resource("R1").unwrap();
        store.add_resource("R2").unwrap();

        store.add_request_edge("P1", "R1").unwrap();
        store.add_allocation_edge("R1", "P1").unwrap();
        store.add_allocation_edge("R2", "P1").unwrap();

        store.remove_resource("R1").unwrap();

        let snapshot = store.snapshot();
        assert!(snapshot.request_edges.is_empty());
        assert_eq!(
            snapshot.allocation_edges,
            vec![AllocationEdge {
                resource: "R2".to_string(),
                process: "P1".to_string(),
            }]
        );
    }

    #[test]
    fn test_remove_missing_node_or_edge_is_not_found() {
        let mut store = GraphStore::new();
        store.add_process("P1").unwrap();
        store.add_resource("R1").unwrap();

        assert!(matches!(
            store.remove_process("P9"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.remove_resource("R9"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.remove_request_edge("P1", "R1"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.remove_allocation_edge("R1", "P1"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_snapshot_is_insertion_order_independent() {
        let mut a = GraphStore::new();
        a.add_process("P1").unwrap();
        a.add_process("P2").unwrap();
        a.add_resource("R1").unwrap();
        a.add_request_edge("P1", "R1").unwrap();
        a.add_request_edge("P2", "R1").unwrap();

        let mut b = GraphStore::new();
        b.add_resource("R1").unwrap();
        b.add_process("P2").unwrap();
        b.add_process("P1").unwrap();
        b.add_request_edge("P2", "R1").unwrap();
        b.add_request_edge("P1", "R1").unwrap();

        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_snapshot_unaffected_by_later_mutations() {
        let mut store = GraphStore::new();
        store.add_process("P1").unwrap();
        store.add_resource("R1").unwrap();
        store.add_request_edge("P1", "R1").unwrap();

        let before = store.snapshot();
        store.remove_process("P1").unwrap();

        assert_eq!(before.processes, vec!["P1".to_string()]);
        assert_eq!(before.request_edges.len(), 1);
        assert!(store.snapshot().request_edges.is_empty());
    }

    #[test]
    fn test_graph_state_projection() {
        let mut store = GraphStore::new();
        store.add_process("P1").unwrap();
        store.add_resource("R1").unwrap();
        store.add_request_edge("P1", "R1").unwrap();
        store.add_allocation_edge("R1", "P1").unwrap();

        let state = store.snapshot().graph_state();
        assert_eq!(state.processes, vec!["P1".to_string()]);
        assert_eq!(state.resources, vec!["R1".to_string()]);
        assert_eq!(state.links.len(), 2);

        let request = state
            .links
            .iter()
            .find(|link| link.link_type == "Request")
            .unwrap();
        assert_eq!(request.source, "P1");
        assert_eq!(request.target, "R1");

        let allocation = state
            .links
            .iter()
            .find(|link| link.link_type == "Allocation")
            .unwrap();
        assert_eq!(allocation.source, "R1");
        assert_eq!(allocation.target, "P1");
    }

    #[test]
    fn test_kind_of_lookup() {
        let mut store = GraphStore::new();
        store.add_process("P1").unwrap();
        store.add_resource("R1").unwrap();

        assert_eq!(store.kind_of("P1"), Some(NodeKind::Process));
        assert_eq!(store.kind_of("R1"), Some(NodeKind::Resource));
        assert_eq!(store.kind_of("X"), None);
    }
}
