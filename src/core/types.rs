use serde::{Deserialize, Serialize};
use std::fmt;

/// The two kinds of node a resource-allocation graph contains.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// An entity that may request and hold resources
    Process,
    /// A single-instance entity held by at most one process at a time
    Resource,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Process => write!(f, "process"),
            NodeKind::Resource => write!(f, "resource"),
        }
    }
}

/// A tagged node identifier
///
/// Processes and resources share one name namespace but are never
/// interchangeable, so every surface that consumes nodes (the checker, the
/// renderer contract) carries the tag with the name. The derived ordering
/// (processes before resources, then by name) is what makes snapshots and
/// cycle witnesses deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Process(String),
    Resource(String),
}

impl NodeId {
    /// The bare name, without the tag
    pub fn name(&self) -> &str {
        match self {
            NodeId::Process(name) | NodeId::Resource(name) => name,
        }
    }

    /// Which kind of node this is
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeId::Process(_) => NodeKind::Process,
            NodeId::Resource(_) => NodeKind::Resource,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Represents the type of session action that occurred
///
/// These actions mirror the store's mutation surface one-to-one and are what
/// the event log records alongside the resulting graph state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Action {
    /// A process was added to the graph
    AddProcess,
    /// A process was removed, cascading to its incident edges
    RemoveProcess,
    /// A resource was added to the graph
    AddResource,
    /// A resource was removed, cascading to its incident edges
    RemoveResource,
    /// A request edge (process waits for resource) was added
    AddRequest,
    /// A request edge was removed
    RemoveRequest,
    /// An allocation edge (resource held by process) was added
    AddAllocation,
    /// An allocation edge was removed
    RemoveAllocation,
    /// The deadlock checker was invoked
    Check,
}

/// Outcome of a deadlock check
///
/// `Empty` is deliberately distinct from `Acyclic`: with zero nodes there is
/// nothing to decide, and the collaborator is expected to say so rather than
/// report "no deadlock".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeadlockVerdict {
    /// The snapshot has no nodes at all
    Empty,
    /// The graph has nodes but no directed cycle
    Acyclic,
    /// A directed cycle exists; single-instance semantics make this a deadlock
    ///
    /// Carries one witness cycle in traversal order. The first node is not
    /// repeated at the end; a self-loop is a one-element cycle.
    CycleDetected(Vec<NodeId>),
}

impl DeadlockVerdict {
    /// Whether this verdict means the graph is deadlocked
    pub fn is_deadlock(&self) -> bool {
        matches!(self, DeadlockVerdict::CycleDetected(_))
    }
}

/// Represents the result of a deadlock check with its detection time
///
/// This is what the session hands to the deadlock callback and what the
/// collaborator surfaces to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlockReport {
    /// The verdict for the checked snapshot
    pub verdict: DeadlockVerdict,
    /// ISO-8601 timestamp indicating when the check ran
    pub timestamp: String,
}

/// Errors returned by the graph store
///
/// All of these are local and recoverable: a failed operation performs no
/// mutation, and the collaborator presents the message to the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StoreError {
    /// The name is empty or contains whitespace
    InvalidName { name: String },
    /// The name already denotes a process or a resource
    DuplicateName { name: String, existing: NodeKind },
    /// An edge endpoint does not denote a current node of the required kind
    UnknownNode { name: String, expected: NodeKind },
    /// The edge is already present
    DuplicateEdge { from: String, to: String },
    /// The node or edge to remove is not present
    NotFound { what: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidName { name } => {
                write!(f, "invalid name {name:?}: names must be non-empty single tokens")
            }
            StoreError::DuplicateName { name, existing } => {
                write!(f, "name '{name}' is already in use by a {existing}")
            }
            StoreError::UnknownNode { name, expected } => {
                write!(f, "no {expected} named '{name}'")
            }
            StoreError::DuplicateEdge { from, to } => {
                write!(f, "edge {from} -> {to} already exists")
            }
            StoreError::NotFound { what } => write!(f, "{what} not found"),
        }
    }
}

impl std::error::Error for StoreError {}
