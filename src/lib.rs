//! # ragsim
//!
//! An interactive resource-allocation graph simulator with deadlock
//! detection.
//!
//! ragsim lets you build the classical operating-systems model of processes
//! requesting and holding single-instance resources, then asks one question
//! of the resulting directed graph: does it contain a cycle? Under the
//! single-instance model that is exactly the deadlock condition.
//!
//! ## Features
//!
//! - Graph store with namespace and referential-integrity invariants
//! - Pure, deterministic deadlock verdicts (`Empty` / `Acyclic` /
//!   `CycleDetected` with a witness cycle)
//! - Session action logging
//! - Web-based visualization of recorded sessions
//!
//! ## Example
//!
//! ```
//! use ragsim::{DeadlockVerdict, RagSim};
//!
//! let session = RagSim::new().start().expect("Failed to start session");
//! session.add_process("P1").unwrap();
//! session.add_resource("R1").unwrap();
//! session.add_request_edge("P1", "R1").unwrap();
//! assert_eq!(session.check_deadlock().verdict, DeadlockVerdict::Acyclic);
//!
//! session.add_allocation_edge("R1", "P1").unwrap();
//! assert!(session.check_deadlock().verdict.is_deadlock());
//! ```

mod core;
pub use core::{
    Action, AllocationEdge, DeadlockReport, DeadlockVerdict, GraphLink, GraphSnapshot, GraphState,
    GraphStore, NodeId, NodeKind, RagSim, RequestEdge, Session, StoreError, check_deadlock,
    logger::{get_current_log_file, init_logger, is_logging_enabled},
};

mod showcase;
pub use showcase::{showcase, showcase_this};

pub(crate) const BANNER: &str = r#"
      ▄▖ ▄▖ ▄▖ ▄▖ ▄▖ ▖  ▖
      ▙▘ ▌▌ ▌▌ ▚  ▐  ▛▖▞▌
      ▌▌ ▛▌ ▙▌ ▄▌ ▟▖ ▌▝ ▌
"#;
