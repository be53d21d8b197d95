// Core types
pub mod types;
pub use types::*;

// Logging functionality
pub mod logger;
pub use logger::init_logger;

// Graph implementation
pub mod graph;

// Graph store
pub mod store;
pub use store::{AllocationEdge, GraphLink, GraphSnapshot, GraphState, GraphStore, RequestEdge};

// Deadlock checker
pub mod checker;
pub use checker::check_deadlock;

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;

/// RagSim session builder
///
/// Configures and starts an interactive session. The graph store is created
/// when the session starts and dropped with it; it is never global state.
pub struct RagSim {
    log_path: Option<String>,
    callback: Box<dyn Fn(DeadlockReport) + Send + Sync + 'static>,
}

impl Default for RagSim {
    fn default() -> Self {
        Self::new()
    }
}

impl RagSim {
    /// Create a new builder with default settings
    ///
    /// By default:
    /// - Logging is disabled
    /// - The deadlock callback does nothing (checks are interactive queries;
    ///   the caller reads the verdict from the returned report)
    pub fn new() -> Self {
        RagSim {
            log_path: None,
            callback: Box::new(|_| {}),
        }
    }

    /// Activate logging and set the path for the log file
    ///
    /// # Arguments
    /// * `path` - Path to the log file. If the path contains "{timestamp}",
    ///   it will be replaced with the current timestamp.
    ///
    /// # Returns
    /// The builder for method chaining
    pub fn with_log<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.log_path = Some(path.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Set a callback to be invoked whenever a check detects a deadlock
    ///
    /// # Arguments
    /// * `callback` - Function called with the report of each deadlocked check
    ///
    /// # Returns
    /// The builder for method chaining
    pub fn on_deadlock<F>(mut self, callback: F) -> Self
    where
        F: Fn(DeadlockReport) + Send + Sync + 'static,
    {
        self.callback = Box::new(callback);
        self
    }

    /// Start the session with the configured settings
    ///
    /// # Returns
    /// The running [`Session`] owning a fresh, empty graph store
    ///
    /// # Errors
    /// Returns an error if logger initialization fails
    pub fn start(self) -> Result<Session> {
        match self.log_path {
            Some(log_path) => {
                logger::init_logger(Some(log_path)).context("Failed to initialize logger")?;
            }
            None => logger::init_logger(None::<&str>).context("Failed to initialize logger")?,
        }

        // Print header
        println!("{}", crate::BANNER);

        Ok(Session {
            store: Mutex::new(GraphStore::new()),
            callback: self.callback,
        })
    }
}

/// A running simulator session
///
/// Owns the graph store for its whole lifetime. Every operation takes the
/// store lock for its full duration, so mutations apply one at a time and a
/// snapshot can never observe a half-applied mutation, even if the session is
/// shared across threads.
pub struct Session {
    store: Mutex<GraphStore>,
    callback: Box<dyn Fn(DeadlockReport) + Send + Sync + 'static>,
}

impl Session {
    /// Add a process to the graph
    pub fn add_process(&self, name: &str) -> Result<(), StoreError> {
        let mut store = self.store.lock();
        store.add_process(name)?;
        log_mutation(Action::AddProcess, Some(name), None, &store);
        Ok(())
    }

    /// Add a resource to the graph
    pub fn add_resource(&self, name: &str) -> Result<(), StoreError> {
        let mut store = self.store.lock();
        store.add_resource(name)?;
        log_mutation(Action::AddResource, Some(name), None, &store);
        Ok(())
    }

    /// Remove a process and its incident edges
    pub fn remove_process(&self, name: &str) -> Result<(), StoreError> {
        let mut store = self.store.lock();
        store.remove_process(name)?;
        log_mutation(Action::RemoveProcess, Some(name), None, &store);
        Ok(())
    }

    /// Remove a resource and its incident edges
    pub fn remove_resource(&self, name: &str) -> Result<(), StoreError> {
        let mut store = self.store.lock();
        store.remove_resource(name)?;
        log_mutation(Action::RemoveResource, Some(name), None, &store);
        Ok(())
    }

    /// Add a request edge: `process` starts waiting for `resource`
    pub fn add_request_edge(&self, process: &str, resource: &str) -> Result<(), StoreError> {
        let mut store = self.store.lock();
        store.add_request_edge(process, resource)?;
        log_mutation(Action::AddRequest, Some(process), Some(resource), &store);
        Ok(())
    }

    /// Remove a request edge
    pub fn remove_request_edge(&self, process: &str, resource: &str) -> Result<(), StoreError> {
        let mut store = self.store.lock();
        store.remove_request_edge(process, resource)?;
        log_mutation(Action::RemoveRequest, Some(process), Some(resource), &store);
        Ok(())
    }

    /// Add an allocation edge: `resource` is now held by `process`
    pub fn add_allocation_edge(&self, resource: &str, process: &str) -> Result<(), StoreError> {
        let mut store = self.store.lock();
        store.add_allocation_edge(resource, process)?;
        log_mutation(Action::AddAllocation, Some(resource), Some(process), &store);
        Ok(())
    }

    /// Remove an allocation edge
    pub fn remove_allocation_edge(&self, resource: &str, process: &str) -> Result<(), StoreError> {
        let mut store = self.store.lock();
        store.remove_allocation_edge(resource, process)?;
        log_mutation(Action::RemoveAllocation, Some(resource), Some(process), &store);
        Ok(())
    }

    /// Take an immutable snapshot of the current graph
    pub fn snapshot(&self) -> GraphSnapshot {
        self.store.lock().snapshot()
    }

    /// Run the deadlock checker against the current snapshot
    ///
    /// Invokes the configured deadlock callback when the verdict is
    /// `CycleDetected`, then returns the report either way.
    pub fn check_deadlock(&self) -> DeadlockReport {
        let store = self.store.lock();
        let snapshot = store.snapshot();
        log_mutation(Action::Check, None, None, &store);
        drop(store);

        let report = DeadlockReport {
            verdict: check_deadlock(&snapshot),
            timestamp: Utc::now().to_rfc3339(),
        };
        if report.verdict.is_deadlock() {
            (self.callback)(report.clone());
        }
        report
    }
}

/// Append one entry to the global event log, if logging is enabled
fn log_mutation(action: Action, subject: Option<&str>, object: Option<&str>, store: &GraphStore) {
    if logger::is_logging_enabled() {
        logger::log_action(action, subject, object, &store.snapshot().graph_state());
    }
}
