//! Logging functionality for ragsim
//!
//! This module records session actions and the graph state they produced as
//! JSON lines, supporting later replay and visualization of a session.

mod event_logger;

// Re-export core unified logging functionality
pub use event_logger::{
    ActionEntry, CombinedLogEntry, EventLogger, get_current_log_file, init_logger,
    is_logging_enabled, log_action,
};
