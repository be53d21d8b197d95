use crate::core::store::GraphState;
use crate::core::types::Action;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One log line: the action that ran and the graph state it left behind
#[derive(Debug, Serialize)]
pub struct CombinedLogEntry {
    pub action: ActionEntry,
    pub graph: GraphState,
}

/// Structure for a single action entry
#[derive(Debug, Serialize)]
pub struct ActionEntry {
    /// Which session action ran
    pub action: Action,
    /// Primary node name the action involved, if any
    pub subject: Option<String>,
    /// Secondary node name for edge actions
    pub object: Option<String>,
    /// Seconds since Unix epoch with microsecond precision
    pub timestamp: f64,
}

/// Determines how the logger should operate
#[derive(Debug)]
pub enum LoggerMode {
    /// Logging is disabled entirely
    Disabled,
    /// Log to the specified file
    ToFile(File),
}

/// Logger for recording session actions
pub struct EventLogger {
    mode: LoggerMode,
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLogger {
    /// Create a new logger with logging disabled
    pub fn new() -> Self {
        EventLogger {
            mode: LoggerMode::Disabled,
        }
    }

    /// Create a new logger that writes to the specified file
    ///
    /// # Arguments
    /// * `path` - Path to the log file. If the path contains "{timestamp}",
    ///   it will be replaced with the current timestamp. Missing parent
    ///   directories are created.
    pub fn with_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = resolve_log_path(path.as_ref())?;

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&file_path)
            .context("Failed to open log file")?;

        // Update the global registry so showcase can find the active log
        *CURRENT_LOG_FILE.lock().unwrap_or_else(|e| e.into_inner()) = Some(file_path);

        Ok(EventLogger {
            mode: LoggerMode::ToFile(file),
        })
    }

    /// Log an action and the graph state that resulted from it
    pub fn log_action(
        &self,
        action: Action,
        subject: Option<&str>,
        object: Option<&str>,
        graph: &GraphState,
    ) {
        // Early return if logging is disabled
        if let LoggerMode::Disabled = self.mode {
            return;
        }

        // Absolute timestamp as f64: seconds since Unix Epoch with microsecond precision
        let now = Utc::now();
        let timestamp = now.timestamp() as f64 + now.timestamp_subsec_micros() as f64 / 1_000_000.0;

        let entry = CombinedLogEntry {
            action: ActionEntry {
                action,
                subject: subject.map(str::to_string),
                object: object.map(str::to_string),
                timestamp,
            },
            graph: graph.clone(),
        };

        if let LoggerMode::ToFile(ref file) = self.mode {
            let mut file = file;
            if let Ok(json) = serde_json::to_string(&entry) {
                let _ = writeln!(file, "{}", json);
                let _ = file.flush();
            }
        }
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        !matches!(self.mode, LoggerMode::Disabled)
    }
}

/// Expand the "{timestamp}" placeholder and create parent directories
fn resolve_log_path(path: &Path) -> Result<PathBuf> {
    #[allow(clippy::literal_string_with_formatting_args)]
    let file_path = if path.to_string_lossy().contains("{timestamp}") {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        PathBuf::from(
            path.to_string_lossy()
                .replace("{timestamp}", &timestamp.to_string()),
        )
    } else {
        path.to_path_buf()
    };

    if let Some(parent) = file_path.parent()
        && parent.to_string_lossy() != ""
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).context("Failed to create log directory")?;
    }

    Ok(file_path)
}

// Global logger instance and active log file registry
lazy_static::lazy_static! {
    static ref GLOBAL_LOGGER: Mutex<EventLogger> = Mutex::new(EventLogger::new());
    static ref CURRENT_LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);
}

/// Set the global logger to use the specified file, or disable logging if None
pub fn init_logger<P: AsRef<Path>>(path: Option<P>) -> Result<()> {
    if let Ok(mut global) = GLOBAL_LOGGER.lock() {
        match path {
            Some(path) => {
                *global =
                    EventLogger::with_file(path).context("Failed to create logger with file")?;
            }
            None => {
                *global = EventLogger::new(); // Disabled mode
            }
        }
    } else {
        anyhow::bail!("Failed to acquire lock on global logger");
    }
    Ok(())
}

/// Log an action to the global logger (if enabled)
pub fn log_action(action: Action, subject: Option<&str>, object: Option<&str>, graph: &GraphState) {
    if let Ok(logger) = GLOBAL_LOGGER.lock() {
        logger.log_action(action, subject, object, graph);
    }
}

/// Check if the global logger is enabled
pub fn is_logging_enabled() -> bool {
    if let Ok(logger) = GLOBAL_LOGGER.lock() {
        logger.is_enabled()
    } else {
        false
    }
}

/// Path of the currently active log file, if any
pub fn get_current_log_file() -> Option<PathBuf> {
    CURRENT_LOG_FILE
        .lock()
        .ok()
        .and_then(|current| current.clone())
}
