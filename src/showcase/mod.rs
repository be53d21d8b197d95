pub mod encoder;
use encoder::process_log_for_url;

use crate::core::logger;
use anyhow::{Context, Result};
use std::path::Path;

/// Showcase a recorded session log in the browser viewer
///
/// This function processes a session log file and opens a browser window to
/// visualize the sequence of graph states it records. The visualization is
/// hosted on a web server and replays the session action by action.
///
/// # Arguments
/// * `log_path` - Path to the log file.
///
/// # Returns
/// A Result that is Ok if the showcase succeeded, or an error if it failed.
///
/// # Errors
/// Returns an error if:
/// - Failed to read the log file
/// - Failed to process the log file
/// - Failed to open the browser
///
/// # Example
///
/// ```no_run
/// use ragsim::showcase;
/// use std::path::Path;
///
/// // After a session has been recorded
/// let log_path = Path::new("session.log");
/// showcase(log_path).expect("Failed to showcase session visualization");
/// ```
pub fn showcase<P: AsRef<Path>>(log_path: P) -> Result<()> {
    // Process the log file to get an encoded string suitable for URLs
    let encoded_log =
        process_log_for_url(&log_path).context("Failed to process log file for URL")?;

    // Construct the URL with the encoded log as a parameter
    let showcase_url = format!("https://ragsim.vercel.app/?session={encoded_log}");

    // Open the URL in the default web browser.
    webbrowser::open(&showcase_url).context("Failed to open browser")?;

    Ok(())
}

/// Showcase the current active log file
///
/// This is a convenience function that showcases the log file that was
/// specified in the RagSim::with_log() initialization. It's useful when you
/// don't want to keep track of the log file path manually. Log entries are
/// written and flushed synchronously, so the file is always complete.
///
/// # Returns
/// A Result that is Ok if the showcase succeeded, or an error if it failed.
///
/// # Errors
/// Returns an error if:
/// - No active log file exists
/// - Failed to process the log file
/// - Failed to open the browser
///
/// # Example
///
/// ```no_run
/// use ragsim::{RagSim, showcase_this};
///
/// // Initialize with logging enabled
/// let session = RagSim::new()
///     .with_log("session.log")
///     .start()
///     .expect("Failed to start session");
///
/// // Later, after some actions have been recorded
/// showcase_this().expect("Failed to showcase current log");
/// ```
pub fn showcase_this() -> Result<()> {
    // Get the current log file path
    let log_path = logger::get_current_log_file()
        .ok_or_else(|| anyhow::anyhow!("No active log file found"))?;

    // Process the log file to get an encoded string suitable for URLs
    let encoded_log =
        process_log_for_url(&log_path).context("Failed to process log file for URL")?;

    // Construct the URL with the encoded log as a parameter
    let showcase_url = format!("https://ragsim.vercel.app/?session={encoded_log}");

    // Open the URL in the default web browser
    webbrowser::open(&showcase_url).context("Failed to open browser")?;

    Ok(())
}
