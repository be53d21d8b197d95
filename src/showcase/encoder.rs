use anyhow::{Context, Result};
use base64::alphabet::URL_SAFE;
use base64::engine::{Engine as _, general_purpose};
use flate2::Compression;
use flate2::write::GzEncoder;
use rmp_serde;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Converts a session log file to a compact, compressed, encoded format
/// suitable for URL parameters
///
/// # Arguments
/// * `log_path` - Path to the original log file
///
/// # Returns
/// A Result that contains the encoded string or an error
pub fn process_log_for_url<P: AsRef<Path>>(log_path: P) -> Result<String> {
    // Parse the input file
    let file = File::open(log_path).context("Failed to open log file")?;
    let reader = BufReader::new(file);

    // Create compact data structure
    let mut compact_actions = Vec::new();
    let mut compact_graphs = Vec::new();

    // Process each line
    for line in reader.lines() {
        let line = line.context("Failed to read line from log file")?;
        if let Ok(entry) = serde_json::from_str::<LogEntry>(&line) {
            // Process each log entry
            let (action, graph) = parse_log_entry(entry).context("Failed to parse log entry")?;
            compact_actions.push(action);
            compact_graphs.push(graph);
        }
    }

    // Create the compact log data
    let compact_data = SessionData {
        actions: compact_actions,
        graphs: compact_graphs,
    };

    // 1. Convert to MessagePack
    let msgpack =
        rmp_serde::to_vec(&compact_data).context("Failed to convert data to MessagePack")?;

    // 2. Apply Gzip compression
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(&msgpack)
        .context("Failed to compress data")?;
    let compressed = encoder.finish().context("Failed to finish compression")?;

    // 3. Apply Base64URL encoding
    let base64_engine = general_purpose::GeneralPurpose::new(&URL_SAFE, general_purpose::PAD);
    let encoded = base64_engine.encode(compressed);

    Ok(encoded)
}

/// Original log entry structure from the file
#[derive(Debug, Deserialize)]
struct LogEntry {
    action: ActionData,
    graph: GraphData,
}

#[derive(Debug, Deserialize)]
struct ActionData {
    action: String,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    object: Option<String>,
    timestamp: f64,
}

#[derive(Debug, Deserialize)]
struct GraphData {
    processes: Vec<String>,
    resources: Vec<String>,
    links: Vec<LinkData>,
}

#[derive(Debug, Deserialize)]
struct LinkData {
    source: String,
    target: String,
    #[serde(rename = "type")]
    link_type: String,
}

// Action format: (action_code, subject, object, timestamp)
// subject/object are Option<String> stored as String, with "" indicating None
type CompactAction = (u8, String, String, f64);
// Graph format: (processes, resources, links)
type CompactGraph = (Vec<String>, Vec<String>, Vec<(String, String, u8)>);

type Actions = Vec<CompactAction>;
type Graphs = Vec<CompactGraph>;

/// Compact output structure
#[derive(Serialize, Deserialize)]
pub struct SessionData {
    pub actions: Actions,
    pub graphs: Graphs,
}

/// Parse a log entry into the compact format
fn parse_log_entry(entry: LogEntry) -> Result<(CompactAction, CompactGraph)> {
    // Convert action to compact format
    let action_code = match entry.action.action.as_str() {
        "AddProcess" => 0u8,
        "RemoveProcess" => 1u8,
        "AddResource" => 2u8,
        "RemoveResource" => 3u8,
        "AddRequest" => 4u8,
        "RemoveRequest" => 5u8,
        "AddAllocation" => 6u8,
        "RemoveAllocation" => 7u8,
        "Check" => 8u8,
        other => anyhow::bail!("Invalid action type: '{}'", other),
    };

    let compact_action = (
        action_code,
        entry.action.subject.unwrap_or_default(),
        entry.action.object.unwrap_or_default(),
        entry.action.timestamp,
    );

    // Convert graph to compact format
    let mut compact_links = Vec::new();
    for link in entry.graph.links {
        let link_type_code = match link.link_type.as_str() {
            "Request" | "request" => 0u8,
            "Allocation" | "allocation" => 1u8,
            _ => anyhow::bail!("Invalid link type: {}", link.link_type),
        };

        compact_links.push((link.source, link.target, link_type_code));
    }

    let compact_graph = (entry.graph.processes, entry.graph.resources, compact_links);

    Ok((compact_action, compact_graph))
}
