//! Request/response exchanges written to JSONL for post-run inspection
//!
//! ```text
//! .restcheck/dumps/
//! ├── DELETE__users__id_.jsonl
//! ├── POST__users.jsonl
//! └── index.json
//! ```

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::exchange::Exchange;

/// Headers that must never reach disk in clear text.
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "x-api-key",
    "cookie",
    "set-cookie",
    "proxy-authorization",
];

const MASK: &str = "***";

/// Longest operation label kept in a filename.
const MAX_FILENAME_LEN: usize = 200;

/// Written as `index.json` next to the JSONL files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpIndex {
    pub total: u64,
    pub operations: Vec<DumpOperationEntry>,
    pub dump_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpOperationEntry {
    /// Operation label, e.g. "POST /users/{id}/todos"
    pub operation: String,
    /// Filename within the dump directory
    pub file: String,
    pub count: u64,
}

/// Write every exchange, grouped by operation, with sensitive headers masked.
///
/// # Errors
///
/// Returns error if the directory or any file cannot be written.
pub fn write_dump(exchanges: &[Exchange], dump_dir: &Path) -> Result<DumpIndex, DumpError> {
    std::fs::create_dir_all(dump_dir)
        .map_err(|e| DumpError::Io(format!("create {}: {e}", dump_dir.display())))?;

    let mut groups: BTreeMap<&str, Vec<&Exchange>> = BTreeMap::new();
    for exchange in exchanges {
        groups
            .entry(exchange.operation.as_str())
            .or_default()
            .push(exchange);
    }

    let mut entries = Vec::new();
    let mut total: u64 = 0;

    for (operation, items) in groups {
        let filename = sanitize_filename(operation);
        let filepath = dump_dir.join(&filename);
        let file = std::fs::File::create(&filepath)
            .map_err(|e| DumpError::Io(format!("create {}: {e}", filepath.display())))?;
        let mut writer = std::io::BufWriter::new(file);

        for exchange in &items {
            let line = serde_json::to_string(&masked(exchange))
                .map_err(|e| DumpError::Serialize(e.to_string()))?;
            writeln!(writer, "{line}")
                .map_err(|e| DumpError::Io(format!("write {}: {e}", filepath.display())))?;
        }
        writer
            .flush()
            .map_err(|e| DumpError::Io(format!("flush {}: {e}", filepath.display())))?;

        let count = items.len() as u64;
        total += count;
        entries.push(DumpOperationEntry {
            operation: operation.to_string(),
            file: filename,
            count,
        });
    }

    let index = DumpIndex {
        total,
        operations: entries,
        dump_dir: dump_dir.to_path_buf(),
    };

    let index_path = dump_dir.join("index.json");
    let index_json =
        serde_json::to_string_pretty(&index).map_err(|e| DumpError::Serialize(e.to_string()))?;
    std::fs::write(&index_path, index_json)
        .map_err(|e| DumpError::Io(format!("write {}: {e}", index_path.display())))?;

    Ok(index)
}

/// "POST /users/{id}/posts" → "POST__users__id__posts.jsonl"
fn sanitize_filename(operation: &str) -> String {
    let sanitized: String = operation
        .chars()
        .take(MAX_FILENAME_LEN)
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' => c,
            _ => '_',
        })
        .collect();
    format!("{sanitized}.jsonl")
}

fn mask_headers(headers: &mut BTreeMap<String, String>) {
    for (name, value) in headers.iter_mut() {
        if SENSITIVE_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h)) {
            *value = MASK.to_string();
        }
    }
}

fn masked(exchange: &Exchange) -> Exchange {
    let mut copy = exchange.clone();
    mask_headers(&mut copy.request.headers);
    mask_headers(&mut copy.response.headers);
    copy
}

#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
}
