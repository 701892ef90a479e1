// Pretty-printed JSON array file operations

use crate::repository::write_file;
use eyre::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Write all records as a JSON array with 4-space indentation and a trailing newline
pub fn write_json<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records
        .serialize(&mut serializer)
        .context("Failed to serialize records")?;
    buf.push(b'\n');

    write_file(path, &buf)
}

/// Read a JSON array of records
///
/// A missing or whitespace-only file is an empty collection. A file that is
/// not a JSON array is an error; array elements that do not parse as a
/// record are skipped with a warning, like malformed JSONL lines.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).context("Failed to read JSON file")?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let values: Vec<serde_json::Value> = serde_json::from_str(&content).context("Failed to parse JSON file")?;
    let mut records = Vec::with_capacity(values.len());

    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(
                    file = ?path,
                    index,
                    error = ?e,
                    "Failed to parse JSON record, skipping"
                );
            }
        }
    }

    info!(file = ?path, count = records.len(), "Loaded records from JSON");

    Ok(records)
}
