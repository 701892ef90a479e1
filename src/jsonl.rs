// JSONL file operations

use crate::repository::write_file;
use eyre::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// Write all records to a JSONL file, one compact object per line
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut content = String::new();
    for record in records {
        content.push_str(&serde_json::to_string(record).context("Failed to serialize record")?);
        content.push('\n');
    }

    write_file(path, content.as_bytes())
}

/// Read all records from a JSONL file in file order
///
/// Blank lines are ignored. Lines that fail to read or parse are skipped
/// with a warning so one bad line does not hide the rest of the library.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        // File doesn't exist yet, nothing recorded
        return Ok(Vec::new());
    }

    let file = File::open(path).context("Failed to open JSONL file")?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to read line, skipping"
                );
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse JSON, skipping"
                );
            }
        }
    }

    info!(file = ?path, count = records.len(), "Loaded records from JSONL");

    Ok(records)
}
