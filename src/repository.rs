// Whole-collection persistence for the library

use crate::record::Book;
use crate::{json, jsonl, tabular};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Loads and saves the full book collection
///
/// There is no partial update: every save rewrites the whole collection.
pub trait Repository {
    /// Load every stored book in insertion order; no stored data is an empty list
    fn load(&self) -> Result<Vec<Book>>;

    /// Replace the stored collection with `books`
    fn save(&mut self, books: &[Book]) -> Result<()>;
}

/// On-disk encoding of a library file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Pretty-printed array of objects
    Json,
    /// One object per line
    Jsonl,
    /// Header row plus one row per book
    Csv,
}

impl Format {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl FromStr for Format {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "jsonl" => Ok(Format::Jsonl),
            "csv" => Ok(Format::Csv),
            other => Err(eyre!("Unknown library format: {} (expected json, jsonl or csv)", other)),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Json => write!(f, "json"),
            Format::Jsonl => write!(f, "jsonl"),
            Format::Csv => write!(f, "csv"),
        }
    }
}

/// Library stored in a single flat file
#[derive(Debug, Clone)]
pub struct FileRepository {
    path: PathBuf,
    format: Format,
}

impl FileRepository {
    pub fn new<P: AsRef<Path>>(path: P, format: Format) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format,
        }
    }

    /// Repository whose format follows the file extension, JSON when unknown
    pub fn at<P: AsRef<Path>>(path: P) -> Self {
        let format = Format::from_path(path.as_ref()).unwrap_or(Format::Json);
        Self::new(path, format)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format
    }
}

impl Repository for FileRepository {
    fn load(&self) -> Result<Vec<Book>> {
        if !self.path.exists() {
            debug!(path = ?self.path, "Library file does not exist yet");
            return Ok(Vec::new());
        }

        let books: Vec<Book> = match self.format {
            Format::Json => json::read_json(&self.path)?,
            Format::Jsonl => jsonl::read_jsonl(&self.path)?,
            Format::Csv => tabular::read_csv(&self.path)?,
        };

        Ok(books)
    }

    fn save(&mut self, books: &[Book]) -> Result<()> {
        debug!(path = ?self.path, format = %self.format, count = books.len(), "Saving library");

        let result = match self.format {
            Format::Json => json::write_json(&self.path, books),
            Format::Jsonl => jsonl::write_jsonl(&self.path, books),
            Format::Csv => tabular::write_csv(&self.path, books),
        };

        result.with_context(|| format!("Failed to save library to {}", self.path.display()))
    }
}

/// Repository held entirely in memory
///
/// Either direction can be switched to fail, to exercise callers' error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    books: Vec<Book>,
    saves: usize,
    fail_load: bool,
    fail_save: bool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `books` already stored
    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books,
            ..Self::default()
        }
    }

    pub fn set_fail_load(&mut self, fail: bool) {
        self.fail_load = fail;
    }

    pub fn set_fail_save(&mut self, fail: bool) {
        self.fail_save = fail;
    }

    /// Books from the last successful save
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Number of successful saves
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl Repository for MemoryRepository {
    fn load(&self) -> Result<Vec<Book>> {
        if self.fail_load {
            return Err(eyre!("memory repository load disabled"));
        }
        Ok(self.books.clone())
    }

    fn save(&mut self, books: &[Book]) -> Result<()> {
        if self.fail_save {
            return Err(eyre!("memory repository save disabled"));
        }
        self.books = books.to_vec();
        self.saves += 1;
        Ok(())
    }
}

/// Replace the file at `path` with `content`, creating parent directories
pub(crate) fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create library directory")?;
    }

    let mut file = fs::File::create(path).context("Failed to open library file for writing")?;
    file.write_all(content).context("Failed to write library file")?;
    file.sync_all()?; // Ensure data is flushed to disk

    Ok(())
}
