// CSV file operations, one book per row

use crate::record::{Book, Year, format_added_at, parse_added_at};
use crate::repository::write_file;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

const HEADER: [&str; 6] = ["title", "author", "year", "genre", "status", "added_at"];

/// Flat row shape; CSV carries no types, so the year comes back as text
#[derive(Debug, Serialize, Deserialize)]
struct Row {
    title: String,
    author: String,
    year: String,
    genre: String,
    status: String,
    added_at: String,
}

impl From<&Book> for Row {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year.to_string(),
            genre: book.genre.clone(),
            status: book.status.clone(),
            added_at: format_added_at(&book.added_at),
        }
    }
}

impl Row {
    fn into_book(self) -> Result<Book> {
        let added_at =
            parse_added_at(&self.added_at).ok_or_else(|| eyre!("invalid added_at timestamp: {}", self.added_at))?;

        Ok(Book {
            title: self.title,
            author: self.author,
            year: Year::Text(self.year),
            genre: self.genre,
            status: self.status,
            added_at,
        })
    }
}

/// Write all books as CSV with a header row
///
/// The header is written even for an empty library.
pub fn write_csv(path: &Path, books: &[Book]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());

    writer.write_record(HEADER).context("Failed to write CSV header")?;
    for book in books {
        writer.serialize(Row::from(book)).context("Failed to serialize book")?;
    }

    let buf = writer
        .into_inner()
        .map_err(|e| eyre!("Failed to flush CSV writer: {}", e.error()))?;

    write_file(path, &buf)
}

/// Read all books from a CSV file in row order
///
/// Rows that do not parse are skipped with a warning.
pub fn read_csv(path: &Path) -> Result<Vec<Book>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path).context("Failed to open CSV file")?;
    let mut books = Vec::new();

    for (row_num, result) in reader.deserialize::<Row>().enumerate() {
        let parsed = result.map_err(eyre::Report::from).and_then(Row::into_book);
        match parsed {
            Ok(book) => books.push(book),
            Err(e) => {
                warn!(
                    file = ?path,
                    row = row_num + 2, // header row plus 1-based numbering
                    error = %e,
                    "Failed to parse CSV row, skipping"
                );
            }
        }
    }

    info!(file = ?path, count = books.len(), "Loaded records from CSV");

    Ok(books)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use tempfile::TempDir;

    fn book(title: &str, year: &str) -> Book {
        Book {
            title: title.to_string(),
            author: "Octavia E. Butler".to_string(),
            year: Year::from(year),
            genre: "Sci-Fi".to_string(),
            status: "Finished".to_string(),
            added_at: Utc.with_ymd_and_hms(2024, 2, 2, 20, 15, 0).unwrap(),
        }
    }

    #[test]
    fn test_write_csv_layout() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("library.csv");

        write_csv(&path, &[book("Kindred", "1979"), book("Dawn, Part One", "1987")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let expected = "title,author,year,genre,status,added_at\n\
                        Kindred,Octavia E. Butler,1979,Sci-Fi,Finished,2024-02-02T20:15:00Z\n\
                        \"Dawn, Part One\",Octavia E. Butler,1987,Sci-Fi,Finished,2024-02-02T20:15:00Z\n";
        assert_eq!(content, expected);
    }

    #[test]
    fn test_write_csv_empty_has_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("library.csv");

        write_csv(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "title,author,year,genre,status,added_at\n");

        assert!(read_csv(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_csv_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("library.csv");

        let books = vec![book("Kindred", "1979"), book("Dawn, Part One", "1987")];
        write_csv(&path, &books).unwrap();

        assert_eq!(read_csv(&path).unwrap(), books);
    }

    #[test]
    fn test_read_csv_skips_bad_rows() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("library.csv");
        fs::write(
            &path,
            "title,author,year,genre,status,added_at\n\
             Good,A,1990,Other,Read,2024-01-01T00:00:00Z\n\
             Bad timestamp,B,1991,Other,Read,yesterday\n\
             Too,few,columns\n\
             Also good,C,unknown,Other,Unread,2024-01-02 10:00:00\n",
        )
        .unwrap();

        let books = read_csv(&path).unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].title, "Good");
        assert_eq!(books[1].title, "Also good");
        assert_eq!(books[1].year, Year::from("unknown"));
    }

    #[test]
    fn test_read_csv_nonexistent_file() {
        let temp = TempDir::new().unwrap();
        assert!(read_csv(&temp.path().join("missing.csv")).unwrap().is_empty());
    }
}
