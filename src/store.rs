// In-memory library store backed by a whole-file repository

use crate::error::LibraryError;
use crate::filter::{Field, SearchField};
use crate::record::{Book, Year};
use crate::repository::Repository;
use crate::stats::{self, LibraryStats};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Ordered, append-only collection of books
///
/// Insertion order is the canonical order for listing and searching. Every
/// successful add rewrites the whole collection through the repository.
pub struct LibraryStore<R: Repository> {
    repository: R,
    books: Vec<Book>,
}

impl<R: Repository> LibraryStore<R> {
    /// Open a store over `repository`, loading what it holds
    ///
    /// A load failure is not fatal: it is logged and the store starts empty.
    pub fn open(repository: R) -> Self {
        let books = Self::load_or_empty(&repository);
        Self { repository, books }
    }

    fn load_or_empty(repository: &R) -> Vec<Book> {
        match repository.load() {
            Ok(books) => {
                info!(count = books.len(), "Loaded library");
                books
            }
            Err(e) => {
                warn!(error = ?e, "Failed to load library, starting empty");
                Vec::new()
            }
        }
    }

    /// Discard the in-memory collection and load it again from the repository
    pub fn reload(&mut self) {
        self.books = Self::load_or_empty(&self.repository);
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Add a book, stamped with the current time, and persist the collection
    ///
    /// Title, author and year are required. A failed save is reported as
    /// `LibraryError::Persistence` but the book stays in the collection
    /// (it is the last entry of `list()`).
    pub fn add(
        &mut self,
        title: &str,
        author: &str,
        year: impl Into<Year>,
        genre: &str,
        status: &str,
    ) -> Result<Book, LibraryError> {
        let year = year.into();

        Self::validate_required(Field::Title, title)?;
        Self::validate_required(Field::Author, author)?;
        if year.is_blank() {
            return Err(LibraryError::Validation { field: Field::Year });
        }

        let book = Book {
            title: title.to_string(),
            author: author.to_string(),
            year,
            genre: genre.to_string(),
            status: status.to_string(),
            added_at: Utc::now(),
        };

        self.books.push(book.clone());
        debug!(title = %book.title, count = self.books.len(), "Added book");

        self.repository
            .save(&self.books)
            .map_err(LibraryError::Persistence)?;

        Ok(book)
    }

    /// Search by field name (`title`, `author`, `genre` or `any`, any case)
    pub fn search(&self, term: &str, field: &str) -> Result<Vec<&Book>, LibraryError> {
        let field: SearchField = field.parse()?;
        Ok(self.search_by(term, field))
    }

    /// Case-insensitive substring search in insertion order; empty term matches all
    pub fn search_by(&self, term: &str, field: SearchField) -> Vec<&Book> {
        let needle = term.to_lowercase();
        self.books
            .iter()
            .filter(|b| field.matches_lowercase(b, &needle))
            .collect()
    }

    /// Every book, in insertion order
    pub fn list(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Aggregates over the current collection
    pub fn stats(&self, top_authors: usize) -> LibraryStats {
        stats::summary(&self.books, top_authors)
    }

    fn validate_required(field: Field, value: &str) -> Result<(), LibraryError> {
        if value.trim().is_empty() {
            return Err(LibraryError::Validation { field });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{FileRepository, MemoryRepository};
    use std::fs;
    use tempfile::TempDir;

    fn seeded_store() -> LibraryStore<MemoryRepository> {
        let mut store = LibraryStore::open(MemoryRepository::new());
        store
            .add("The Hobbit", "J.R.R. Tolkien", "1937", "Fantasy", "Read")
            .unwrap();
        store
            .add("Murder on the Orient Express", "Agatha Christie", "1934", "Mystery", "Unread")
            .unwrap();
        store
            .add("The Fellowship of the Ring", "J.R.R. Tolkien", 1954_i64, "Fantasy", "Unread")
            .unwrap();
        store
    }

    #[test]
    fn test_open_empty_repository() {
        let store = LibraryStore::open(MemoryRepository::new());
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_open_loads_existing_books() {
        let repo = MemoryRepository::with_books(seeded_store().list().to_vec());
        let store = LibraryStore::open(repo);

        assert_eq!(store.len(), 3);
        assert_eq!(store.list()[1].author, "Agatha Christie");
        assert_eq!(store.repository().saves(), 0);
    }

    #[test]
    fn test_open_load_failure_degrades_to_empty() {
        let mut repo = MemoryRepository::with_books(seeded_store().list().to_vec());
        repo.set_fail_load(true);

        let store = LibraryStore::open(repo);
        assert!(store.is_empty());
    }

    #[test]
    fn test_open_corrupt_file_degrades_to_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("library.json");
        fs::write(&path, "{ not json").unwrap();

        let store = LibraryStore::open(FileRepository::at(&path));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_keeps_readable_records_from_damaged_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("library.json");
        fs::write(
            &path,
            r#"[
    {"title": "Keep Me", "author": "A", "year": 1990, "genre": "Other", "status": "Read", "added_at": "2024-01-01T00:00:00Z"},
    {"title": "Null Year", "author": "B", "year": null, "genre": "Other", "status": "Read", "added_at": "2024-01-01T00:00:00Z"}
]"#,
        )
        .unwrap();

        let mut store = LibraryStore::open(FileRepository::at(&path));
        assert_eq!(store.len(), 1);

        store.add("New", "C", "2000", "Other", "Unread").unwrap();

        let titles: Vec<&str> = store.list().iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Keep Me", "New"]);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"Keep Me\""));
        assert!(content.contains("\"New\""));
    }

    #[test]
    fn test_add() {
        let mut store = LibraryStore::open(MemoryRepository::new());
        let before = Utc::now();

        let book = store
            .add("Dune", "Frank Herbert", "1965", "Sci-Fi", "Reading")
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Frank Herbert");
        assert_eq!(book.year, Year::from("1965"));
        assert_eq!(book.genre, "Sci-Fi");
        assert_eq!(book.status, "Reading");
        assert!(book.added_at >= before);
        assert_eq!(store.list()[0], book);

        // Persisted through the repository
        assert_eq!(store.repository().saves(), 1);
        assert_eq!(store.repository().books(), store.list());
    }

    #[test]
    fn test_add_keeps_values_verbatim() {
        let mut store = LibraryStore::open(MemoryRepository::new());
        let book = store.add("  Padded  ", "Author", " 1999", "", "whatever").unwrap();

        assert_eq!(book.title, "  Padded  ");
        assert_eq!(book.year, Year::from(" 1999"));
        assert_eq!(book.genre, "");
        assert_eq!(book.status, "whatever");
    }

    #[test]
    fn test_add_rejects_empty_required_fields() {
        let mut store = seeded_store();
        let before = store.list().to_vec();

        let err = store.add("", "Author", "2000", "Other", "Read").unwrap_err();
        assert!(matches!(err, LibraryError::Validation { field: Field::Title }));

        let err = store.add("Title", "   ", "2000", "Other", "Read").unwrap_err();
        assert!(matches!(err, LibraryError::Validation { field: Field::Author }));

        let err = store.add("Title", "Author", "", "Other", "Read").unwrap_err();
        assert!(matches!(err, LibraryError::Validation { field: Field::Year }));

        assert_eq!(store.list(), before.as_slice());
        assert_eq!(store.repository().saves(), 3);
    }

    #[test]
    fn test_add_save_failure_keeps_book() {
        let mut repo = MemoryRepository::new();
        repo.set_fail_save(true);
        let mut store = LibraryStore::open(repo);

        let err = store
            .add("Beloved", "Toni Morrison", "1987", "Fiction", "Unread")
            .unwrap_err();
        assert!(matches!(err, LibraryError::Persistence(_)));

        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].title, "Beloved");
        assert!(store.repository().books().is_empty());
    }

    #[test]
    fn test_search_empty_term_returns_all() {
        let store = seeded_store();
        let results = store.search("", "Title").unwrap();

        let titles: Vec<&str> = results.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "The Hobbit",
                "Murder on the Orient Express",
                "The Fellowship of the Ring"
            ]
        );
    }

    #[test]
    fn test_search_case_insensitive() {
        let store = seeded_store();
        let results = store.search("tolkien", "Author").unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "The Hobbit");
        assert_eq!(results[1].title, "The Fellowship of the Ring");
    }

    #[test]
    fn test_search_genre_and_any() {
        let store = seeded_store();

        let mysteries = store.search("MYST", "genre").unwrap();
        assert_eq!(mysteries.len(), 1);
        assert_eq!(mysteries[0].author, "Agatha Christie");

        let any = store.search_by("christie", SearchField::Any);
        assert_eq!(any.len(), 1);
        let the = store.search_by("the", SearchField::Any);
        assert_eq!(the.len(), 3);
    }

    #[test]
    fn test_search_no_match() {
        let store = seeded_store();
        assert!(store.search("austen", "author").unwrap().is_empty());
    }

    #[test]
    fn test_search_invalid_field() {
        let store = seeded_store();
        let err = store.search("x", "Bogus").unwrap_err();
        assert!(matches!(err, LibraryError::InvalidField(ref name) if name == "Bogus"));
    }

    #[test]
    fn test_reload_replaces_collection() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("library.jsonl");

        let mut store = LibraryStore::open(FileRepository::at(&path));
        store.add("Solaris", "Stanislaw Lem", "1961", "Sci-Fi", "Read").unwrap();

        // Another writer replaces the file
        fs::write(&path, "").unwrap();
        store.reload();
        assert!(store.is_empty());
    }

    #[test]
    fn test_stats_reflect_list() {
        let store = seeded_store();
        let stats = store.stats(1);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.read, 1);
        assert_eq!(stats.unread, 2);
        assert_eq!(stats.top_authors, vec![("J.R.R. Tolkien".to_string(), 2)]);
        assert_eq!(stats.decades.get("1930s"), 2);
        assert_eq!(stats.decades.get("1950s"), 1);
    }
}
