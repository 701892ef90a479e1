// Aggregate counts over a snapshot of books
//
// Everything here is a pure function of a `&[Book]`; nothing touches the store.

use crate::filter::Field;
use crate::record::{Book, Year};
use std::collections::HashMap;
use tracing::debug;

/// Status value counted as read by `read_count`
pub const READ_STATUS: &str = "Read";

/// Number of authors `summary` callers usually ask for
pub const DEFAULT_TOP_AUTHORS: usize = 5;

/// Counts per distinct key, remembering the order keys were first seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    entries: Vec<(String, usize)>,
    positions: HashMap<String, usize>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `key`
    pub fn add(&mut self, key: impl Into<String>) {
        self.add_count(key, 1);
    }

    /// Count `count` occurrences of `key`
    pub fn add_count(&mut self, key: impl Into<String>, count: usize) {
        let key = key.into();
        match self.positions.get(&key) {
            Some(&pos) => self.entries[pos].1 += count,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, count));
            }
        }
    }

    /// Count for `key`, zero if never seen
    pub fn get(&self, key: &str) -> usize {
        self.positions.get(key).map_or(0, |&pos| self.entries[pos].1)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }
}

impl<K: Into<String>> FromIterator<K> for Tally {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for key in iter {
            tally.add(key);
        }
        tally
    }
}

/// Everything the stats view shows, computed in one pass over the snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryStats {
    pub total: usize,
    pub read: usize,
    pub unread: usize,
    pub genres: Tally,
    pub top_authors: Vec<(String, usize)>,
    pub decades: Tally,
}

pub fn total(books: &[Book]) -> usize {
    books.len()
}

/// Books whose status is exactly `Read`
pub fn read_count(books: &[Book]) -> usize {
    books.iter().filter(|b| b.status == READ_STATUS).count()
}

/// Everything that is not `Read`, including other status vocabularies
pub fn unread_count(books: &[Book]) -> usize {
    total(books) - read_count(books)
}

/// Tally the distinct values of `field`
pub fn category_counts(books: &[Book], field: Field) -> Tally {
    books.iter().map(|b| b.value(field).into_owned()).collect()
}

/// Decade bucket for a year, e.g. 1987 -> "1980s"
///
/// Uses floor division, so negative years land in the decade below them
/// (-5 -> "-10s"). `None` when the year is not an integer.
pub fn decade_label(year: &Year) -> Option<String> {
    let year = year.as_int()?;
    let decade = year.div_euclid(10).checked_mul(10)?;
    Some(format!("{}s", decade))
}

/// Tally books per decade
///
/// Books whose year is not an integer are left out of this tally only.
pub fn decade_counts(books: &[Book]) -> Tally {
    let mut tally = Tally::new();
    for book in books {
        match decade_label(&book.year) {
            Some(label) => tally.add(label),
            None => debug!(title = %book.title, year = %book.year, "Skipping book with non-numeric year"),
        }
    }
    tally
}

/// The `n` largest entries, count descending; ties keep first-seen order
pub fn top_n(tally: &Tally, n: usize) -> Vec<(String, usize)> {
    let mut entries = tally.entries.clone();
    // sort_by is stable, so equal counts stay in first-seen order
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n);
    entries
}

/// Compute every aggregate the stats view renders
pub fn summary(books: &[Book], top_authors: usize) -> LibraryStats {
    let read = read_count(books);
    LibraryStats {
        total: total(books),
        read,
        unread: total(books) - read,
        genres: category_counts(books, Field::Genre),
        top_authors: top_n(&category_counts(books, Field::Author), top_authors),
        decades: decade_counts(books),
    }
}
