// Field selectors for searching and tallying books

use crate::error::LibraryError;
use crate::record::Book;
use std::str::FromStr;

/// A single book field, used for tallies and validation messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Author,
    Year,
    Genre,
    Status,
}

/// Where a search term is looked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    Title,
    Author,
    Genre,
    /// Title, author or genre
    Any,
}

impl SearchField {
    /// Case-insensitive substring match; an empty term matches every book
    pub fn matches(self, book: &Book, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.matches_lowercase(book, &needle)
    }

    /// Same as `matches`, with the term already lowercased
    pub(crate) fn matches_lowercase(self, book: &Book, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }

        let contains = |field: Field| book.value(field).to_lowercase().contains(needle);

        match self {
            SearchField::Title => contains(Field::Title),
            SearchField::Author => contains(Field::Author),
            SearchField::Genre => contains(Field::Genre),
            SearchField::Any => contains(Field::Title) || contains(Field::Author) || contains(Field::Genre),
        }
    }
}

impl FromStr for Field {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(Field::Title),
            "author" => Ok(Field::Author),
            "year" => Ok(Field::Year),
            "genre" => Ok(Field::Genre),
            "status" => Ok(Field::Status),
            _ => Err(LibraryError::InvalidField(s.to_string())),
        }
    }
}

impl FromStr for SearchField {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SearchField::Title),
            "author" => Ok(SearchField::Author),
            "genre" => Ok(SearchField::Genre),
            "any" => Ok(SearchField::Any),
            _ => Err(LibraryError::InvalidField(s.to_string())),
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Title => write!(f, "title"),
            Field::Author => write!(f, "author"),
            Field::Year => write!(f, "year"),
            Field::Genre => write!(f, "genre"),
            Field::Status => write!(f, "status"),
        }
    }
}

impl std::fmt::Display for SearchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchField::Title => write!(f, "title"),
            SearchField::Author => write!(f, "author"),
            SearchField::Genre => write!(f, "genre"),
            SearchField::Any => write!(f, "any"),
        }
    }
}
