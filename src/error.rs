// Errors reported by library operations

use crate::filter::Field;

/// Failure of a single library operation
///
/// None of these leave the store in a partial state: a rejected add stores
/// nothing, and a failed save keeps the book in memory.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// A required field was empty on add
    #[error("{field} must not be empty")]
    Validation { field: Field },

    /// Search or tally requested on a field that does not exist
    #[error("unsupported field: {0}")]
    InvalidField(String),

    /// The repository could not write the collection
    #[error("failed to save library: {0:#}")]
    Persistence(eyre::Report),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LibraryError::Validation { field: Field::Author };
        assert_eq!(err.to_string(), "author must not be empty");

        let err = LibraryError::InvalidField("Bogus".to_string());
        assert_eq!(err.to_string(), "unsupported field: Bogus");

        let err = LibraryError::Persistence(eyre::eyre!("disk full").wrap_err("Failed to write library file"));
        assert_eq!(
            err.to_string(),
            "failed to save library: Failed to write library file: disk full"
        );
    }
}
