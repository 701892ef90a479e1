// Bookshelf - personal library store with flat-file persistence and tallies

pub mod config;
pub mod error;
pub mod filter;
pub mod json;
pub mod jsonl;
pub mod record;
pub mod repository;
pub mod stats;
pub mod store;
pub mod tabular;

// Re-export main types for convenience
pub use config::Config;
pub use error::LibraryError;
pub use filter::{Field, SearchField};
pub use record::{Book, Year};
pub use repository::{FileRepository, Format, MemoryRepository, Repository};
pub use stats::{LibraryStats, Tally};
pub use store::LibraryStore;
