//! # Kompanion Library
//!
//! The shared book collection. [`LibraryService`] ties together three seams:
//! a [`BookRepository`] for records, a [`BookStorage`](crate::storage::BookStorage)
//! backend for file bytes and a [`MetadataParser`] for titles and authors.
pub mod error;
pub mod metadata;
pub mod repository;
pub mod service;

pub use error::{LibraryError, LibraryResult};
pub use metadata::{BookMetadata, FilenameMetadataParser, MetadataParser};
pub use repository::{BookRepository, InMemoryBookRepository};
pub use service::{DEFAULT_PAGE_SIZE, LibraryService, UNKNOWN_TITLE};

#[cfg(test)]
mod tests;
