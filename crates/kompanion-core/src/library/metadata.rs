use std::fmt::Debug;
use std::path::Path;

use crate::library::error::{LibraryError, LibraryResult};

/// Separator between author and title in `"Author - Title.epub"`.
const AUTHOR_TITLE_SEPARATOR: &str = " - ";

/// Metadata extracted from an uploaded book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    /// Stable document id embedded in the file, if any.
    pub document_id: Option<String>,
}

/// Extracts [`BookMetadata`] from raw file contents.
pub trait MetadataParser: Send + Sync + Debug {
    fn parse(&self, file_data: &[u8], filename: &str) -> LibraryResult<BookMetadata>;
}

/// Reads title and author from the upload's filename.
///
/// `"Ursula K. Le Guin - The Dispossessed.epub"` yields both fields; any
/// other name yields the file stem as title. Never sets a document id.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameMetadataParser;

impl MetadataParser for FilenameMetadataParser {
    fn parse(&self, file_data: &[u8], filename: &str) -> LibraryResult<BookMetadata> {
        if file_data.is_empty() {
            return Err(LibraryError::Metadata {
                filename: filename.to_string(),
                reason: "file is empty".to_string(),
            });
        }

        let stem = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::trim)
            .unwrap_or_default();
        if stem.is_empty() {
            return Ok(BookMetadata::default());
        }

        let metadata = match stem.split_once(AUTHOR_TITLE_SEPARATOR) {
            Some((author, title)) if !author.trim().is_empty() && !title.trim().is_empty() => {
                BookMetadata {
                    title: Some(title.trim().to_string()),
                    author: Some(author.trim().to_string()),
                    document_id: None,
                }
            }
            _ => BookMetadata {
                title: Some(stem.to_string()),
                ..Default::default()
            },
        };
        Ok(metadata)
    }
}
