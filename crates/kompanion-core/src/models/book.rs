use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fallback MIME type for unknown extensions.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A book in the shared library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Stable document identifier, unique across the library.
    pub document_id: String,
    /// Identifier returned by the book storage backend.
    pub file_path: String,
    /// e.g. "epub", "pdf"
    pub format: Option<String>,
    pub cover_path: Option<String>,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        document_id: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: None,
            created_at: now,
            updated_at: now,
            document_id: document_id.into(),
            file_path: file_path.into(),
            format: None,
            cover_path: None,
        }
    }

    /// All suffixes of the stored file name, e.g. `.tar.gz`. Empty if none.
    pub fn extension(&self) -> String {
        let name = Path::new(&self.file_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if name.ends_with('.') {
            return String::new();
        }
        // A leading dot marks a hidden file, not a suffix.
        let stem_start = name.len() - name.trim_start_matches('.').len();
        match name[stem_start..].find('.') {
            Some(idx) => name[stem_start + idx..].to_string(),
            None => String::new(),
        }
    }

    /// Download name: the document id followed by the stored extension.
    pub fn effective_filename(&self) -> String {
        format!("{}{}", self.document_id, self.extension())
    }

    /// Guess the MIME type from the extension.
    ///
    /// A trailing compression suffix is an encoding, so `a.tar.gz` is a tar
    /// archive and a bare `a.gz` has no known type.
    pub fn mime_type(&self) -> &'static str {
        let extension = self.extension().to_lowercase();
        let mut suffixes: Vec<&str> = extension.split('.').filter(|s| !s.is_empty()).collect();
        if suffixes.last().is_some_and(|s| ENCODING_SUFFIXES.contains(s)) {
            suffixes.pop();
        }
        let Some(&last) = suffixes.last() else {
            return DEFAULT_MIME_TYPE;
        };
        let last = if TAR_ALIASES.contains(&last) { "tar" } else { last };
        ebook_mime_type(last)
            .or_else(|| mime_guess::from_ext(last).first_raw())
            .unwrap_or(DEFAULT_MIME_TYPE)
    }
}

/// Compression suffixes that describe an encoding rather than a type.
const ENCODING_SUFFIXES: &[&str] = &["gz", "z", "bz2", "xz", "br"];

/// Single suffixes that stand for a compressed tar archive.
const TAR_ALIASES: &[&str] = &["tgz", "taz", "tz", "tbz2", "txz"];

// Reader formats the general registry misses or names differently.
fn ebook_mime_type(extension: &str) -> Option<&'static str> {
    let mime = match extension {
        "epub" => "application/epub+zip",
        "mobi" => "application/x-mobipocket-ebook",
        "azw" | "azw3" => "application/vnd.amazon.ebook",
        "fb2" => "application/x-fictionbook+xml",
        "djvu" | "djv" => "image/vnd.djvu",
        "cbz" => "application/vnd.comicbook+zip",
        "cbr" => "application/vnd.comicbook-rar",
        _ => return None,
    };
    Some(mime)
}
