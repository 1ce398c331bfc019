use crate::library::error::LibraryError;
use crate::library::metadata::{BookMetadata, FilenameMetadataParser, MetadataParser};

#[test]
fn test_author_and_title_from_filename() {
    let metadata = FilenameMetadataParser
        .parse(b"data", "Ursula K. Le Guin - The Dispossessed.epub")
        .unwrap();
    assert_eq!(
        metadata,
        BookMetadata {
            title: Some("The Dispossessed".to_string()),
            author: Some("Ursula K. Le Guin".to_string()),
            document_id: None,
        }
    );
}

#[test]
fn test_plain_filename_is_title() {
    let metadata = FilenameMetadataParser.parse(b"data", "Dune.pdf").unwrap();
    assert_eq!(metadata.title.as_deref(), Some("Dune"));
    assert_eq!(metadata.author, None);

    // A dangling separator is not an author
    let metadata = FilenameMetadataParser.parse(b"data", " - Dune.pdf").unwrap();
    assert_eq!(metadata.title.as_deref(), Some("- Dune"));
    assert_eq!(metadata.author, None);
}

#[test]
fn test_no_stem_yields_no_title() {
    let metadata = FilenameMetadataParser.parse(b"data", "").unwrap();
    assert_eq!(metadata, BookMetadata::default());
}

#[test]
fn test_empty_file_is_rejected() {
    let err = FilenameMetadataParser.parse(b"", "Dune.epub").unwrap_err();
    assert!(matches!(err, LibraryError::Metadata { filename, .. } if filename == "Dune.epub"));
}
