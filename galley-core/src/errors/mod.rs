//! Error types for galley-core
//!
//! # Error Categories
//!
//! - **ImportExportError**: fatal archive, manifest, and entity-creation failures.
//!   Any of these aborts an import and rolls back its transaction.
//! - **ImportWarning**: non-fatal degradation (a font that could not be stored,
//!   an unknown rendering engine). Logged and surfaced on the import result.
//! - **MarkdownError**: document-tree conversion failures.
//! - **StorageError**: object storage failures.
//!
//! # Examples
//!
//! ```rust
//! use galley::errors::{ImportExportError, MissingItem};
//!
//! let err = ImportExportError::MissingRequiredSections {
//!     missing_items: vec![MissingItem::section("theme")],
//! };
//! assert!(err.is_client_error());
//! assert_eq!(err.error_code(), "MISSING_REQUIRED_SECTIONS");
//! ```

pub mod import_export;
pub mod markdown;
pub mod storage;

pub use import_export::{ImportExportError, ImportWarning, MissingItem};
pub use markdown::MarkdownError;
pub use storage::StorageError;

/// Result type alias for import/export operations
pub type ImportExportResult<T> = Result<T, ImportExportError>;

/// Result type alias for document-tree conversion
pub type MarkdownResult<T> = Result<T, MarkdownError>;

/// Result type alias for object storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_export_result_alias() {
        let result: ImportExportResult<()> =
            Err(ImportExportError::CorruptArchive("truncated".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_markdown_result_alias() {
        let result: MarkdownResult<String> =
            Err(MarkdownError::InvalidNodeType("fooType".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_storage_result_alias() {
        let result: StorageResult<Vec<u8>> = Err(StorageError::NotFound("a/b".to_string()));
        assert!(result.is_err());
    }
}
