//! Import and export error types
//!
//! Fatal failures are [`ImportExportError`] values: the import that raised one
//! is rolled back as a whole. Non-fatal failures are [`ImportWarning`] values
//! which are logged and collected on the import result.

use serde::Serialize;
use thiserror::Error;

use super::{MarkdownError, StorageError};

/// One unsatisfied requirement found while validating a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingItem {
    pub item: String,
    pub message: String,
}

impl MissingItem {
    pub fn section(name: &str) -> Self {
        Self {
            item: name.to_string(),
            message: format!(
                "Section '{}' is missing from the manifest and no existing {} id was provided",
                name, name
            ),
        }
    }

    pub fn folder(name: &str) -> Self {
        Self {
            item: name.to_string(),
            message: format!(
                "Manifest declares '{}' but the archive has no '{}/' folder",
                name, name
            ),
        }
    }
}

fn join_items(items: &[MissingItem]) -> String {
    items
        .iter()
        .map(|item| item.item.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Import and export operation errors
#[derive(Error, Debug)]
pub enum ImportExportError {
    /// The byte stream is not a readable zip archive
    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    /// A named archive entry does not exist
    #[error("Archive entry '{0}' not found")]
    EntryNotFound(String),

    /// The archive has no manifest at the well-known location
    #[error("Archive does not contain '{0}'")]
    ManifestMissing(String),

    /// Manifest bytes are not JSON or violate the section schema
    #[error("Manifest is malformed: {}", .messages.join("; "))]
    ManifestMalformed { messages: Vec<String> },

    /// Required sections neither present in the manifest nor supplied by id
    #[error("Missing required sections: {}", join_items(.missing_items))]
    MissingRequiredSections { missing_items: Vec<MissingItem> },

    /// Folder-backed sections whose folder is absent from the archive
    #[error("Missing required folders: {}", join_items(.missing_items))]
    MissingRequiredFolders { missing_items: Vec<MissingItem> },

    /// A preparer could not build or persist its entity
    #[error("Failed to create {entity}: {reason}")]
    EntityCreationFailed { entity: &'static str, reason: String },

    /// An externally supplied id does not resolve inside the organisation
    #[error("{entity} {id} not found")]
    ReferenceNotFound { entity: &'static str, id: i32 },

    /// Collision resolution gave up before finding a free name
    #[error("No free name for {entity} '{name}' after {attempts} attempts")]
    NameResolutionExhausted {
        entity: &'static str,
        name: String,
        attempts: usize,
    },

    /// Fetching an archive by URL failed
    #[error("Failed to download archive: {0}")]
    DownloadFailed(String),

    /// Building an export archive failed
    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// Data template body could not be converted
    #[error("Template conversion failed: {0}")]
    Markdown(#[from] MarkdownError),

    /// Object storage failure on a fatal path
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl ImportExportError {
    pub fn entity_creation(entity: &'static str, reason: impl Into<String>) -> Self {
        ImportExportError::EntityCreationFailed {
            entity,
            reason: reason.into(),
        }
    }

    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ImportExportError::CorruptArchive(_)
                | ImportExportError::EntryNotFound(_)
                | ImportExportError::ManifestMissing(_)
                | ImportExportError::ManifestMalformed { .. }
                | ImportExportError::MissingRequiredSections { .. }
                | ImportExportError::MissingRequiredFolders { .. }
                | ImportExportError::EntityCreationFailed { .. }
                | ImportExportError::Markdown(_)
        )
    }

    /// Check if this is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, ImportExportError::ReferenceNotFound { .. })
    }

    /// Check if this is a server error (500-series)
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ImportExportError::NameResolutionExhausted { .. }
                | ImportExportError::DownloadFailed(_)
                | ImportExportError::ExportFailed(_)
                | ImportExportError::SerializationError(_)
                | ImportExportError::Storage(_)
                | ImportExportError::Io(_)
                | ImportExportError::Database(_)
        )
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ImportExportError::CorruptArchive(_) => "CORRUPT_ARCHIVE",
            ImportExportError::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            ImportExportError::ManifestMissing(_) => "MANIFEST_MISSING",
            ImportExportError::ManifestMalformed { .. } => "MANIFEST_MALFORMED",
            ImportExportError::MissingRequiredSections { .. } => "MISSING_REQUIRED_SECTIONS",
            ImportExportError::MissingRequiredFolders { .. } => "MISSING_REQUIRED_FOLDERS",
            ImportExportError::EntityCreationFailed { .. } => "ENTITY_CREATION_FAILED",
            ImportExportError::ReferenceNotFound { .. } => "REFERENCE_NOT_FOUND",
            ImportExportError::NameResolutionExhausted { .. } => "NAME_RESOLUTION_EXHAUSTED",
            ImportExportError::DownloadFailed(_) => "DOWNLOAD_FAILED",
            ImportExportError::ExportFailed(_) => "EXPORT_FAILED",
            ImportExportError::Markdown(_) => "TEMPLATE_CONVERSION_FAILED",
            ImportExportError::Storage(_) => "STORAGE_ERROR",
            ImportExportError::SerializationError(_) => "SERIALIZATION_ERROR",
            ImportExportError::Io(_) => "IO_ERROR",
            ImportExportError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Missing items carried by the validation variants
    pub fn missing_items(&self) -> &[MissingItem] {
        match self {
            ImportExportError::MissingRequiredSections { missing_items }
            | ImportExportError::MissingRequiredFolders { missing_items } => missing_items,
            _ => &[],
        }
    }
}

/// Non-fatal problems encountered while preparing entities
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ImportWarning {
    /// A font file could not be stored; it is left out of the theme
    #[error("Font '{file}' skipped: {reason}")]
    FontExtractionFailed { file: String, reason: String },

    /// The layout's engine did not match any known engine
    #[error("Engine '{engine}' not found; layout created without an engine")]
    EngineNotFound { engine: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_lists_every_item() {
        let err = ImportExportError::MissingRequiredSections {
            missing_items: vec![MissingItem::section("theme"), MissingItem::section("flow")],
        };
        assert_eq!(err.to_string(), "Missing required sections: theme, flow");
        assert!(err.is_client_error());
        assert_eq!(err.missing_items().len(), 2);
    }

    #[test]
    fn test_manifest_malformed_joins_messages() {
        let err = ImportExportError::ManifestMalformed {
            messages: vec![
                "theme.name: expected string".to_string(),
                "variant.prefix: is required".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Manifest is malformed: theme.name: expected string; variant.prefix: is required"
        );
        assert_eq!(err.error_code(), "MANIFEST_MALFORMED");
    }

    #[test]
    fn test_entity_creation_failed() {
        let err = ImportExportError::entity_creation("layout", "no PDF in layout/");
        assert_eq!(err.to_string(), "Failed to create layout: no PDF in layout/");
        assert!(err.is_client_error());
        assert_eq!(err.error_code(), "ENTITY_CREATION_FAILED");
    }

    #[test]
    fn test_reference_not_found() {
        let err = ImportExportError::ReferenceNotFound {
            entity: "theme",
            id: 9,
        };
        assert!(err.is_not_found());
        assert!(err.missing_items().is_empty());
    }

    #[test]
    fn test_serialization_error_is_server_error() {
        let err: ImportExportError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.is_server_error());
        assert!(!err.is_client_error());
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_warning_display() {
        let warning = ImportWarning::EngineNotFound {
            engine: "groff/ms".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "Engine 'groff/ms' not found; layout created without an engine"
        );
    }
}
