use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use crate::database::entities::{
    assets, content_type_fields, content_types, data_templates, flow_states, flows, frames,
    layouts, themes,
};
use crate::errors::ImportWarning;
use crate::storage::ObjectStorage;

/// State of one entity slot during an import.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Empty,
    /// Loaded from an id supplied by the caller.
    Reused(T),
    /// Inserted by this import.
    Created(T),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Empty
    }
}

impl<T> Slot<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            Slot::Empty => None,
            Slot::Reused(value) | Slot::Created(value) => Some(value),
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Slot::Created(_))
    }

    pub fn into_created(self) -> Option<T> {
        match self {
            Slot::Created(value) => Some(value),
            _ => None,
        }
    }
}

/// Entities threaded through the import steps, plus the side effects that
/// live outside the database transaction.
#[derive(Debug, Default)]
pub struct ImportContext {
    pub organisation_id: i32,
    pub creator_id: i32,
    pub theme: Slot<themes::Model>,
    pub flow: Slot<flows::Model>,
    pub frame: Slot<frames::Model>,
    pub layout: Slot<layouts::Model>,
    pub content_type: Slot<content_types::Model>,
    pub data_template: Slot<data_templates::Model>,
    pub flow_states: Vec<flow_states::Model>,
    pub content_type_fields: Vec<content_type_fields::Model>,
    pub assets: Vec<assets::Model>,
    pub warnings: Vec<ImportWarning>,
    stored_keys: Vec<String>,
    written_files: Vec<PathBuf>,
}

impl ImportContext {
    pub fn new(organisation_id: i32, creator_id: i32) -> Self {
        Self {
            organisation_id,
            creator_id,
            ..Default::default()
        }
    }

    pub fn warn(&mut self, warning: ImportWarning) {
        warn!(organisation_id = self.organisation_id, "{}", warning);
        self.warnings.push(warning);
    }

    /// Record a storage key before its upload starts.
    pub fn track_blob(&mut self, key: impl Into<String>) {
        self.stored_keys.push(key.into());
    }

    pub fn track_file(&mut self, path: impl Into<PathBuf>) {
        self.written_files.push(path.into());
    }

    pub fn stored_keys(&self) -> &[String] {
        &self.stored_keys
    }

    pub fn written_files(&self) -> &[PathBuf] {
        &self.written_files
    }

    /// Best-effort removal of blobs and frame files written by a failed import.
    pub async fn cleanup(&self, storage: &dyn ObjectStorage) {
        for key in &self.stored_keys {
            if let Err(e) = storage.delete(key).await {
                warn!(key = %key, error = %e, "Failed to remove blob after aborted import");
            }
        }
        for path in &self.written_files {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {
                    if let Some(parent) = path.parent() {
                        let _ = tokio::fs::remove_dir(parent).await;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove frame file after aborted import")
                }
            }
        }
    }

    pub fn into_result(self) -> ImportResult {
        ImportResult {
            theme: self.theme.into_created(),
            flow: self.flow.into_created(),
            flow_states: self.flow_states,
            frame: self.frame.into_created(),
            layout: self.layout.into_created(),
            content_type: self.content_type.into_created(),
            content_type_fields: self.content_type_fields,
            data_template: self.data_template.into_created(),
            assets: self.assets,
            warnings: self.warnings,
        }
    }
}

/// Entities created by a successful import; reused entities are not listed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportResult {
    pub theme: Option<themes::Model>,
    pub flow: Option<flows::Model>,
    pub flow_states: Vec<flow_states::Model>,
    pub frame: Option<frames::Model>,
    pub layout: Option<layouts::Model>,
    pub content_type: Option<content_types::Model>,
    pub content_type_fields: Vec<content_type_fields::Model>,
    pub data_template: Option<data_templates::Model>,
    pub assets: Vec<assets::Model>,
    pub warnings: Vec<ImportWarning>,
}

impl ImportResult {
    /// Number of top-level entities created.
    pub fn created_count(&self) -> usize {
        [
            self.theme.is_some(),
            self.flow.is_some(),
            self.frame.is_some(),
            self.layout.is_some(),
            self.content_type.is_some(),
            self.data_template.is_some(),
        ]
        .into_iter()
        .filter(|created| *created)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryObjectStorage;

    #[test]
    fn slots_expose_values_but_only_report_created() {
        let reused: Slot<i32> = Slot::Reused(4);
        assert_eq!(reused.get(), Some(&4));
        assert!(!reused.is_created());
        assert_eq!(reused.into_created(), None);
        assert_eq!(Slot::Created(5).into_created(), Some(5));
        assert_eq!(Slot::<i32>::Empty.get(), None);
    }

    #[test]
    fn result_counts_created_entities() {
        let ctx = ImportContext::new(1, 1);
        let result = ctx.into_result();
        assert_eq!(result.created_count(), 0);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn cleanup_removes_tracked_blobs() {
        let storage = MemoryObjectStorage::default();
        storage.put("organisations/1/font/a/x.ttf", vec![1]).await.unwrap();
        storage.put("organisations/1/font/b/y.ttf", vec![2]).await.unwrap();

        let mut ctx = ImportContext::new(1, 1);
        ctx.track_blob("organisations/1/font/a/x.ttf");
        ctx.track_blob("organisations/1/font/never/written.ttf");
        ctx.cleanup(&storage).await;

        assert_eq!(storage.keys().await, vec!["organisations/1/font/b/y.ttf"]);
    }
}
