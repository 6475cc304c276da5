use std::io::{Cursor, Write};

use serde::Serialize;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

use crate::errors::{ImportExportError, ImportExportResult};

/// In-memory zip writer used by the exporter.
pub struct ArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
    names: Vec<String>,
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: FileOptions::default().compression_method(CompressionMethod::Deflated),
            names: Vec::new(),
        }
    }

    pub fn add_file(&mut self, path: &str, bytes: &[u8]) -> ImportExportResult<()> {
        if self.names.iter().any(|name| name == path) {
            return Err(ImportExportError::ExportFailed(format!(
                "Duplicate archive entry: {}",
                path
            )));
        }
        self.zip
            .start_file(path, self.options)
            .map_err(|e| ImportExportError::ExportFailed(format!("Failed to add {}: {}", path, e)))?;
        self.zip
            .write_all(bytes)
            .map_err(|e| ImportExportError::ExportFailed(format!("Failed to write {}: {}", path, e)))?;
        self.names.push(path.to_string());
        Ok(())
    }

    pub fn add_json<T: Serialize>(&mut self, path: &str, value: &T) -> ImportExportResult<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.add_file(path, &bytes)
    }

    pub fn finish(mut self) -> ImportExportResult<Vec<u8>> {
        let cursor = self.zip.finish().map_err(|e| {
            ImportExportError::ExportFailed(format!("Failed to finalize template archive: {}", e))
        })?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::list_entries;

    #[test]
    fn written_archive_lists_entries_in_order() {
        let mut writer = ArchiveWriter::new();
        writer
            .add_json("manifest.json", &serde_json::json!({"flow": {"name": "Review"}}))
            .unwrap();
        writer.add_file("layout/a4.pdf", b"%PDF").unwrap();
        let bytes = writer.finish().unwrap();

        let names: Vec<String> = list_entries(&bytes)
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, vec!["manifest.json", "layout/a4.pdf"]);
    }

    #[test]
    fn duplicate_entries_are_rejected() {
        let mut writer = ArchiveWriter::new();
        writer.add_file("frame/a.tex", b"x").unwrap();
        let err = writer.add_file("frame/a.tex", b"y").unwrap_err();
        assert!(matches!(err, ImportExportError::ExportFailed(_)));
    }
}
