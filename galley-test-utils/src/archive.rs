use std::io::{Cursor, Write};

use zip::result::ZipResult;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

enum Entry {
    File(String, Vec<u8>),
    Directory(String),
}

/// Builds zip archives in memory for tests.
#[derive(Default)]
pub struct ArchiveBuilder {
    entries: Vec<Entry>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.entries.push(Entry::File(name.into(), bytes.into()));
        self
    }

    pub fn json(self, name: impl Into<String>, value: &serde_json::Value) -> Self {
        let bytes = serde_json::to_vec_pretty(value).unwrap_or_default();
        self.file(name, bytes)
    }

    pub fn directory(mut self, name: impl Into<String>) -> Self {
        self.entries.push(Entry::Directory(name.into()));
        self
    }

    pub fn try_build(self) -> ZipResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut cursor);
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
            for entry in self.entries {
                match entry {
                    Entry::File(name, bytes) => {
                        zip.start_file(name, options)?;
                        zip.write_all(&bytes)?;
                    }
                    Entry::Directory(name) => {
                        zip.add_directory(name, options)?;
                    }
                }
            }
            zip.finish()?;
        }
        Ok(cursor.into_inner())
    }

    pub fn build(self) -> Vec<u8> {
        self.try_build().expect("in-memory zip archive")
    }
}
