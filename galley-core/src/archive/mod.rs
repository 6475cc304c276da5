//! Reading template archives.
//!
//! A template archive is a zip with `manifest.json` and `template.json` at the
//! root and files namespaced by folder (`theme/`, `layout/`, `frame/`). Any
//! structural problem is fatal: nothing in a corrupt archive is interpreted.

use std::io::{Cursor, Read, Seek};
use std::path::{Component, Path};

use serde::Serialize;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::errors::{ImportExportError, ImportExportResult};
use crate::manifest::Manifest;

mod writer;

pub use writer::ArchiveWriter;

pub const MANIFEST_ENTRY: &str = "manifest.json";
pub const TEMPLATE_ENTRY: &str = "template.json";

/// Largest entry the reader will extract.
pub const MAX_ENTRY_SIZE: u64 = 256 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    pub name: String,
    pub size: u64,
}

impl ArchiveEntry {
    /// Whether the entry sits under `<folder>/`.
    pub fn is_under(&self, folder: &str) -> bool {
        self.name
            .strip_prefix(folder)
            .map(|rest| rest.starts_with('/') && rest.len() > 1)
            .unwrap_or(false)
    }

    /// File name without its folder.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(extension))
            .unwrap_or(false)
    }
}

/// Entries of the archive, directories and hidden files excluded.
pub fn list_entries(bytes: &[u8]) -> ImportExportResult<Vec<ArchiveEntry>> {
    let mut archive = open_zip(Cursor::new(bytes))?;
    collect_entries(&mut archive)
}

pub fn read_entry(bytes: &[u8], name: &str) -> ImportExportResult<Vec<u8>> {
    let mut archive = open_zip(Cursor::new(bytes))?;
    read_zip_file_bytes(&mut archive, name)
}

pub fn read_manifest(bytes: &[u8]) -> ImportExportResult<Manifest> {
    let mut archive = open_zip(Cursor::new(bytes))?;
    let manifest_bytes = match read_zip_file_bytes(&mut archive, MANIFEST_ENTRY) {
        Err(ImportExportError::EntryNotFound(_)) => {
            return Err(ImportExportError::ManifestMissing(MANIFEST_ENTRY.to_string()))
        }
        other => other?,
    };
    Manifest::from_slice(&manifest_bytes)
}

/// An opened archive, read once per import.
pub struct TemplateArchive {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    entries: Vec<ArchiveEntry>,
}

impl TemplateArchive {
    pub fn open(bytes: Vec<u8>) -> ImportExportResult<Self> {
        let mut archive = open_zip(Cursor::new(bytes))?;
        let entries = collect_entries(&mut archive)?;
        Ok(Self { archive, entries })
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn entries_under(&self, folder: &str) -> Vec<ArchiveEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.is_under(folder))
            .cloned()
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn read(&mut self, name: &str) -> ImportExportResult<Vec<u8>> {
        read_zip_file_bytes(&mut self.archive, name)
    }

    pub fn manifest(&mut self) -> ImportExportResult<Manifest> {
        if !self.contains(MANIFEST_ENTRY) {
            return Err(ImportExportError::ManifestMissing(MANIFEST_ENTRY.to_string()));
        }
        let bytes = self.read(MANIFEST_ENTRY)?;
        Manifest::from_slice(&bytes)
    }
}

fn open_zip<R: Read + Seek>(reader: R) -> ImportExportResult<ZipArchive<R>> {
    ZipArchive::new(reader)
        .map_err(|e| ImportExportError::CorruptArchive(format!("Failed to read archive: {}", e)))
}

fn collect_entries<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> ImportExportResult<Vec<ArchiveEntry>> {
    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|e| {
            ImportExportError::CorruptArchive(format!("Failed to read archive entry: {}", e))
        })?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        if !is_safe_path(&name) {
            return Err(ImportExportError::CorruptArchive(format!(
                "Invalid path component in archive entry: {}",
                name
            )));
        }
        if has_hidden_component(Path::new(&name)) {
            continue;
        }

        entries.push(ArchiveEntry {
            name,
            size: entry.size(),
        });
    }
    Ok(entries)
}

fn read_zip_file_bytes<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> ImportExportResult<Vec<u8>> {
    let mut file = match archive.by_name(path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => {
            return Err(ImportExportError::EntryNotFound(path.to_string()))
        }
        Err(e) => {
            return Err(ImportExportError::CorruptArchive(format!(
                "Failed to open {}: {}",
                path, e
            )))
        }
    };
    if file.size() > MAX_ENTRY_SIZE {
        return Err(ImportExportError::CorruptArchive(format!(
            "{} declares {} bytes, limit is {}",
            path,
            file.size(),
            MAX_ENTRY_SIZE
        )));
    }

    // Read at most one byte past the limit whatever the header claims.
    let mut buffer = Vec::new();
    file.by_ref()
        .take(MAX_ENTRY_SIZE + 1)
        .read_to_end(&mut buffer)
        .map_err(|e| ImportExportError::CorruptArchive(format!("Failed to read {}: {}", path, e)))?;
    if buffer.len() as u64 > MAX_ENTRY_SIZE {
        return Err(ImportExportError::CorruptArchive(format!(
            "{} exceeds {} bytes",
            path, MAX_ENTRY_SIZE
        )));
    }
    Ok(buffer)
}

fn is_safe_path(name: &str) -> bool {
    let candidate = Path::new(name);
    !candidate.is_absolute()
        && !candidate
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
}

fn has_hidden_component(path: &Path) -> bool {
    path.components().any(|component| match component {
        Component::Normal(value) => value.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use galley_test_utils::ArchiveBuilder;

    fn sample_archive() -> Vec<u8> {
        ArchiveBuilder::new()
            .file(MANIFEST_ENTRY, br#"{"flow": {"name": "Review"}}"#.to_vec())
            .file("theme/Roboto-Regular.ttf", vec![0u8; 16])
            .file("theme/.DS_Store", vec![1u8])
            .file("layout/letterhead.pdf", b"%PDF-1.7".to_vec())
            .directory("frame/")
            .build()
    }

    #[test]
    fn list_entries_skips_directories_and_hidden_files() {
        let entries = list_entries(&sample_archive()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                MANIFEST_ENTRY,
                "theme/Roboto-Regular.ttf",
                "layout/letterhead.pdf"
            ]
        );
        assert_eq!(entries[1].size, 16);
    }

    #[test]
    fn garbage_bytes_are_a_corrupt_archive() {
        let err = list_entries(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, ImportExportError::CorruptArchive(_)));
    }

    #[test]
    fn read_entry_reports_missing_names() {
        let bytes = sample_archive();
        assert_eq!(
            read_entry(&bytes, "layout/letterhead.pdf").unwrap(),
            b"%PDF-1.7"
        );
        let err = read_entry(&bytes, "layout/other.pdf").unwrap_err();
        assert!(matches!(err, ImportExportError::EntryNotFound(name) if name == "layout/other.pdf"));
    }

    #[test]
    fn read_manifest_requires_manifest_entry() {
        let bytes = ArchiveBuilder::new()
            .file("theme/Roboto-Regular.ttf", vec![0u8; 4])
            .build();
        let err = read_manifest(&bytes).unwrap_err();
        assert!(matches!(err, ImportExportError::ManifestMissing(_)));
    }

    #[test]
    fn read_manifest_rejects_non_json() {
        let bytes = ArchiveBuilder::new()
            .file(MANIFEST_ENTRY, b"name = 'toml'".to_vec())
            .build();
        let err = read_manifest(&bytes).unwrap_err();
        assert!(matches!(err, ImportExportError::ManifestMalformed { .. }));
    }

    #[test]
    fn parent_dir_entries_are_rejected() {
        let bytes = ArchiveBuilder::new()
            .file("../escape.txt", b"x".to_vec())
            .build();
        let err = TemplateArchive::open(bytes).err().unwrap();
        assert!(matches!(err, ImportExportError::CorruptArchive(_)));
    }

    /// Rewrite the central-directory record of `entry` so it declares a zip64
    /// uncompressed size of `size`.
    fn declare_zip64_size(bytes: &[u8], entry: &str, size: u64) -> Vec<u8> {
        const CENTRAL: [u8; 4] = [0x50, 0x4b, 0x01, 0x02];
        const END: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];
        let u16_at = |b: &[u8], at: usize| u16::from_le_bytes([b[at], b[at + 1]]) as usize;

        let mut out = bytes.to_vec();
        let mut at = (0..out.len() - 4)
            .find(|&i| out[i..i + 4] == CENTRAL)
            .unwrap();
        loop {
            let name_len = u16_at(&out, at + 28);
            let extra_len = u16_at(&out, at + 30);
            let comment_len = u16_at(&out, at + 32);
            if &out[at + 46..at + 46 + name_len] == entry.as_bytes() {
                out[at + 24..at + 28].copy_from_slice(&u32::MAX.to_le_bytes());
                out[at + 30..at + 32].copy_from_slice(&((extra_len + 12) as u16).to_le_bytes());
                let mut zip64 = vec![0x01, 0x00, 0x08, 0x00];
                zip64.extend_from_slice(&size.to_le_bytes());
                let insert_at = at + 46 + name_len + extra_len;
                let tail = out.split_off(insert_at);
                out.extend(zip64);
                out.extend(tail);
                break;
            }
            at += 46 + name_len + extra_len + comment_len;
        }

        let end = (0..out.len() - 4).rev().find(|&i| out[i..i + 4] == END).unwrap();
        let cd_size = u32::from_le_bytes([out[end + 12], out[end + 13], out[end + 14], out[end + 15]]);
        out[end + 12..end + 16].copy_from_slice(&(cd_size + 12).to_le_bytes());
        out
    }

    #[test]
    fn oversized_declared_entry_is_a_corrupt_archive() {
        let bytes = declare_zip64_size(&sample_archive(), MANIFEST_ENTRY, 0xFFFF_FFFF_FFFF_FFF0);

        let err = read_manifest(&bytes).unwrap_err();
        assert!(matches!(err, ImportExportError::CorruptArchive(_)));

        let mut archive = TemplateArchive::open(bytes).unwrap();
        let err = archive.manifest().unwrap_err();
        assert!(matches!(err, ImportExportError::CorruptArchive(_)));
        assert_eq!(
            archive.read("layout/letterhead.pdf").unwrap(),
            b"%PDF-1.7"
        );
    }

    #[test]
    fn template_archive_filters_by_folder() {
        let mut archive = TemplateArchive::open(sample_archive()).unwrap();
        let theme = archive.entries_under("theme");
        assert_eq!(theme.len(), 1);
        assert_eq!(theme[0].file_name(), "Roboto-Regular.ttf");
        assert!(theme[0].has_extension("TTF"));
        assert!(archive.entries_under("frame").is_empty());
        assert!(archive.manifest().unwrap().flow.is_some());
    }
}
