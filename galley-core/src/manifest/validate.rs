use serde::{Deserialize, Serialize};

use super::{Manifest, Section};
use crate::archive::ArchiveEntry;
use crate::errors::{ImportExportError, ImportExportResult, MissingItem};

/// Existing entities the caller wants reused instead of created from the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    pub theme_id: Option<i32>,
    pub layout_id: Option<i32>,
    pub flow_id: Option<i32>,
    pub frame_id: Option<i32>,
    pub content_type_id: Option<i32>,
}

impl ImportOptions {
    pub fn external_id(&self, section: Section) -> Option<i32> {
        match section {
            Section::Theme => self.theme_id,
            Section::Layout => self.layout_id,
            Section::Flow => self.flow_id,
            Section::Frame => self.frame_id,
            Section::Variant => self.content_type_id,
            Section::DataTemplate => None,
        }
    }
}

/// Check required sections, then folders for the folder-backed sections present.
///
/// Every unsatisfied item of a kind is reported at once. Section problems are
/// reported before folder problems.
pub fn validate(
    manifest: &Manifest,
    entries: &[ArchiveEntry],
    options: &ImportOptions,
) -> ImportExportResult<()> {
    let missing_sections: Vec<MissingItem> = Section::REQUIRED
        .iter()
        .filter(|section| !manifest.has(**section) && options.external_id(**section).is_none())
        .map(|section| MissingItem::section(section.as_str()))
        .collect();
    if !missing_sections.is_empty() {
        return Err(ImportExportError::MissingRequiredSections {
            missing_items: missing_sections,
        });
    }

    let missing_folders: Vec<MissingItem> = manifest
        .sections()
        .into_iter()
        .filter(|section| section.is_folder_backed())
        .filter(|section| !entries.iter().any(|entry| entry.is_under(section.as_str())))
        .map(|section| MissingItem::folder(section.as_str()))
        .collect();
    if !missing_folders.is_empty() {
        return Err(ImportExportError::MissingRequiredFolders {
            missing_items: missing_folders,
        });
    }

    Ok(())
}
