//! Typed view of `manifest.json`.
//!
//! Bytes are first checked against the section schema in [`schema`], so every
//! violation is reported with its field path in one pass; only then are they
//! deserialized into [`Manifest`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ImportExportError, ImportExportResult};

pub mod schema;
pub mod validate;

pub use validate::{validate, ImportOptions};

/// Manifest sections that map to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Theme,
    Layout,
    Flow,
    Frame,
    Variant,
    DataTemplate,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Theme,
        Section::Layout,
        Section::Flow,
        Section::Frame,
        Section::Variant,
        Section::DataTemplate,
    ];

    /// Sections that must be present or supplied by id.
    pub const REQUIRED: [Section; 4] = [
        Section::Theme,
        Section::Layout,
        Section::Flow,
        Section::Variant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Theme => "theme",
            Section::Layout => "layout",
            Section::Flow => "flow",
            Section::Frame => "frame",
            Section::Variant => "variant",
            Section::DataTemplate => "data_template",
        }
    }

    /// Sections whose files live under `<section>/` in the archive.
    pub fn is_folder_backed(&self) -> bool {
        matches!(self, Section::Theme | Section::Layout | Section::Frame)
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ManifestMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<VariantSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_template: Option<DataTemplateSection>,
}

impl Manifest {
    /// Parse and schema-check manifest bytes.
    pub fn from_slice(bytes: &[u8]) -> ImportExportResult<Self> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| {
            ImportExportError::ManifestMalformed {
                messages: vec![format!("manifest.json: {}", e)],
            }
        })?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> ImportExportResult<Self> {
        let messages = schema::check(&value);
        if !messages.is_empty() {
            return Err(ImportExportError::ManifestMalformed { messages });
        }
        serde_json::from_value(value).map_err(|e| ImportExportError::ManifestMalformed {
            messages: vec![format!("manifest: {}", e)],
        })
    }

    pub fn has(&self, section: Section) -> bool {
        match section {
            Section::Theme => self.theme.is_some(),
            Section::Layout => self.layout.is_some(),
            Section::Flow => self.flow.is_some(),
            Section::Frame => self.frame.is_some(),
            Section::Variant => self.variant.is_some(),
            Section::DataTemplate => self.data_template.is_some(),
        }
    }

    pub fn sections(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|section| self.has(*section))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeSection {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fonts: Vec<FontDescriptor>,
    #[serde(default, skip_serializing_if = "ThemeColors::is_empty")]
    pub colors: ThemeColors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typescale: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeColors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_color: Option<String>,
}

impl ThemeColors {
    pub fn is_empty(&self) -> bool {
        self.body_color.is_none()
            && self.primary_color.is_none()
            && self.secondary_color.is_none()
            && self.heading_color.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSection {
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Engine reference such as `pandoc/latex`; only the part before `/` is matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowSection {
    pub name: String,
    #[serde(default)]
    pub controlled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSection {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub frame_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantSection {
    pub name: String,
    pub prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTemplateSection {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_template: Option<String>,
}
