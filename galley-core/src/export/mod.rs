//! Template archive export, the inverse of import.
//!
//! Referenced entities are pulled in unless the request names them: a data
//! template brings its variant, a variant its theme, layout and flow, and a
//! layout its frame. The result re-imports on its own.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::archive::{ArchiveWriter, MANIFEST_ENTRY, TEMPLATE_ENTRY};
use crate::database::entities::{
    assets, content_type_fields, content_types, data_templates, flows, frames, layouts, themes,
};
use crate::errors::{ImportExportError, ImportExportResult};
use crate::manifest::{
    DataTemplateSection, FieldDescriptor, FlowSection, FontDescriptor, FrameSection,
    LayoutSection, Manifest, ManifestMetadata, ThemeColors, ThemeSection, VariantSection,
};
use crate::services::{AssetService, ReferenceTables};

/// Field type written for fields that have none.
pub const UNKNOWN_FIELD_TYPE: &str = "unknown";

/// Written under `theme/` for themes without stored fonts.
pub const THEME_PLACEHOLDER: &str = "theme/README.txt";
const THEME_PLACEHOLDER_TEXT: &str = "This theme has no font files.\n";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub theme_id: Option<i32>,
    pub layout_id: Option<i32>,
    pub flow_id: Option<i32>,
    pub frame_id: Option<i32>,
    pub content_type_id: Option<i32>,
    pub data_template_id: Option<i32>,
}

impl ExportRequest {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct TemplateArchiveFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct TemplateExporter {
    db: DatabaseConnection,
    assets: AssetService,
}

impl TemplateExporter {
    pub fn new(db: DatabaseConnection, assets: AssetService) -> Self {
        Self { db, assets }
    }

    pub async fn export(
        &self,
        organisation_id: i32,
        request: ExportRequest,
    ) -> ImportExportResult<TemplateArchiveFile> {
        if request.is_empty() {
            return Err(ImportExportError::ExportFailed(
                "nothing selected for export".to_string(),
            ));
        }

        let references = ReferenceTables::load(&self.db).await?;
        let mut request = request;
        let mut manifest = Manifest::default();
        let mut writer = ArchiveWriter::new();

        let data_template = match request.data_template_id {
            Some(id) => {
                let template = self.owned_data_template(organisation_id, id).await?;
                request.content_type_id.get_or_insert(template.content_type_id);
                Some(template)
            }
            None => None,
        };

        if let Some(id) = request.content_type_id {
            let content_type = content_types::Entity::find_by_id(id)
                .filter(content_types::Column::OrganisationId.eq(organisation_id))
                .one(&self.db)
                .await?
                .ok_or(ImportExportError::ReferenceNotFound {
                    entity: "variant",
                    id,
                })?;
            request.theme_id.get_or_insert(content_type.theme_id);
            request.layout_id.get_or_insert(content_type.layout_id);
            request.flow_id.get_or_insert(content_type.flow_id);

            let fields = content_type_fields::Entity::find()
                .filter(content_type_fields::Column::ContentTypeId.eq(content_type.id))
                .order_by_asc(content_type_fields::Column::Order)
                .all(&self.db)
                .await?;
            manifest.variant = Some(VariantSection {
                name: content_type.name.clone(),
                prefix: content_type.prefix.clone(),
                description: content_type.description.clone(),
                color: content_type.color.clone(),
                fields: fields
                    .into_iter()
                    .map(|field| FieldDescriptor {
                        field_type: field
                            .field_type_id
                            .and_then(|id| references.field_type_name(id))
                            .map(str::to_lowercase)
                            .unwrap_or_else(|| UNKNOWN_FIELD_TYPE.to_string()),
                        name: field.name,
                        required: field.required,
                        description: field.description,
                    })
                    .collect(),
            });
        }

        if let Some(id) = request.layout_id {
            let layout = layouts::Entity::find_by_id(id)
                .filter(layouts::Column::OrganisationId.eq(organisation_id))
                .one(&self.db)
                .await?
                .ok_or(ImportExportError::ReferenceNotFound {
                    entity: "layout",
                    id,
                })?;
            if let Some(frame_id) = layout.frame_id {
                request.frame_id.get_or_insert(frame_id);
            }
            if let Some(asset_id) = layout.asset_id {
                let asset = self.owned_asset(organisation_id, asset_id).await?;
                self.add_asset(&mut writer, "layout", &asset).await?;
            }
            manifest.layout = Some(LayoutSection {
                name: layout.name,
                slug: layout.slug,
                description: layout.description,
                engine: layout
                    .engine_id
                    .and_then(|id| references.engine_name(id))
                    .map(str::to_string),
                width: layout.width,
                height: layout.height,
                unit: layout.unit,
                margin: parse_object(&layout.margin),
            });
        }

        if let Some(id) = request.theme_id {
            let theme = themes::Entity::find_by_id(id)
                .filter(themes::Column::OrganisationId.eq(organisation_id))
                .one(&self.db)
                .await?
                .ok_or(ImportExportError::ReferenceNotFound {
                    entity: "theme",
                    id,
                })?;
            let mut fonts = Vec::new();
            for asset_id in theme.font_asset_id_list() {
                let asset = self.owned_asset(organisation_id, asset_id).await?;
                let path = self.add_asset(&mut writer, "theme", &asset).await?;
                fonts.push(FontDescriptor {
                    name: path,
                    weight: None,
                });
            }
            if fonts.is_empty() {
                // Import requires a theme/ folder even when no font was stored.
                writer.add_file(THEME_PLACEHOLDER, THEME_PLACEHOLDER_TEXT.as_bytes())?;
                debug!(theme_id = theme.id, "Theme has no fonts, wrote placeholder");
            }
            manifest.theme = Some(ThemeSection {
                name: theme.name,
                fonts,
                colors: ThemeColors {
                    body_color: theme.body_color,
                    primary_color: theme.primary_color,
                    secondary_color: theme.secondary_color,
                    heading_color: theme.heading_color,
                },
                typescale: parse_object(&theme.typescale),
            });
        }

        if let Some(id) = request.flow_id {
            let flow = flows::Entity::find_by_id(id)
                .filter(flows::Column::OrganisationId.eq(organisation_id))
                .one(&self.db)
                .await?
                .ok_or(ImportExportError::ReferenceNotFound { entity: "flow", id })?;
            manifest.flow = Some(FlowSection {
                name: flow.name,
                controlled: flow.controlled,
            });
        }

        if let Some(id) = request.frame_id {
            let frame = frames::Entity::find_by_id(id)
                .filter(frames::Column::OrganisationId.eq(organisation_id))
                .one(&self.db)
                .await?
                .ok_or(ImportExportError::ReferenceNotFound {
                    entity: "frame",
                    id,
                })?;
            let asset = self.owned_asset(organisation_id, frame.asset_id).await?;
            self.add_asset(&mut writer, "frame", &asset).await?;
            manifest.frame = Some(FrameSection {
                name: frame.name,
                description: frame.description,
                frame_type: Some(frame.frame_type),
            });
        }

        if let Some(template) = data_template {
            let tree: Value = serde_json::from_str(&template.serialized)?;
            writer.add_json(TEMPLATE_ENTRY, &tree)?;
            manifest.data_template = Some(DataTemplateSection {
                title: template.title,
                title_template: template.title_template,
            });
        }

        let name = export_name(&manifest);
        manifest.metadata = Some(ManifestMetadata {
            name: name.clone(),
            description: None,
            version: Some("1".to_string()),
            kind: Some("template".to_string()),
        });
        writer.add_json(MANIFEST_ENTRY, &manifest)?;

        let bytes = writer.finish()?;
        let filename = format!("{}.zip", sanitize_filename(&name));
        info!(
            organisation_id,
            filename = %filename,
            size = bytes.len(),
            "Exported template archive"
        );
        Ok(TemplateArchiveFile { filename, bytes })
    }

    async fn owned_data_template(
        &self,
        organisation_id: i32,
        id: i32,
    ) -> ImportExportResult<data_templates::Model> {
        let not_found = ImportExportError::ReferenceNotFound {
            entity: "data_template",
            id,
        };
        let Some(template) = data_templates::Entity::find_by_id(id).one(&self.db).await? else {
            return Err(not_found);
        };
        // Data templates are owned through their variant.
        let owned = content_types::Entity::find_by_id(template.content_type_id)
            .filter(content_types::Column::OrganisationId.eq(organisation_id))
            .one(&self.db)
            .await?
            .is_some();
        if owned {
            Ok(template)
        } else {
            Err(not_found)
        }
    }

    async fn owned_asset(
        &self,
        organisation_id: i32,
        asset_id: i32,
    ) -> ImportExportResult<assets::Model> {
        self.assets
            .find_owned(&self.db, organisation_id, asset_id)
            .await?
            .ok_or(ImportExportError::ReferenceNotFound {
                entity: "asset",
                id: asset_id,
            })
    }

    /// Copy an asset's bytes to `<folder>/<file_name>`; returns the entry path.
    async fn add_asset(
        &self,
        writer: &mut ArchiveWriter,
        folder: &str,
        asset: &assets::Model,
    ) -> ImportExportResult<String> {
        let bytes = self.assets.read(asset).await?;
        let path = format!("{}/{}", folder, asset.file_name);
        writer.add_file(&path, &bytes)?;
        debug!(path = %path, size = bytes.len(), "Added asset to export");
        Ok(path)
    }
}

fn parse_object(raw: &str) -> Option<Value> {
    serde_json::from_str::<Value>(raw)
        .ok()
        .filter(|value| value.as_object().map(|o| !o.is_empty()).unwrap_or(false))
}

fn export_name(manifest: &Manifest) -> String {
    manifest
        .variant
        .as_ref()
        .map(|v| v.name.clone())
        .or_else(|| manifest.theme.as_ref().map(|t| t.name.clone()))
        .or_else(|| manifest.layout.as_ref().map(|l| l.name.clone()))
        .or_else(|| manifest.frame.as_ref().map(|f| f.name.clone()))
        .or_else(|| manifest.flow.as_ref().map(|f| f.name.clone()))
        .unwrap_or_else(|| "template".to_string())
}

fn sanitize_filename(name: &str) -> String {
    let filtered: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let collapsed = filtered
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if collapsed.is_empty() {
        "template".to_string()
    } else {
        collapsed
    }
}
