use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use tracing::{debug, info};

use super::{creation_failed, json_or_empty, PrepareEnv};
use crate::archive::TemplateArchive;
use crate::database::entities::{assets::KIND_FONT, themes};
use crate::errors::ImportExportResult;
use crate::import::fonts::{family_from_declared, parse_font_path, FontFile, FontPool, FontUpload};
use crate::import::ImportContext;
use crate::manifest::ThemeSection;
use crate::services::NameScope;

pub async fn prepare(
    env: &PrepareEnv<'_>,
    section: &ThemeSection,
    archive: &mut TemplateArchive,
    ctx: &mut ImportContext,
) -> ImportExportResult<themes::Model> {
    let name = NameScope::<themes::Entity>::new(
        "theme",
        themes::Column::Name,
        themes::Column::OrganisationId,
        ctx.organisation_id,
    )
    .resolve(env.txn, &section.name, env.config.max_name_attempts)
    .await?;

    let mut fonts = Vec::new();
    for entry in archive.entries_under("theme") {
        match parse_font_path(&entry.name) {
            Some((family, style)) => {
                let bytes = archive.read(&entry.name)?;
                fonts.push(FontFile {
                    path: entry.name,
                    family,
                    style,
                    bytes,
                });
            }
            None => debug!(file = %entry.name, "Skipping non-font theme file"),
        }
    }

    let family = section
        .fonts
        .first()
        .and_then(|declared| family_from_declared(&declared.name))
        .or_else(|| fonts.first().map(|font| font.family.replace(char::is_whitespace, "")));

    let pool = FontPool::new(env.assets.storage().clone(), env.config);
    let mut font_asset_ids = Vec::new();
    for upload in pool.upload(ctx.organisation_id, fonts).await {
        match upload {
            FontUpload::Stored { font, blob } => {
                ctx.track_blob(blob.storage_key.clone());
                let asset = env
                    .assets
                    .record(env.txn, ctx.organisation_id, KIND_FONT, &blob)
                    .await
                    .map_err(creation_failed("theme"))?;
                debug!(file = %font.path, asset_id = asset.id, "Stored theme font");
                font_asset_ids.push(asset.id.to_string());
                ctx.assets.push(asset);
            }
            FontUpload::Failed {
                storage_key,
                warning,
            } => {
                if let Some(key) = storage_key {
                    ctx.track_blob(key);
                }
                ctx.warn(warning);
            }
        }
    }
    info!(
        fonts = font_asset_ids.len(),
        family = family.as_deref().unwrap_or("-"),
        "Theme fonts stored"
    );

    let now = Utc::now();
    themes::ActiveModel {
        organisation_id: Set(ctx.organisation_id),
        creator_id: Set(ctx.creator_id),
        name: Set(name),
        font: Set(family),
        typescale: Set(json_or_empty(section.typescale.as_ref())),
        body_color: Set(section.colors.body_color.clone()),
        primary_color: Set(section.colors.primary_color.clone()),
        secondary_color: Set(section.colors.secondary_color.clone()),
        heading_color: Set(section.colors.heading_color.clone()),
        font_asset_ids: Set(font_asset_ids.join(",")),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(env.txn)
    .await
    .map_err(creation_failed("theme"))
}
