use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};

use super::{creation_failed, json_or_empty, single_file, PrepareEnv};
use crate::archive::TemplateArchive;
use crate::database::entities::{assets::KIND_LAYOUT, layouts};
use crate::errors::{ImportExportResult, ImportWarning};
use crate::import::ImportContext;
use crate::manifest::LayoutSection;
use crate::services::{NameScope, StoredBlob};

pub async fn prepare(
    env: &PrepareEnv<'_>,
    section: &LayoutSection,
    archive: &mut TemplateArchive,
    ctx: &mut ImportContext,
) -> ImportExportResult<layouts::Model> {
    let entry = single_file(archive, "layout", "layout", "pdf")?;
    let bytes = archive.read(&entry.name)?;

    let engine_id = match section.engine.as_deref() {
        Some(engine) => {
            let id = env.references.engine_id(engine);
            if id.is_none() {
                ctx.warn(ImportWarning::EngineNotFound {
                    engine: engine.to_string(),
                });
            }
            id
        }
        None => None,
    };

    let name = NameScope::<layouts::Entity>::new(
        "layout",
        layouts::Column::Name,
        layouts::Column::OrganisationId,
        ctx.organisation_id,
    )
    .resolve(env.txn, &section.name, env.config.max_name_attempts)
    .await?;

    let blob = StoredBlob::new(ctx.organisation_id, KIND_LAYOUT, entry.file_name(), &bytes);
    ctx.track_blob(blob.storage_key.clone());
    env.assets.put(&blob, bytes).await?;
    let asset = env
        .assets
        .record(env.txn, ctx.organisation_id, KIND_LAYOUT, &blob)
        .await
        .map_err(creation_failed("layout"))?;
    let asset_id = asset.id;
    ctx.assets.push(asset);

    let now = Utc::now();
    layouts::ActiveModel {
        organisation_id: Set(ctx.organisation_id),
        creator_id: Set(ctx.creator_id),
        name: Set(name),
        slug: Set(section.slug.clone()),
        description: Set(section.description.clone()),
        width: Set(section.width),
        height: Set(section.height),
        unit: Set(section.unit.clone()),
        margin: Set(json_or_empty(section.margin.as_ref())),
        engine_id: Set(engine_id),
        frame_id: Set(ctx.frame.get().map(|frame| frame.id)),
        asset_id: Set(Some(asset_id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(env.txn)
    .await
    .map_err(creation_failed("layout"))
}
