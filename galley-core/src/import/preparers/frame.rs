use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use tracing::debug;

use super::{creation_failed, single_file, PrepareEnv};
use crate::archive::TemplateArchive;
use crate::database::entities::{assets::KIND_FRAME, frames};
use crate::errors::ImportExportResult;
use crate::import::ImportContext;
use crate::manifest::FrameSection;
use crate::services::{NameScope, StoredBlob};

pub async fn prepare(
    env: &PrepareEnv<'_>,
    section: &FrameSection,
    archive: &mut TemplateArchive,
    ctx: &mut ImportContext,
) -> ImportExportResult<frames::Model> {
    let entry = single_file(archive, "frame", "frame", "tex")?;
    let bytes = archive.read(&entry.name)?;
    let file_name = entry.file_name().to_string();

    let name = NameScope::<frames::Entity>::new(
        "frame",
        frames::Column::Name,
        frames::Column::OrganisationId,
        ctx.organisation_id,
    )
    .resolve(env.txn, &section.name, env.config.max_name_attempts)
    .await?;

    let blob = StoredBlob::new(ctx.organisation_id, KIND_FRAME, &file_name, &bytes);
    ctx.track_blob(blob.storage_key.clone());
    env.assets.put(&blob, bytes.clone()).await?;
    let asset = env
        .assets
        .record(env.txn, ctx.organisation_id, KIND_FRAME, &blob)
        .await
        .map_err(creation_failed("frame"))?;
    ctx.assets.push(asset.clone());

    let now = Utc::now();
    let frame = frames::ActiveModel {
        organisation_id: Set(ctx.organisation_id),
        creator_id: Set(ctx.creator_id),
        name: Set(name),
        description: Set(section.description.clone()),
        frame_type: Set(section
            .frame_type
            .clone()
            .unwrap_or_else(|| frames::FRAME_TYPE_LATEX.to_string())),
        asset_id: Set(asset.id),
        checksum: Set(blob.checksum.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(env.txn)
    .await
    .map_err(creation_failed("frame"))?;

    // Renderers read frames from disk: <frames_root>/<organisation>/<frame>/<file>
    let path = env
        .frames_root
        .join(ctx.organisation_id.to_string())
        .join(frame.id.to_string())
        .join(&file_name);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    ctx.track_file(path.clone());
    tokio::fs::write(&path, &bytes).await?;
    debug!(path = %path.display(), "Wrote frame template");

    Ok(frame)
}
