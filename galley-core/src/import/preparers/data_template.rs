use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};

use super::{creation_failed, PrepareEnv};
use crate::archive::{TemplateArchive, TEMPLATE_ENTRY};
use crate::database::entities::data_templates;
use crate::errors::{ImportExportError, ImportExportResult};
use crate::import::ImportContext;
use crate::manifest::DataTemplateSection;
use crate::markdown;
use crate::services::NameScope;

/// Stores the template body twice: as Markdown in `data` and as the original
/// document tree in `serialized`.
pub async fn prepare(
    env: &PrepareEnv<'_>,
    section: &DataTemplateSection,
    archive: &mut TemplateArchive,
    ctx: &mut ImportContext,
) -> ImportExportResult<data_templates::Model> {
    let content_type_id = ctx.content_type.get().map(|c| c.id).ok_or_else(|| {
        ImportExportError::entity_creation(
            "data_template",
            "a variant must be imported or supplied by id",
        )
    })?;

    if !archive.contains(TEMPLATE_ENTRY) {
        return Err(ImportExportError::entity_creation(
            "data_template",
            format!("archive has no {}", TEMPLATE_ENTRY),
        ));
    }
    let tree = markdown::parse_tree(&archive.read(TEMPLATE_ENTRY)?)?;
    let body = markdown::to_markdown(&tree)?;

    let title = NameScope::<data_templates::Entity>::new(
        "data_template",
        data_templates::Column::Title,
        data_templates::Column::CreatorId,
        ctx.creator_id,
    )
    .resolve(env.txn, &section.title, env.config.max_name_attempts)
    .await?;

    let now = Utc::now();
    data_templates::ActiveModel {
        content_type_id: Set(content_type_id),
        creator_id: Set(ctx.creator_id),
        title: Set(title),
        title_template: Set(section.title_template.clone()),
        data: Set(body),
        serialized: Set(tree.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(env.txn)
    .await
    .map_err(creation_failed("data_template"))
}
