use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use tracing::debug;

use super::{creation_failed, PrepareEnv};
use crate::database::entities::{content_type_fields, content_types};
use crate::errors::{ImportExportError, ImportExportResult};
use crate::import::ImportContext;
use crate::manifest::VariantSection;
use crate::services::NameScope;

fn requires(what: &str) -> ImportExportError {
    ImportExportError::entity_creation(
        "variant",
        format!("a {} must be imported or supplied by id", what),
    )
}

/// Creates the content type and its fields. Declared field types without a
/// matching field type are stored with no field type.
pub async fn prepare(
    env: &PrepareEnv<'_>,
    section: &VariantSection,
    ctx: &mut ImportContext,
) -> ImportExportResult<content_types::Model> {
    let theme_id = ctx.theme.get().map(|t| t.id).ok_or_else(|| requires("theme"))?;
    let layout_id = ctx.layout.get().map(|l| l.id).ok_or_else(|| requires("layout"))?;
    let flow_id = ctx.flow.get().map(|f| f.id).ok_or_else(|| requires("flow"))?;

    let name = NameScope::<content_types::Entity>::new(
        "variant",
        content_types::Column::Name,
        content_types::Column::OrganisationId,
        ctx.organisation_id,
    )
    .resolve(env.txn, &section.name, env.config.max_name_attempts)
    .await?;

    let now = Utc::now();
    let content_type = content_types::ActiveModel {
        organisation_id: Set(ctx.organisation_id),
        creator_id: Set(ctx.creator_id),
        name: Set(name),
        description: Set(section.description.clone()),
        color: Set(section.color.clone()),
        prefix: Set(section.prefix.clone()),
        theme_id: Set(theme_id),
        layout_id: Set(layout_id),
        flow_id: Set(flow_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(env.txn)
    .await
    .map_err(creation_failed("variant"))?;

    for (index, field) in section.fields.iter().enumerate() {
        let field_type_id = env.references.field_type_id(&field.field_type);
        if field_type_id.is_none() {
            debug!(field = %field.name, declared = %field.field_type, "No matching field type");
        }
        let row = content_type_fields::ActiveModel {
            content_type_id: Set(content_type.id),
            field_type_id: Set(field_type_id),
            name: Set(field.name.clone()),
            description: Set(field.description.clone()),
            required: Set(field.required),
            order: Set(index as i32 + 1),
            ..Default::default()
        }
        .insert(env.txn)
        .await
        .map_err(creation_failed("variant"))?;
        ctx.content_type_fields.push(row);
    }

    Ok(content_type)
}
