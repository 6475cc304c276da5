use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};

use super::{creation_failed, PrepareEnv};
use crate::database::entities::{flow_states, flows};
use crate::errors::ImportExportResult;
use crate::import::ImportContext;
use crate::manifest::FlowSection;
use crate::services::NameScope;

/// States every imported flow starts with, in order.
pub const DEFAULT_STATES: [&str; 2] = ["Draft", "Publish"];

pub async fn prepare(
    env: &PrepareEnv<'_>,
    section: &FlowSection,
    ctx: &mut ImportContext,
) -> ImportExportResult<flows::Model> {
    let name = NameScope::<flows::Entity>::new(
        "flow",
        flows::Column::Name,
        flows::Column::OrganisationId,
        ctx.organisation_id,
    )
    .resolve(env.txn, &section.name, env.config.max_name_attempts)
    .await?;

    let now = Utc::now();
    let flow = flows::ActiveModel {
        organisation_id: Set(ctx.organisation_id),
        creator_id: Set(ctx.creator_id),
        name: Set(name),
        controlled: Set(section.controlled),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(env.txn)
    .await
    .map_err(creation_failed("flow"))?;

    for (index, state) in DEFAULT_STATES.iter().enumerate() {
        let row = flow_states::ActiveModel {
            flow_id: Set(flow.id),
            organisation_id: Set(ctx.organisation_id),
            state: Set(state.to_string()),
            order: Set(index as i32 + 1),
            ..Default::default()
        }
        .insert(env.txn)
        .await
        .map_err(creation_failed("flow"))?;
        ctx.flow_states.push(row);
    }

    Ok(flow)
}
