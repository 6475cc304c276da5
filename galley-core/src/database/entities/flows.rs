use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "flows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub organisation_id: i32,
    pub creator_id: i32,
    pub name: String,
    /// Controlled flows require approvals between states
    pub controlled: bool,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::flow_states::Entity")]
    FlowStates,
}

impl Related<super::flow_states::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FlowStates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
