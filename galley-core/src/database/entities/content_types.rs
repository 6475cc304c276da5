use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A document schema ("variant"): which theme, layout, and flow documents of
/// this type use, plus the fields they carry.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub organisation_id: i32,
    pub creator_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub prefix: String,
    pub theme_id: i32,
    pub layout_id: i32,
    pub flow_id: i32,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::content_type_fields::Entity")]
    ContentTypeFields,
    #[sea_orm(has_many = "super::data_templates::Entity")]
    DataTemplates,
}

impl Related<super::content_type_fields::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentTypeFields.def()
    }
}

impl Related<super::data_templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DataTemplates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
