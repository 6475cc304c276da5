use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "data_templates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub content_type_id: i32,
    pub creator_id: i32,
    pub title: String,
    pub title_template: Option<String>,
    /// Markdown rendering of the body
    #[sea_orm(column_type = "Text")]
    pub data: String,
    /// Original document tree, JSON
    #[sea_orm(column_type = "Text")]
    pub serialized: String,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::content_types::Entity",
        from = "Column::ContentTypeId",
        to = "super::content_types::Column::Id"
    )]
    ContentTypes,
}

impl Related<super::content_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
