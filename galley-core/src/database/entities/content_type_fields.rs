use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_type_fields")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub content_type_id: i32,
    /// None when the declared type matched no known field type
    pub field_type_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub required: bool,
    pub order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::content_types::Entity",
        from = "Column::ContentTypeId",
        to = "super::content_types::Column::Id"
    )]
    ContentTypes,
    #[sea_orm(
        belongs_to = "super::field_types::Entity",
        from = "Column::FieldTypeId",
        to = "super::field_types::Column::Id"
    )]
    FieldTypes,
}

impl Related<super::content_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentTypes.def()
    }
}

impl Related<super::field_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FieldTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
