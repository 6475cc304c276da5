use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const FRAME_TYPE_LATEX: &str = "latex";
pub const FRAME_TYPE_TYPST: &str = "typst";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "frames")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub organisation_id: i32,
    pub creator_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub frame_type: String,
    pub asset_id: i32,
    /// SHA-256 of the template file
    pub checksum: String,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
