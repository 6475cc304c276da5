use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const KIND_FONT: &str = "font";
pub const KIND_LAYOUT: &str = "layout";
pub const KIND_FRAME: &str = "frame";

/// A file owned by an organisation. The bytes live in object storage under
/// `storage_key`; this row only records where and what they are.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub organisation_id: i32,
    /// font, layout, or frame
    pub kind: String,
    pub file_name: String,
    pub storage_key: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub checksum: String,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
