use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "themes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub organisation_id: i32,
    pub creator_id: i32,
    pub name: String,
    /// Font family shared by the theme's font assets
    pub font: Option<String>,
    #[sea_orm(column_type = "Text", default_value = "{}")]
    pub typescale: String, // JSON object
    pub body_color: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub heading_color: Option<String>,
    /// Comma-joined asset ids of the stored font files
    #[sea_orm(column_type = "Text", default_value = "")]
    pub font_asset_ids: String,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

impl Model {
    pub fn font_asset_id_list(&self) -> Vec<i32> {
        self.font_asset_ids
            .split(',')
            .filter_map(|raw| raw.trim().parse().ok())
            .collect()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
