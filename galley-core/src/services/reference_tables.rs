use std::collections::HashMap;

use sea_orm::{ConnectionTrait, DbErr, EntityTrait};

use crate::database::entities::{engines, field_types};

/// Read-only lookups for seeded reference data, loaded once per import.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    field_types: HashMap<String, i32>,
    engines: HashMap<String, i32>,
}

impl ReferenceTables {
    pub async fn load<C: ConnectionTrait>(conn: &C) -> Result<Self, DbErr> {
        let field_types = field_types::Entity::find()
            .all(conn)
            .await?
            .into_iter()
            .map(|row| (row.name, row.id));
        let engines = engines::Entity::find()
            .all(conn)
            .await?
            .into_iter()
            .map(|row| (row.name, row.id));
        Ok(Self::from_rows(field_types, engines))
    }

    pub fn from_rows(
        field_types: impl IntoIterator<Item = (String, i32)>,
        engines: impl IntoIterator<Item = (String, i32)>,
    ) -> Self {
        Self {
            field_types: field_types.into_iter().collect(),
            engines: engines
                .into_iter()
                .map(|(name, id)| (name.to_lowercase(), id))
                .collect(),
        }
    }

    /// Field type for a declared type such as `"string"`: capitalised, then
    /// matched exactly against the seeded names.
    pub fn field_type_id(&self, declared: &str) -> Option<i32> {
        self.field_types.get(&capitalize(declared.trim())).copied()
    }

    pub fn field_type_name(&self, id: i32) -> Option<&str> {
        self.field_types
            .iter()
            .find(|(_, value)| **value == id)
            .map(|(name, _)| name.as_str())
    }

    /// Engine for a reference such as `"pandoc/latex"`, matched on the part
    /// before `/`, case-insensitively.
    pub fn engine_id(&self, reference: &str) -> Option<i32> {
        let prefix = reference.split('/').next().unwrap_or_default().trim();
        if prefix.is_empty() {
            return None;
        }
        self.engines.get(&prefix.to_lowercase()).copied()
    }

    pub fn engine_name(&self, id: i32) -> Option<&str> {
        self.engines
            .iter()
            .find(|(_, value)| **value == id)
            .map(|(name, _)| name.as_str())
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::setup_test_db;

    fn tables() -> ReferenceTables {
        ReferenceTables::from_rows(
            vec![("String".to_string(), 1), ("Url".to_string(), 8)],
            vec![("Pandoc".to_string(), 1), ("LaTeX".to_string(), 2)],
        )
    }

    #[test]
    fn field_types_match_after_capitalising() {
        let tables = tables();
        assert_eq!(tables.field_type_id("string"), Some(1));
        assert_eq!(tables.field_type_id("URL"), Some(8));
        assert_eq!(tables.field_type_id("sparkles"), None);
        assert_eq!(tables.field_type_id(""), None);
        assert_eq!(tables.field_type_name(8), Some("Url"));
    }

    #[test]
    fn engines_match_on_prefix() {
        let tables = tables();
        assert_eq!(tables.engine_id("pandoc/latex"), Some(1));
        assert_eq!(tables.engine_id("PANDOC"), Some(1));
        assert_eq!(tables.engine_id("latex/xelatex"), Some(2));
        assert_eq!(tables.engine_id("groff/ms"), None);
        assert_eq!(tables.engine_id("/latex"), None);
    }

    #[tokio::test]
    async fn loads_seeded_rows() {
        let db = setup_test_db().await;
        let tables = ReferenceTables::load(&db).await.unwrap();
        assert!(tables.field_type_id("checkbox").is_some());
        assert!(tables.engine_id("typst").is_some());
    }
}
