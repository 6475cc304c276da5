//! Name-collision resolution for imported entities.
//!
//! A taken name is bumped by its trailing integer (`"Foo 3"` becomes `"Foo 4"`)
//! or gets `" 2"` appended, and the check repeats until a free name is found or
//! the attempt cap is hit.

use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::debug;

use crate::errors::{ImportExportError, ImportExportResult};

static TRAILING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<base>.*\S)\s+(?P<number>\d+)$")
        .expect("Invalid regex pattern for trailing name number")
});

pub fn increment_name(name: &str) -> String {
    if let Some(caps) = TRAILING_NUMBER.captures(name) {
        if let Some(next) = caps["number"]
            .parse::<u64>()
            .ok()
            .and_then(|n| n.checked_add(1))
        {
            return format!("{} {}", &caps["base"], next);
        }
    }
    format!("{} 2", name)
}

/// Where a name must be unique: the entity's name column filtered by its
/// owner column (organisation, or creator for data templates).
pub struct NameScope<E: EntityTrait> {
    pub entity: &'static str,
    pub name_column: E::Column,
    pub owner_column: E::Column,
    pub owner_id: i32,
}

impl<E: EntityTrait> NameScope<E> {
    pub fn new(
        entity: &'static str,
        name_column: E::Column,
        owner_column: E::Column,
        owner_id: i32,
    ) -> Self {
        Self {
            entity,
            name_column,
            owner_column,
            owner_id,
        }
    }

    pub async fn is_taken<C: ConnectionTrait>(&self, conn: &C, name: &str) -> ImportExportResult<bool> {
        let existing = E::find()
            .filter(self.name_column.eq(name))
            .filter(self.owner_column.eq(self.owner_id))
            .one(conn)
            .await?;
        Ok(existing.is_some())
    }

    /// First free name starting from `desired`.
    pub async fn resolve<C: ConnectionTrait>(
        &self,
        conn: &C,
        desired: &str,
        max_attempts: usize,
    ) -> ImportExportResult<String> {
        let mut candidate = desired.trim().to_string();
        for _ in 0..max_attempts {
            if !self.is_taken(conn, &candidate).await? {
                if candidate != desired.trim() {
                    debug!(entity = self.entity, desired, resolved = %candidate, "Renamed to avoid collision");
                }
                return Ok(candidate);
            }
            debug!(entity = self.entity, name = %candidate, "Name taken");
            candidate = increment_name(&candidate);
        }

        Err(ImportExportError::NameResolutionExhausted {
            entity: self.entity,
            name: desired.to_string(),
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::entities::flows;
    use crate::database::test_utils::{create_test_owner, setup_test_db};
    use chrono::Utc;
    use sea_orm::{ActiveModelTrait, Set};

    #[test]
    fn increments_trailing_number() {
        assert_eq!(increment_name("Foo 3"), "Foo 4");
        assert_eq!(increment_name("Foo 9"), "Foo 10");
        assert_eq!(increment_name("Report  12"), "Report 13");
    }

    #[test]
    fn appends_two_without_trailing_number() {
        assert_eq!(increment_name("Foo"), "Foo 2");
        assert_eq!(increment_name("Foo3"), "Foo3 2");
        assert_eq!(increment_name("2024"), "2024 2");
    }

    #[test]
    fn overflow_falls_back_to_append() {
        let name = format!("Foo {}", u64::MAX);
        assert_eq!(increment_name(&name), format!("{} 2", name));
    }

    async fn insert_flow(db: &sea_orm::DatabaseConnection, org: i32, creator: i32, name: &str) {
        let now = Utc::now();
        flows::ActiveModel {
            organisation_id: Set(org),
            creator_id: Set(creator),
            name: Set(name.to_string()),
            controlled: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn resolve_skips_taken_names() {
        let db = setup_test_db().await;
        let (org, user) = create_test_owner(&db).await;
        insert_flow(&db, org.id, user.id, "Review").await;
        insert_flow(&db, org.id, user.id, "Review 2").await;

        let scope = NameScope::<flows::Entity>::new(
            "flow",
            flows::Column::Name,
            flows::Column::OrganisationId,
            org.id,
        );
        assert_eq!(scope.resolve(&db, "Review", 10).await.unwrap(), "Review 3");
        assert_eq!(scope.resolve(&db, "Approval", 10).await.unwrap(), "Approval");

        let other_org = NameScope::<flows::Entity>::new(
            "flow",
            flows::Column::Name,
            flows::Column::OrganisationId,
            org.id + 1,
        );
        assert_eq!(other_org.resolve(&db, "Review", 10).await.unwrap(), "Review");
    }

    #[tokio::test]
    async fn resolve_gives_up_after_cap() {
        let db = setup_test_db().await;
        let (org, user) = create_test_owner(&db).await;
        insert_flow(&db, org.id, user.id, "Review").await;
        insert_flow(&db, org.id, user.id, "Review 2").await;

        let scope = NameScope::<flows::Entity>::new(
            "flow",
            flows::Column::Name,
            flows::Column::OrganisationId,
            org.id,
        );
        let err = scope.resolve(&db, "Review", 2).await.unwrap_err();
        assert!(matches!(
            err,
            ImportExportError::NameResolutionExhausted { attempts: 2, .. }
        ));
    }
}
