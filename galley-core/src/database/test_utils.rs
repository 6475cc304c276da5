use chrono::Utc;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

use crate::database::entities::{organisations, users};

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");

    crate::database::migrations::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub async fn create_test_owner(db: &DatabaseConnection) -> (organisations::Model, users::Model) {
    let now = Utc::now();
    let organisation = organisations::ActiveModel {
        name: Set("Test Organisation".to_string()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create test organisation");

    let user = users::ActiveModel {
        organisation_id: Set(organisation.id),
        email: Set("author@example.com".to_string()),
        name: Set("Test Author".to_string()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create test user");

    (organisation, user)
}
