#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use galley::database::entities::{organisations, users};
use galley::database::migrations::Migrator;
use galley::storage::{MemoryObjectStorage, ObjectStorage};
use galley::{AppContext, GalleyConfig};
use galley_test_utils::{TempDir, TestDb};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

pub struct Harness {
    pub app: AppContext,
    pub storage: Arc<MemoryObjectStorage>,
    pub frames: TempDir,
    pub organisation_id: i32,
    pub creator_id: i32,
}

impl Harness {
    pub async fn new() -> Self {
        let storage = Arc::new(MemoryObjectStorage::new());
        Self::with_object_storage(storage.clone(), storage).await
    }

    /// `storage` backs assets; `inspect` is the memory store it writes through to.
    pub async fn with_object_storage(
        inspect: Arc<MemoryObjectStorage>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let db = TestDb::new_in_memory()
            .connect()
            .await
            .expect("Failed to connect to test database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let frames = TempDir::new().expect("Failed to create frames dir");
        let config = GalleyConfig {
            database_url: TestDb::new_in_memory().url().to_string(),
            frames_root: frames.path().to_path_buf(),
            ..GalleyConfig::default()
        };

        let (organisation_id, creator_id) = create_owner(&db, "Acme").await;
        Self {
            app: AppContext::with_storage(db, config, storage),
            storage: inspect,
            frames,
            organisation_id,
            creator_id,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        self.app.db()
    }
}

pub async fn create_owner(db: &DatabaseConnection, name: &str) -> (i32, i32) {
    let now = Utc::now();
    let organisation = organisations::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create organisation");

    let user = users::ActiveModel {
        organisation_id: Set(organisation.id),
        email: Set(format!("author@{}.example", name.to_lowercase())),
        name: Set(format!("{} Author", name)),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create user");

    (organisation.id, user.id)
}

/// Regular files anywhere below `root`.
pub fn count_files(root: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(root) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}
