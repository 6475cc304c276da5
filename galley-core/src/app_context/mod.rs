use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::GalleyConfig;
use crate::export::TemplateExporter;
use crate::import::TemplateImporter;
use crate::services::AssetService;
use crate::storage::{LocalObjectStorage, ObjectStorage};

mod template_operations;

/// Shared application context exposing the template import/export services.
#[derive(Clone)]
pub struct AppContext {
    db: DatabaseConnection,
    config: GalleyConfig,
    assets: AssetService,
    importer: Arc<TemplateImporter>,
    exporter: Arc<TemplateExporter>,
    http: reqwest::Client,
}

impl AppContext {
    /// Context backed by the local filesystem storage configured in `config`.
    pub fn new(db: DatabaseConnection, config: GalleyConfig) -> Self {
        let storage = Arc::new(LocalObjectStorage::new(
            config.storage_root.clone(),
            config.signing_secret.clone(),
        ));
        Self::with_storage(db, config, storage)
    }

    pub fn with_storage(
        db: DatabaseConnection,
        config: GalleyConfig,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let assets = AssetService::new(storage);
        let importer = Arc::new(TemplateImporter::new(
            db.clone(),
            assets.clone(),
            config.import.clone(),
            config.frames_root.clone(),
        ));
        let exporter = Arc::new(TemplateExporter::new(db.clone(), assets.clone()));

        Self {
            db,
            config,
            assets,
            importer,
            exporter,
            http: reqwest::Client::new(),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn config(&self) -> &GalleyConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn ObjectStorage> {
        self.assets.storage()
    }
}
