use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};
use sha2::{Digest, Sha256};

use crate::database::entities::assets;
use crate::errors::StorageResult;
use crate::storage::{asset_storage_key, ObjectStorage};

/// Blob metadata: where the bytes go in object storage and what the asset row records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub storage_key: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub checksum: String,
}

impl StoredBlob {
    /// Describe `bytes` as a blob under a fresh organisation key.
    pub fn new(organisation_id: i32, kind: &str, file_name: &str, bytes: &[u8]) -> Self {
        Self {
            storage_key: asset_storage_key(organisation_id, kind, file_name),
            file_name: file_name.to_string(),
            content_type: content_type_for(file_name).map(str::to_string),
            size: bytes.len() as i64,
            checksum: checksum(bytes),
        }
    }
}

pub fn checksum(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some("application/pdf"),
        "ttf" => Some("font/ttf"),
        "otf" => Some("font/otf"),
        "tex" => Some("application/x-tex"),
        "typ" => Some("text/x-typst"),
        "json" => Some("application/json"),
        _ => None,
    }
}

/// Stores organisation assets: blob in object storage, metadata in `assets`.
#[derive(Clone)]
pub struct AssetService {
    storage: Arc<dyn ObjectStorage>,
}

impl AssetService {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn ObjectStorage> {
        &self.storage
    }

    /// Upload bytes under the blob's key.
    pub async fn put(&self, blob: &StoredBlob, bytes: Vec<u8>) -> StorageResult<()> {
        self.storage.put(&blob.storage_key, bytes).await
    }

    pub async fn record<C: ConnectionTrait>(
        &self,
        conn: &C,
        organisation_id: i32,
        kind: &str,
        blob: &StoredBlob,
    ) -> Result<assets::Model, DbErr> {
        assets::ActiveModel {
            organisation_id: Set(organisation_id),
            kind: Set(kind.to_string()),
            file_name: Set(blob.file_name.clone()),
            storage_key: Set(blob.storage_key.clone()),
            content_type: Set(blob.content_type.clone()),
            size: Set(blob.size),
            checksum: Set(blob.checksum.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(conn)
        .await
    }

    pub async fn find_owned<C: ConnectionTrait>(
        &self,
        conn: &C,
        organisation_id: i32,
        asset_id: i32,
    ) -> Result<Option<assets::Model>, DbErr> {
        assets::Entity::find_by_id(asset_id)
            .filter(assets::Column::OrganisationId.eq(organisation_id))
            .one(conn)
            .await
    }

    pub async fn read(&self, asset: &assets::Model) -> StorageResult<Vec<u8>> {
        self.storage.get(&asset.storage_key).await
    }
}
