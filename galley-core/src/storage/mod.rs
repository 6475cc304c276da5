//! Object storage for organisation assets.
//!
//! The import pipeline only needs four operations, so storage is consumed
//! through [`ObjectStorage`]. [`LocalObjectStorage`] backs the CLI and
//! single-node deployments; [`MemoryObjectStorage`] backs tests.

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::StorageResult;

mod local;
mod memory;

pub use local::LocalObjectStorage;
pub use memory::MemoryObjectStorage;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()>;

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    async fn signed_url(&self, key: &str, ttl: Duration) -> StorageResult<String>;
}

/// Key under which an organisation's asset bytes are stored.
pub fn asset_storage_key(organisation_id: i32, kind: &str, file_name: &str) -> String {
    format!(
        "organisations/{}/{}/{}/{}",
        organisation_id,
        kind,
        Uuid::new_v4(),
        file_name
    )
}
