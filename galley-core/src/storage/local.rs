use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use url::Url;

use super::ObjectStorage;
use crate::errors::{StorageError, StorageResult};

/// Filesystem-backed storage rooted at a directory. Signed URLs are `file://`
/// URLs carrying an expiry and a SHA-256 signature over key, expiry and secret.
pub struct LocalObjectStorage {
    root: PathBuf,
    secret: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, secret: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            secret: secret.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> StorageResult<PathBuf> {
        let candidate = Path::new(key);
        if key.trim().is_empty()
            || candidate.is_absolute()
            || candidate
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(candidate))
    }

    fn signature(&self, key: &str, expires: i64) -> String {
        let digest = Sha256::digest(format!("{}:{}:{}", key, expires, self.secret).as_bytes());
        format!("{:x}", digest)
    }

    /// Check a signature previously issued by [`ObjectStorage::signed_url`].
    pub fn verify_signature(&self, key: &str, expires: i64, signature: &str) -> bool {
        expires >= Utc::now().timestamp() && self.signature(key, expires) == signature
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> StorageResult<String> {
        let path = self.resolve(key)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }
        let absolute = if path.is_absolute() {
            path
        } else {
            std::env::current_dir()?.join(path)
        };
        let mut url = Url::from_file_path(&absolute)
            .map_err(|_| StorageError::InvalidKey(key.to_string()))?;

        let expires = Utc::now().timestamp() + ttl.as_secs() as i64;
        url.query_pairs_mut()
            .append_pair("expires", &expires.to_string())
            .append_pair("signature", &self.signature(key, expires));
        Ok(url.to_string())
    }
}
