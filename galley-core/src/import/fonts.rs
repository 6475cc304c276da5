//! Theme font discovery and the bounded upload pool.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::config::ImportConfig;
use crate::database::entities::assets::KIND_FONT;
use crate::errors::ImportWarning;
use crate::services::StoredBlob;
use crate::storage::ObjectStorage;

static FONT_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^theme/(?P<family>[^/]+)-(?P<style>Regular|Italic|Bold|BoldItalic)\.(otf|ttf)$")
        .expect("Invalid regex pattern for theme font paths")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FontStyle {
    Regular,
    Italic,
    Bold,
    BoldItalic,
}

impl FontStyle {
    pub const ALL: [FontStyle; 4] = [
        FontStyle::Regular,
        FontStyle::Italic,
        FontStyle::Bold,
        FontStyle::BoldItalic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontStyle::Regular => "Regular",
            FontStyle::Italic => "Italic",
            FontStyle::Bold => "Bold",
            FontStyle::BoldItalic => "BoldItalic",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.as_str() == value)
    }
}

#[derive(Debug, Clone)]
pub struct FontFile {
    pub path: String,
    pub family: String,
    pub style: FontStyle,
    pub bytes: Vec<u8>,
}

impl FontFile {
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Family and style of a `theme/<Family>-<Style>.{otf,ttf}` path.
pub fn parse_font_path(path: &str) -> Option<(String, FontStyle)> {
    let caps = FONT_PATH.captures(path)?;
    let style = FontStyle::parse(&caps["style"])?;
    Some((caps["family"].to_string(), style))
}

/// Family name from a declared font name such as `theme/Open Sans-Bold.ttf`:
/// path, extension, style suffix and whitespace removed.
pub fn family_from_declared(name: &str) -> Option<String> {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    let base = FontStyle::ALL
        .iter()
        .find_map(|style| stem.strip_suffix(&format!("-{}", style.as_str())))
        .unwrap_or(stem);
    let family: String = base.chars().filter(|c| !c.is_whitespace()).collect();
    (!family.is_empty()).then_some(family)
}

#[derive(Debug, Clone)]
pub enum FontUpload {
    Stored {
        font: FontFile,
        blob: StoredBlob,
    },
    Failed {
        /// Key the upload was attempted under, if it got that far.
        storage_key: Option<String>,
        warning: ImportWarning,
    },
}

/// Uploads font files concurrently, at most `concurrency` at a time, each
/// bounded by `timeout`. Failures are reported per file and never retried.
pub struct FontPool {
    storage: Arc<dyn ObjectStorage>,
    concurrency: usize,
    timeout: Duration,
}

impl FontPool {
    pub fn new(storage: Arc<dyn ObjectStorage>, config: &ImportConfig) -> Self {
        Self {
            storage,
            concurrency: config.font_concurrency.max(1),
            timeout: config.font_timeout,
        }
    }

    /// Results are returned in input order.
    pub async fn upload(&self, organisation_id: i32, fonts: Vec<FontFile>) -> Vec<FontUpload> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(fonts.len());

        for mut font in fonts {
            let blob = StoredBlob::new(organisation_id, KIND_FONT, font.file_name(), &font.bytes);
            let bytes = std::mem::take(&mut font.bytes);
            let path = font.path.clone();
            let storage = self.storage.clone();
            let sem = semaphore.clone();
            let timeout = self.timeout;

            handles.push((
                path,
                tokio::spawn(async move {
                    let _permit = match sem.acquire().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            return FontUpload::Failed {
                                storage_key: None,
                                warning: ImportWarning::FontExtractionFailed {
                                    file: font.path,
                                    reason: e.to_string(),
                                },
                            }
                        }
                    };

                    debug!(file = %font.path, key = %blob.storage_key, "Uploading font");
                    let outcome =
                        tokio::time::timeout(timeout, storage.put(&blob.storage_key, bytes)).await;
                    let reason = match outcome {
                        Ok(Ok(())) => return FontUpload::Stored { font, blob },
                        Ok(Err(e)) => e.to_string(),
                        Err(_) => format!("timed out after {:?}", timeout),
                    };
                    FontUpload::Failed {
                        storage_key: Some(blob.storage_key),
                        warning: ImportWarning::FontExtractionFailed {
                            file: font.path,
                            reason,
                        },
                    }
                }),
            ));
        }

        let mut uploads = Vec::with_capacity(handles.len());
        for (path, handle) in handles {
            match handle.await {
                Ok(upload) => uploads.push(upload),
                Err(e) => uploads.push(FontUpload::Failed {
                    storage_key: None,
                    warning: ImportWarning::FontExtractionFailed {
                        file: path,
                        reason: format!("upload task failed: {}", e),
                    },
                }),
            }
        }
        uploads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{StorageError, StorageResult};
    use crate::storage::MemoryObjectStorage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn font(path: &str) -> FontFile {
        let (family, style) = parse_font_path(path).unwrap();
        FontFile {
            path: path.to_string(),
            family,
            style,
            bytes: vec![0u8; 8],
        }
    }

    #[test]
    fn matches_theme_font_paths() {
        assert_eq!(
            parse_font_path("theme/Inter-BoldItalic.otf"),
            Some(("Inter".to_string(), FontStyle::BoldItalic))
        );
        assert_eq!(
            parse_font_path("theme/Open Sans-Regular.ttf"),
            Some(("Open Sans".to_string(), FontStyle::Regular))
        );
        assert_eq!(parse_font_path("theme/Inter-Light.ttf"), None);
        assert_eq!(parse_font_path("theme/Inter-Regular.woff"), None);
        assert_eq!(parse_font_path("theme/sub/Inter-Regular.ttf"), None);
        assert_eq!(parse_font_path("layout/Inter-Regular.ttf"), None);
    }

    #[test]
    fn family_strips_path_extension_style_and_whitespace() {
        assert_eq!(
            family_from_declared("theme/Inter-Regular.ttf").as_deref(),
            Some("Inter")
        );
        assert_eq!(
            family_from_declared("Open Sans-BoldItalic.otf").as_deref(),
            Some("OpenSans")
        );
        assert_eq!(family_from_declared(" Lora ").as_deref(), Some("Lora"));
        assert_eq!(family_from_declared("   "), None);
    }

    #[tokio::test]
    async fn uploads_all_fonts_in_order() {
        let storage = Arc::new(MemoryObjectStorage::default());
        let pool = FontPool::new(storage.clone(), &ImportConfig::default());

        let uploads = pool
            .upload(
                3,
                vec![font("theme/Inter-Regular.ttf"), font("theme/Inter-Bold.ttf")],
            )
            .await;

        let paths: Vec<&str> = uploads
            .iter()
            .map(|upload| match upload {
                FontUpload::Stored { font, .. } => font.path.as_str(),
                FontUpload::Failed { .. } => "failed",
            })
            .collect();
        assert_eq!(paths, vec!["theme/Inter-Regular.ttf", "theme/Inter-Bold.ttf"]);
        assert_eq!(storage.len().await, 2);
    }

    /// Fails every upload whose key contains "Bold" and tracks peak concurrency.
    #[derive(Default)]
    struct FlakyStorage {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ObjectStorage for FlakyStorage {
        async fn put(&self, key: &str, _bytes: Vec<u8>) -> StorageResult<()> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if key.contains("Bold") {
                return Err(StorageError::InvalidKey(key.to_string()));
            }
            Ok(())
        }

        async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
            Err(StorageError::NotFound(key.to_string()))
        }

        async fn delete(&self, _key: &str) -> StorageResult<()> {
            Ok(())
        }

        async fn signed_url(&self, key: &str, _ttl: Duration) -> StorageResult<String> {
            Err(StorageError::NotFound(key.to_string()))
        }
    }

    #[tokio::test]
    async fn failures_are_per_file_and_concurrency_is_bounded() {
        let storage = Arc::new(FlakyStorage::default());
        let config = ImportConfig {
            font_concurrency: 2,
            ..ImportConfig::default()
        };
        let pool = FontPool::new(storage.clone(), &config);

        let uploads = pool
            .upload(
                1,
                vec![
                    font("theme/Inter-Regular.ttf"),
                    font("theme/Inter-Bold.ttf"),
                    font("theme/Inter-Italic.ttf"),
                    font("theme/Inter-BoldItalic.ttf"),
                ],
            )
            .await;

        let failed: Vec<String> = uploads
            .iter()
            .filter_map(|upload| match upload {
                FontUpload::Failed {
                    warning: ImportWarning::FontExtractionFailed { file, .. },
                    ..
                } => Some(file.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(failed, vec!["theme/Inter-Bold.ttf", "theme/Inter-BoldItalic.ttf"]);
        assert!(storage.peak.load(Ordering::SeqCst) <= 2);
    }

    struct SlowStorage;

    #[async_trait]
    impl ObjectStorage for SlowStorage {
        async fn put(&self, _key: &str, _bytes: Vec<u8>) -> StorageResult<()> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }

        async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
            Err(StorageError::NotFound(key.to_string()))
        }

        async fn delete(&self, _key: &str) -> StorageResult<()> {
            Ok(())
        }

        async fn signed_url(&self, key: &str, _ttl: Duration) -> StorageResult<String> {
            Err(StorageError::NotFound(key.to_string()))
        }
    }

    #[tokio::test]
    async fn slow_uploads_time_out() {
        let config = ImportConfig {
            font_timeout: Duration::from_millis(20),
            ..ImportConfig::default()
        };
        let pool = FontPool::new(Arc::new(SlowStorage), &config);

        let uploads = pool.upload(1, vec![font("theme/Inter-Regular.ttf")]).await;
        match &uploads[0] {
            FontUpload::Failed {
                storage_key,
                warning: ImportWarning::FontExtractionFailed { reason, .. },
            } => {
                assert!(storage_key.is_some());
                assert_eq!(reason, "timed out after 20ms");
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
