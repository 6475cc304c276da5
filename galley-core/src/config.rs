use std::path::PathBuf;
use std::time::Duration;

/// Knobs for a single template import. Defaults match the production limits.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Maximum number of font files stored concurrently.
    pub font_concurrency: usize,
    /// Timeout applied to each font upload.
    pub font_timeout: Duration,
    /// Upper bound on name-collision retries before giving up.
    pub max_name_attempts: usize,
    /// Timeout for fetching an archive by URL.
    pub download_timeout: Duration,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            font_concurrency: 4,
            font_timeout: Duration::from_secs(60),
            max_name_attempts: 1_000,
            download_timeout: Duration::from_secs(60),
        }
    }
}

impl ImportConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            font_concurrency: env_parse("GALLEY_FONT_CONCURRENCY")
                .filter(|value: &usize| *value > 0)
                .unwrap_or(defaults.font_concurrency),
            font_timeout: env_parse("GALLEY_FONT_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.font_timeout),
            max_name_attempts: env_parse("GALLEY_MAX_NAME_ATTEMPTS")
                .filter(|value: &usize| *value > 0)
                .unwrap_or(defaults.max_name_attempts),
            download_timeout: env_parse("GALLEY_DOWNLOAD_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.download_timeout),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GalleyConfig {
    pub database_url: String,
    /// Root directory for the local object storage adapter.
    pub storage_root: PathBuf,
    /// Root directory that receives per-organisation frame templates.
    pub frames_root: PathBuf,
    /// Secret mixed into signed storage URLs.
    pub signing_secret: String,
    pub import: ImportConfig,
}

impl Default for GalleyConfig {
    fn default() -> Self {
        Self {
            database_url: crate::database::connection::get_database_url(None),
            storage_root: PathBuf::from("storage"),
            frames_root: PathBuf::from("frames"),
            signing_secret: "galley-dev-secret".to_string(),
            import: ImportConfig::default(),
        }
    }
}

impl GalleyConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: std::env::var("GALLEY_DATABASE_URL").unwrap_or(defaults.database_url),
            storage_root: std::env::var("GALLEY_STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_root),
            frames_root: std::env::var("GALLEY_FRAMES_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.frames_root),
            signing_secret: std::env::var("GALLEY_SIGNING_SECRET")
                .unwrap_or(defaults.signing_secret),
            import: ImportConfig::from_env(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|raw| raw.trim().parse().ok())
}
