use std::path::Path;

use tracing::info;
use url::Url;

use super::AppContext;
use crate::errors::{ImportExportError, ImportExportResult};
use crate::export::{ExportRequest, TemplateArchiveFile};
use crate::import::{ImportOptions, ImportResult};

impl AppContext {
    pub async fn import_template_archive(
        &self,
        bytes: Vec<u8>,
        organisation_id: i32,
        creator_id: i32,
        options: ImportOptions,
    ) -> ImportExportResult<ImportResult> {
        self.importer
            .import(bytes, organisation_id, creator_id, options)
            .await
    }

    pub async fn import_template_from_path(
        &self,
        path: impl AsRef<Path>,
        organisation_id: i32,
        creator_id: i32,
        options: ImportOptions,
    ) -> ImportExportResult<ImportResult> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        info!(path = %path.display(), size = bytes.len(), "Importing template archive from file");
        self.import_template_archive(bytes, organisation_id, creator_id, options)
            .await
    }

    pub async fn import_template_from_url(
        &self,
        url: &str,
        organisation_id: i32,
        creator_id: i32,
        options: ImportOptions,
    ) -> ImportExportResult<ImportResult> {
        let bytes = self.download(url).await?;
        self.import_template_archive(bytes, organisation_id, creator_id, options)
            .await
    }

    pub async fn export_template_archive(
        &self,
        organisation_id: i32,
        request: ExportRequest,
    ) -> ImportExportResult<TemplateArchiveFile> {
        self.exporter.export(organisation_id, request).await
    }

    async fn download(&self, url: &str) -> ImportExportResult<Vec<u8>> {
        let parsed = Url::parse(url)
            .map_err(|e| ImportExportError::DownloadFailed(format!("Invalid URL {}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ImportExportError::DownloadFailed(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let response = self
            .http
            .get(parsed)
            .timeout(self.config.import.download_timeout)
            .send()
            .await
            .map_err(|e| ImportExportError::DownloadFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| ImportExportError::DownloadFailed(e.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImportExportError::DownloadFailed(e.to_string()))?;

        info!(url, size = bytes.len(), "Downloaded template archive");
        Ok(bytes.to_vec())
    }
}
