//! One preparer per manifest section. Each turns its section plus the files it
//! references into a persisted entity inside the import transaction.

use std::path::Path;

use sea_orm::{ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter};

use crate::archive::{ArchiveEntry, TemplateArchive};
use crate::config::ImportConfig;
use crate::errors::{ImportExportError, ImportExportResult};
use crate::services::{AssetService, ReferenceTables};

pub mod data_template;
pub mod flow;
pub mod frame;
pub mod layout;
pub mod theme;
pub mod variant;

/// Shared, read-only handles for the preparers of one import.
pub struct PrepareEnv<'a> {
    pub txn: &'a DatabaseTransaction,
    pub assets: &'a AssetService,
    pub references: &'a ReferenceTables,
    pub config: &'a ImportConfig,
    pub frames_root: &'a Path,
}

/// Load an entity by id, requiring it to belong to the organisation.
pub async fn find_owned<E: EntityTrait>(
    env: &PrepareEnv<'_>,
    entity: &'static str,
    id_column: E::Column,
    organisation_column: E::Column,
    id: i32,
    organisation_id: i32,
) -> ImportExportResult<E::Model> {
    E::find()
        .filter(id_column.eq(id))
        .filter(organisation_column.eq(organisation_id))
        .one(env.txn)
        .await?
        .ok_or(ImportExportError::ReferenceNotFound { entity, id })
}

/// The single file with `extension` under `folder/`.
pub fn single_file(
    archive: &TemplateArchive,
    entity: &'static str,
    folder: &str,
    extension: &str,
) -> ImportExportResult<ArchiveEntry> {
    let mut matches: Vec<ArchiveEntry> = archive
        .entries_under(folder)
        .into_iter()
        .filter(|entry| entry.has_extension(extension))
        .collect();
    match matches.len() {
        1 => Ok(matches.remove(0)),
        n => Err(ImportExportError::entity_creation(
            entity,
            format!(
                "expected exactly one .{} file under {}/, found {}",
                extension, folder, n
            ),
        )),
    }
}

/// Insert failures are reported against the entity being created.
pub fn creation_failed(entity: &'static str) -> impl FnOnce(DbErr) -> ImportExportError {
    move |e| ImportExportError::entity_creation(entity, e.to_string())
}

/// JSON column value for an optional object, `{}` when absent.
pub fn json_or_empty(value: Option<&serde_json::Value>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "{}".to_string())
}
