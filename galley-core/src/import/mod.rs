//! Template archive import.
//!
//! An import opens the archive, reads and validates the manifest, then runs the
//! section steps in dependency order inside one database transaction:
//!
//! theme → flow → frame → layout → variant → data_template
//!
//! A step whose section is absent and whose id was not supplied is skipped. A
//! supplied id wins over the manifest section and the existing entity is
//! reused. Any failure rolls the whole transaction back and removes the blobs
//! and frame files the import wrote.

use std::path::PathBuf;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{info, instrument, warn};

use crate::archive::TemplateArchive;
use crate::config::ImportConfig;
use crate::database::entities::{content_types, flows, frames, layouts, themes};
use crate::errors::ImportExportResult;
use crate::manifest::{validate, Manifest, Section};
use crate::services::{AssetService, ReferenceTables};

mod context;
pub mod fonts;
pub mod preparers;

pub use crate::manifest::ImportOptions;
pub use context::{ImportContext, ImportResult, Slot};

use preparers::{find_owned, PrepareEnv};

pub struct TemplateImporter {
    db: DatabaseConnection,
    assets: AssetService,
    config: ImportConfig,
    frames_root: PathBuf,
}

impl TemplateImporter {
    pub fn new(
        db: DatabaseConnection,
        assets: AssetService,
        config: ImportConfig,
        frames_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            db,
            assets,
            config,
            frames_root: frames_root.into(),
        }
    }

    #[instrument(skip(self, bytes), fields(archive_size = bytes.len()))]
    pub async fn import(
        &self,
        bytes: Vec<u8>,
        organisation_id: i32,
        creator_id: i32,
        options: ImportOptions,
    ) -> ImportExportResult<ImportResult> {
        let mut archive = TemplateArchive::open(bytes)?;
        let manifest = archive.manifest()?;
        validate(&manifest, archive.entries(), &options)?;
        info!(
            sections = ?manifest.sections().iter().map(Section::as_str).collect::<Vec<_>>(),
            entries = archive.entries().len(),
            "Manifest validated"
        );

        let mut ctx = ImportContext::new(organisation_id, creator_id);
        let txn = self.db.begin().await?;

        let outcome = self
            .run_steps(&txn, &mut archive, &manifest, &options, &mut ctx)
            .await;
        let outcome = match outcome {
            Ok(()) => txn.commit().await.map_err(Into::into),
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        };

        match outcome {
            Ok(()) => {
                let result = ctx.into_result();
                info!(
                    created = result.created_count(),
                    warnings = result.warnings.len(),
                    "Template import committed"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "Template import aborted");
                ctx.cleanup(self.assets.storage().as_ref()).await;
                Err(e)
            }
        }
    }

    async fn run_steps(
        &self,
        txn: &DatabaseTransaction,
        archive: &mut TemplateArchive,
        manifest: &Manifest,
        options: &ImportOptions,
        ctx: &mut ImportContext,
    ) -> ImportExportResult<()> {
        let references = ReferenceTables::load(txn).await?;
        let env = PrepareEnv {
            txn,
            assets: &self.assets,
            references: &references,
            config: &self.config,
            frames_root: &self.frames_root,
        };
        let org = ctx.organisation_id;

        if let Some(id) = options.theme_id {
            let theme = find_owned::<themes::Entity>(
                &env,
                "theme",
                themes::Column::Id,
                themes::Column::OrganisationId,
                id,
                org,
            )
            .await?;
            info!(theme_id = theme.id, "Reusing theme");
            ctx.theme = Slot::Reused(theme);
        } else if let Some(section) = &manifest.theme {
            let theme = preparers::theme::prepare(&env, section, archive, ctx).await?;
            info!(theme_id = theme.id, name = %theme.name, "Created theme");
            ctx.theme = Slot::Created(theme);
        }

        if let Some(id) = options.flow_id {
            let flow = find_owned::<flows::Entity>(
                &env,
                "flow",
                flows::Column::Id,
                flows::Column::OrganisationId,
                id,
                org,
            )
            .await?;
            info!(flow_id = flow.id, "Reusing flow");
            ctx.flow = Slot::Reused(flow);
        } else if let Some(section) = &manifest.flow {
            let flow = preparers::flow::prepare(&env, section, ctx).await?;
            info!(flow_id = flow.id, name = %flow.name, "Created flow");
            ctx.flow = Slot::Created(flow);
        }

        if let Some(id) = options.frame_id {
            let frame = find_owned::<frames::Entity>(
                &env,
                "frame",
                frames::Column::Id,
                frames::Column::OrganisationId,
                id,
                org,
            )
            .await?;
            info!(frame_id = frame.id, "Reusing frame");
            ctx.frame = Slot::Reused(frame);
        } else if let Some(section) = &manifest.frame {
            let frame = preparers::frame::prepare(&env, section, archive, ctx).await?;
            info!(frame_id = frame.id, name = %frame.name, "Created frame");
            ctx.frame = Slot::Created(frame);
        }

        if let Some(id) = options.layout_id {
            let layout = find_owned::<layouts::Entity>(
                &env,
                "layout",
                layouts::Column::Id,
                layouts::Column::OrganisationId,
                id,
                org,
            )
            .await?;
            info!(layout_id = layout.id, "Reusing layout");
            ctx.layout = Slot::Reused(layout);
        } else if let Some(section) = &manifest.layout {
            let layout = preparers::layout::prepare(&env, section, archive, ctx).await?;
            info!(layout_id = layout.id, name = %layout.name, "Created layout");
            ctx.layout = Slot::Created(layout);
        }

        if let Some(id) = options.content_type_id {
            let content_type = find_owned::<content_types::Entity>(
                &env,
                "variant",
                content_types::Column::Id,
                content_types::Column::OrganisationId,
                id,
                org,
            )
            .await?;
            info!(content_type_id = content_type.id, "Reusing variant");
            ctx.content_type = Slot::Reused(content_type);
        } else if let Some(section) = &manifest.variant {
            let content_type = preparers::variant::prepare(&env, section, ctx).await?;
            info!(content_type_id = content_type.id, name = %content_type.name, "Created variant");
            ctx.content_type = Slot::Created(content_type);
        }

        if let Some(section) = &manifest.data_template {
            let template = preparers::data_template::prepare(&env, section, archive, ctx).await?;
            info!(data_template_id = template.id, title = %template.title, "Created data template");
            ctx.data_template = Slot::Created(template);
        }

        Ok(())
    }
}
