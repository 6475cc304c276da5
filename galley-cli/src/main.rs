mod db;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use galley::database::connection::{establish_connection, get_database_url};
use galley::database::migrations::Migrator;
use galley::export::ExportRequest;
use galley::import::ImportOptions;
use galley::{markdown, AppContext, GalleyConfig};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a template archive into an organisation
    Import {
        /// Path to the archive; omit when using --url
        archive: Option<PathBuf>,
        #[clap(long, conflicts_with = "archive")]
        url: Option<String>,
        #[clap(short, long)]
        organisation: i32,
        #[clap(short, long)]
        creator: i32,
        #[clap(long)]
        theme_id: Option<i32>,
        #[clap(long)]
        layout_id: Option<i32>,
        #[clap(long)]
        flow_id: Option<i32>,
        #[clap(long)]
        frame_id: Option<i32>,
        #[clap(long)]
        content_type_id: Option<i32>,
        #[clap(flatten)]
        env: EnvArgs,
    },
    /// Export entities of an organisation as a template archive
    Export {
        #[clap(short, long)]
        organisation: i32,
        #[clap(long)]
        theme_id: Option<i32>,
        #[clap(long)]
        layout_id: Option<i32>,
        #[clap(long)]
        flow_id: Option<i32>,
        #[clap(long)]
        frame_id: Option<i32>,
        #[clap(long)]
        content_type_id: Option<i32>,
        #[clap(long)]
        data_template_id: Option<i32>,
        /// Output file; defaults to the archive's own name in the working directory
        #[clap(short = 'O', long)]
        output: Option<PathBuf>,
        #[clap(flatten)]
        env: EnvArgs,
    },
    /// Convert a document tree (JSON) to Markdown
    Markdown { input: PathBuf },
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init {
        #[clap(short, long)]
        database: Option<String>,
    },
    Migrate {
        #[clap(subcommand)]
        direction: db::MigrateDirection,
        #[clap(short, long)]
        database: Option<String>,
    },
}

/// Overrides for settings otherwise read from `GALLEY_*` variables.
#[derive(Args, Debug)]
struct EnvArgs {
    #[clap(short, long)]
    database: Option<String>,
    #[clap(long)]
    storage_root: Option<PathBuf>,
    #[clap(long)]
    frames_root: Option<PathBuf>,
}

impl EnvArgs {
    fn into_config(self) -> GalleyConfig {
        let mut config = GalleyConfig::from_env();
        if let Some(database) = self.database {
            config.database_url = get_database_url(Some(&database));
        }
        if let Some(root) = self.storage_root {
            config.storage_root = root;
        }
        if let Some(root) = self.frames_root {
            config.frames_root = root;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Import {
            archive,
            url,
            organisation,
            creator,
            theme_id,
            layout_id,
            flow_id,
            frame_id,
            content_type_id,
            env,
        } => {
            let app = open_context(env.into_config()).await?;
            let options = ImportOptions {
                theme_id,
                layout_id,
                flow_id,
                frame_id,
                content_type_id,
            };

            let result = match (archive, url) {
                (Some(path), None) => {
                    info!("Importing template archive: {}", path.display());
                    app.import_template_from_path(&path, organisation, creator, options)
                        .await?
                }
                (None, Some(url)) => {
                    info!("Importing template archive from {}", url);
                    app.import_template_from_url(&url, organisation, creator, options)
                        .await?
                }
                _ => bail!("Provide either an archive path or --url"),
            };

            info!(
                "Imported {} entities with {} warnings",
                result.created_count(),
                result.warnings.len()
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Export {
            organisation,
            theme_id,
            layout_id,
            flow_id,
            frame_id,
            content_type_id,
            data_template_id,
            output,
            env,
        } => {
            let app = open_context(env.into_config()).await?;
            let request = ExportRequest {
                theme_id,
                layout_id,
                flow_id,
                frame_id,
                content_type_id,
                data_template_id,
            };

            let archive = app.export_template_archive(organisation, request).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(&archive.filename));
            tokio::fs::write(&path, &archive.bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} ({} bytes)", path.display(), archive.bytes.len());
        }
        Commands::Markdown { input } => {
            let bytes = tokio::fs::read(&input)
                .await
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let tree = markdown::parse_tree(&bytes)?;
            println!("{}", markdown::to_markdown(&tree)?);
        }
        Commands::Db { command } => match command {
            DbCommands::Init { database } => {
                let url = database_url(database);
                info!("Initializing database: {}", url);
                db::migrate_database(&url, db::MigrateDirection::Up).await?;
            }
            DbCommands::Migrate {
                direction,
                database,
            } => {
                info!("Running database migration: {:?}", direction);
                db::migrate_database(&database_url(database), direction).await?;
            }
        },
    }

    Ok(())
}

fn database_url(database: Option<String>) -> String {
    match database {
        Some(path) => get_database_url(Some(&path)),
        None => GalleyConfig::from_env().database_url,
    }
}

async fn open_context(config: GalleyConfig) -> Result<AppContext> {
    let db = establish_connection(&config.database_url).await?;
    Migrator::up(&db, None).await?;
    info!("Database migrations completed");
    Ok(AppContext::new(db, config))
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .without_time()
        .init();
}
