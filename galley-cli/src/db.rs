use anyhow::Result;
use clap::Subcommand;
use galley::database::connection::establish_connection;
use galley::database::migrations::Migrator;
use sea_orm_migration::prelude::*;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn migrate_database(database_url: &str, direction: MigrateDirection) -> Result<()> {
    let db = establish_connection(database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Dropping all tables and re-running migrations");
            Migrator::fresh(&db).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
