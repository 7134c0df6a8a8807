use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://hunts.db?mode=rwc";

pub async fn connect_to_memory_database() -> Result<DatabaseConnection, DbErr> {
    connect_to("sqlite::memory:").await
}

/// Open a connection with foreign keys enforced, so deleting a hunt cascades
/// to its checkpoints and their conditions.
pub async fn connect_to(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;
    db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
    Ok(db)
}

pub async fn connect_and_migrate_to(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    let db = connect_to(database_url)
        .await
        .with_context(|| format!("Failed to connect to {}", database_url))?;
    Migrator::up(&db, None)
        .await
        .context("Failed to run migrations")?;
    info!("Database ready at {}", database_url);
    Ok(db)
}
