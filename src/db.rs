use migration::Migrator;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;

use crate::error::Result;

/// Opens the store database, applies pragmas and brings the schema up to
/// date. WAL keeps readers unblocked while a write transaction commits.
pub async fn connect_and_migrate(database_url: &str) -> Result<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    apply_pragmas(&db).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// In-memory store for tests and ephemeral embedders. The pool is pinned to
/// a single connection; every sqlite `:memory:` connection is its own
/// database.
pub async fn connect_in_memory() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await?;
    apply_pragmas(&db).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

async fn apply_pragmas(db: &DatabaseConnection) -> Result<()> {
    for pragma in [
        "PRAGMA journal_mode=WAL",
        "PRAGMA synchronous=NORMAL",
        "PRAGMA foreign_keys=ON",
        "PRAGMA busy_timeout=5000",
    ] {
        db.execute(Statement::from_string(db.get_database_backend(), pragma.to_string()))
            .await?;
    }
    Ok(())
}
