use std::time::Duration;

use anyhow::Context;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use url::Url;

use crate::config::DatabaseConfig;
use crate::infra::storage::migrations::Migrator;

// An in-memory SQLite database lives only as long as its connection.
const MEMORY_CONN_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Open the pool described by `cfg`.
///
/// In-memory `SQLite` gets a single long-lived connection so every checkout
/// sees the same database.
///
/// # Errors
/// Returns an error when the database cannot be reached.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(cfg.dsn.clone());
    if cfg.is_memory() {
        opts.max_connections(1)
            .min_connections(1)
            .idle_timeout(MEMORY_CONN_LIFETIME)
            .max_lifetime(MEMORY_CONN_LIFETIME);
    } else {
        opts.max_connections(cfg.max_conns)
            .min_connections(cfg.min_conns);
    }
    opts.acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);

    let dsn = redact_dsn(&cfg.dsn);
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to database '{dsn}'"))?;
    info!(dsn = %dsn, "database connected");
    Ok(db)
}

/// Apply pending schema migrations.
///
/// # Errors
/// Returns an error when a migration fails.
pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
    Migrator::up(db, None)
        .await
        .context("database migration failed")?;
    info!("database migrations applied");
    Ok(())
}

/// Connect and migrate in one step.
///
/// # Errors
/// See [`connect`] and [`migrate`].
pub async fn connect_and_migrate(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let db = connect(cfg).await?;
    migrate(&db).await?;
    Ok(db)
}

/// Mask the password of a DSN for logs.
#[must_use]
pub fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some("***")).is_err() {
                return "<redacted>".to_owned();
            }
            url.to_string()
        }
        _ => dsn.to_owned(),
    }
}
