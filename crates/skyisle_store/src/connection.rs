//! Resolves an [`IsleConfig`] into a live, schema-ready backend connection.

use std::path::Path;
use std::time::Duration;

use log::info;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use skyisle_core::{IsleError, IsleResult};

use crate::migration::Migrator;
use crate::IsleConfig;

/// Opens the configured backend and creates any missing tables.
///
/// No retries: a failure here is fatal to startup and is returned as-is.
pub async fn connect(config: &IsleConfig, base_dir: &Path) -> IsleResult<DatabaseConnection> {
    let url = config.database.connection_url(base_dir)?;
    let mut options = ConnectOptions::new(url);
    options.sqlx_logging(false);
    if let Some(pool) = &config.pool {
        if let Some(max) = pool.max_connections {
            options.max_connections(max);
        }
        if let Some(min) = pool.min_connections {
            options.min_connections(min);
        }
        if let Some(timeout_ms) = pool.connect_timeout_ms {
            options.connect_timeout(Duration::from_millis(timeout_ms));
        }
        if let Some(timeout_ms) = pool.acquire_timeout_ms {
            options.acquire_timeout(Duration::from_millis(timeout_ms));
        }
        if let Some(timeout_ms) = pool.idle_timeout_ms {
            options.idle_timeout(Duration::from_millis(timeout_ms));
        }
    }
    let driver = config.database.driver_name();
    let conn = Database::connect(options)
        .await
        .map_err(|err| IsleError::connectivity(format!("{driver}: {err}")))?;
    Migrator::up(&conn, None)
        .await
        .map_err(|err| IsleError::connectivity(format!("{driver} schema setup: {err}")))?;
    info!("store: connected to {driver} backend");
    Ok(conn)
}
