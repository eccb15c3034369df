use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::{info, log::LevelFilter};

use crate::common::{retry, retry_with_backoff, RetryConfig};
use core_config::database::DatabaseConfig;

/// Connect to PostgreSQL with pool settings suited to a small service
pub async fn connect(database_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(max_connections)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    let db = Database::connect(opt).await?;
    info!("Connected to PostgreSQL");
    Ok(db)
}

/// Connect using a [`DatabaseConfig`]
pub async fn connect_from_config(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    connect(&config.url, config.max_connections).await
}

/// Connect with automatic retry on failure
///
/// Uses exponential backoff to smooth over transient network issues
/// during startup.
pub async fn connect_with_retry(
    database_url: &str,
    max_connections: u32,
    retry_config: Option<RetryConfig>,
) -> Result<DatabaseConnection, DbErr> {
    match retry_config {
        Some(config) => {
            retry_with_backoff(|| connect(database_url, max_connections), config).await
        }
        None => retry(|| connect(database_url, max_connections)).await,
    }
}

/// Connect from config with automatic retry on failure
pub async fn connect_from_config_with_retry(
    config: &DatabaseConfig,
    retry_config: Option<RetryConfig>,
) -> Result<DatabaseConnection, DbErr> {
    connect_with_retry(&config.url, config.max_connections, retry_config).await
}
