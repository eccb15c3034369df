//! PostgreSQL database connector and helpers

mod connector;
mod health;

pub use connector::{connect, connect_from_config, connect_from_config_with_retry, connect_with_retry};
pub use health::check_health;

// Re-export SeaORM types for convenience
pub use sea_orm::{ConnectOptions, DatabaseConnection, DbErr};
