use core_config::database::DatabaseConfig;
use core_config::{env_or_default, env_parsed_or, env_required, FromEnv};

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application configuration, composed from shared config components.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub host: String,
    pub port: u16,
    /// Bearer secret the external periodic invoker presents to the
    /// trigger endpoints.
    pub trigger_secret: String,
    /// Token the webhook verification handshake must match.
    pub webhook_verify_token: String,
    /// Base URL of the identity collaborator that resolves sessions.
    pub auth_service_url: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = DatabaseConfig::from_env()?;

        Ok(Self {
            environment,
            database,
            host: env_or_default("HOST", "0.0.0.0"),
            port: env_parsed_or("PORT", 3000)?,
            trigger_secret: env_required("TRIGGER_SHARED_SECRET")?,
            webhook_verify_token: env_required("WEBHOOK_VERIFY_TOKEN")?,
            auth_service_url: env_or_default("AUTH_SERVICE_URL", "http://localhost:4000"),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://localhost/kanisa")),
                ("TRIGGER_SHARED_SECRET", Some("trigger-secret")),
                ("WEBHOOK_VERIFY_TOKEN", Some("verify-token")),
                ("PORT", Some("8080")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.port, 8080);
                assert_eq!(config.trigger_secret, "trigger-secret");
                assert_eq!(config.listen_addr(), "0.0.0.0:8080");
            },
        );
    }

    #[test]
    fn test_missing_trigger_secret_fails() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://localhost/kanisa")),
                ("TRIGGER_SHARED_SECRET", None::<&str>),
                ("WEBHOOK_VERIFY_TOKEN", Some("verify-token")),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
