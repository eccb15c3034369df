mod api;
mod auth;
mod config;
mod error;
mod openapi;
mod state;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use core_config::tracing::{init_tracing, install_color_eyre};
use domain_engagement::{
    AbsenceEngine, AudienceResolver, EngagementRecipientDirectory, PgDirectoryRepository,
    PgEventsRepository, PgGatheringsRepository, PgVisitorsRepository, TriggerJobs,
};
use domain_notifications::providers::{SmsProvider, SmtpProvider, WhatsAppProvider};
use domain_notifications::{NotificationDispatcher, PgNotificationLogRepository, ProviderRegistry};
use eyre::WrapErr;
use tracing::{info, warn};

use crate::auth::HttpSessionResolver;
use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env().wrap_err("Failed to load configuration")?;
    init_tracing(&config.environment);

    info!(environment = ?config.environment, "Starting kanisa-api");

    let db = database::postgres::connect_from_config_with_retry(&config.database, None)
        .await
        .wrap_err("Failed to connect to database")?;

    // Channels whose credentials are absent stay unregistered; the
    // dispatcher falls back to what is actually available.
    let mut registry = ProviderRegistry::new();
    match WhatsAppProvider::from_env() {
        Ok(provider) => registry.register(Arc::new(provider)),
        Err(e) => warn!(error = %e, "WhatsApp channel disabled"),
    }
    match SmsProvider::from_env() {
        Ok(provider) => registry.register(Arc::new(provider)),
        Err(e) => warn!(error = %e, "SMS channel disabled"),
    }
    match SmtpProvider::from_env() {
        Ok(provider) => registry.register(Arc::new(provider)),
        Err(e) => warn!(error = %e, "Email channel disabled"),
    }
    if registry.is_empty() {
        warn!("No external channels configured, notifications will be in-app only");
    }
    let registry = Arc::new(registry);

    let ledger = Arc::new(PgNotificationLogRepository::new(db.clone()));
    let directory = Arc::new(PgDirectoryRepository::new(db.clone()));
    let events = Arc::new(PgEventsRepository::new(db.clone()));
    let gatherings = Arc::new(PgGatheringsRepository::new(db.clone()));
    let visitors = Arc::new(PgVisitorsRepository::new(db.clone()));

    let recipient_directory = Arc::new(EngagementRecipientDirectory::new(directory.clone()));
    let notifier = Arc::new(NotificationDispatcher::new(
        ledger.clone(),
        recipient_directory,
        registry,
    ));

    let triggers = Arc::new(TriggerJobs::new(
        directory.clone(),
        events,
        gatherings.clone(),
        visitors,
        ledger.clone(),
        notifier.clone(),
    ));
    let absence = Arc::new(AbsenceEngine::new(
        directory.clone(),
        gatherings,
        notifier.clone(),
    ));
    let audience = Arc::new(AudienceResolver::new(directory));
    let sessions = Arc::new(HttpSessionResolver::new(config.auth_service_url.clone()));

    let listen_addr = config.listen_addr();
    let state = AppState {
        config: Arc::new(config),
        db,
        sessions,
        audience,
        notifier,
        ledger,
        triggers,
        absence,
    };

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {listen_addr}"))?;
    info!(addr = %listen_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}
