//! Kotori webhook bot service.
//!
//! Main entry point for the Kotori server. Wires the credential cache,
//! platform client, and object store into the HTTP server and runs it
//! until a shutdown signal arrives.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use kotori_api::{AppState, Config, CredentialCache, HttpSecretStore};
use kotori_line::client::LineClient;
use kotori_store::HttpObjectStore;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with structured logging
    init_tracing();

    info!("Starting Kotori webhook bot service");

    let config = Config::load()?;
    let addr = config.parse_server_addr()?;
    info!(
        server_addr = %addr,
        secret_store_url = %config.secret_store_url,
        secret_name = %config.secret_name,
        storage_url = %config.storage_url,
        storage_bucket = %config.storage_bucket,
        "Configuration loaded"
    );

    // Credentials are fetched lazily: the cache stays cold until the first
    // signed request needs them.
    let secret_store =
        HttpSecretStore::new(&config.secret_store_url).context("Failed to build secret store")?;
    let credentials = Arc::new(CredentialCache::new(Arc::new(secret_store), &config.secret_name));

    let messaging =
        LineClient::new(config.to_line_config()).context("Failed to build platform client")?;
    let store = HttpObjectStore::new(&config.storage_url, &config.storage_bucket)
        .context("Failed to build object store")?;

    let state = AppState::new(credentials, Arc::new(messaging), Arc::new(store));

    info!(addr = %addr, "Kotori is ready to receive webhooks");

    kotori_api::start_server(state, addr, Duration::from_secs(config.request_timeout))
        .await
        .context("Server failed")?;

    info!("Kotori shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,kotori=debug,tower_http=debug"))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
