/// Main application entry point
/// Proper dependency injection and graceful shutdown
use bbbank_api::{
    server::http::{AppState, HttpServer},
    services::TransactionService,
    store::StoreFactory,
    telemetry::create_telemetry_sink,
    Config,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize logging subsystem from `RUST_LOG` (a `.env` file is honoured)
pub fn initialize_logging() {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();
}

/// Load and validate configuration
pub fn load_config() -> anyhow::Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

/// Initialize ledger, services and telemetry
pub fn initialize_services(config: &Config) -> anyhow::Result<AppState> {
    let ledger = StoreFactory::create_ledger_store(config.ledger_seed_path.as_deref())?;
    info!(
        seed = ?config.ledger_seed_path,
        "Ledger store initialized"
    );

    let transaction_service = Arc::new(TransactionService::new(ledger));
    let telemetry = create_telemetry_sink(config.telemetry_enabled);

    info!(
        telemetry_enabled = config.telemetry_enabled,
        "Services initialized"
    );

    Ok(AppState::new(transaction_service, telemetry))
}

/// Start HTTP server with graceful shutdown
pub async fn start_server(config: &Config, app_state: AppState) -> anyhow::Result<()> {
    let server = HttpServer::new(
        config.server_host.clone(),
        config.server_port,
        app_state,
        config.http_timeout_seconds,
        config.http_max_concurrency,
        config.rate_limit_rps,
        config.rate_limit_burst,
        config.cors_allow_origins.clone(),
    )?;

    server.start().await
}

/// Load configuration, wire services and serve until shutdown
pub async fn bootstrap() -> anyhow::Result<()> {
    let config = load_config()?;

    info!(
        host = %config.server_host,
        port = %config.server_port,
        log_level = %config.log_level,
        "Starting BBBank API"
    );

    let app_state = initialize_services(&config)?;
    start_server(&config, app_state).await
}

/// Log a failed start-up once before handing the error back to `main`
fn log_startup_failure(result: anyhow::Result<()>) -> anyhow::Result<()> {
    if let Err(e) = &result {
        error!("Error Starting BBBank API: {}", e);
    }
    result
}

/// Main application logic (extracted for testing)
pub async fn run_application() -> anyhow::Result<()> {
    initialize_logging();
    log_startup_failure(bootstrap().await)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run_application().await
}
