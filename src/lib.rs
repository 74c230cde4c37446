/// BBBank balance API library
/// Clean public API: ledger store, balance service, telemetry and HTTP layer
use std::path::PathBuf;

pub mod server;
pub mod services;
pub mod store;
pub mod telemetry;
pub mod types;

// Re-export key types for public API
pub use store::{InMemoryLedgerStore, LedgerStore, StoreFactory};
pub use types::{Account, BalanceReport, TelemetryEvent, Transaction, UserId};

/// Library configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub log_level: String,
    // HTTP and rate limiting config
    pub http_timeout_seconds: u64,
    pub http_max_concurrency: usize,
    pub rate_limit_rps: u32,
    pub rate_limit_burst: u32,
    pub cors_allow_origins: String,
    // Ledger and telemetry
    pub ledger_seed_path: Option<PathBuf>,
    pub telemetry_enabled: bool,
}

impl Config {
    /// Create a new Config instance (for testing)
    pub fn new(server_host: String, server_port: u16, log_level: String) -> Self {
        Self {
            server_host,
            server_port,
            log_level,
            http_timeout_seconds: 15,
            http_max_concurrency: 100,
            rate_limit_rps: 10,
            rate_limit_burst: 20,
            cors_allow_origins: "*".to_string(),
            ledger_seed_path: None,
            telemetry_enabled: true,
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let server_host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = std::env::var("SERVER_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid SERVER_PORT value"))?;

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let http_timeout_seconds = std::env::var("HTTP_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(15);

        let http_max_concurrency = std::env::var("HTTP_MAX_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(100);

        let rate_limit_rps = std::env::var("RATE_LIMIT_RPS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let rate_limit_burst = std::env::var("RATE_LIMIT_BURST")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(20);

        let cors_allow_origins =
            std::env::var("CORS_ALLOW_ORIGINS").unwrap_or_else(|_| "*".to_string());

        let ledger_seed_path = std::env::var("LEDGER_SEED_PATH")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let telemetry_enabled = match std::env::var("TELEMETRY_ENABLED") {
            Ok(v) => v
                .trim()
                .parse::<bool>()
                .map_err(|_| anyhow::anyhow!("TELEMETRY_ENABLED must be true or false"))?,
            Err(_) => true,
        };

        Ok(Self {
            server_host,
            server_port,
            log_level,
            http_timeout_seconds,
            http_max_concurrency,
            rate_limit_rps,
            rate_limit_burst,
            cors_allow_origins,
            ledger_seed_path,
            telemetry_enabled,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server_host.trim().is_empty() {
            return Err(anyhow::anyhow!("Server host cannot be empty"));
        }

        if self.server_port == 0 {
            return Err(anyhow::anyhow!("Server port must be greater than 0"));
        }

        // HTTP configs
        if self.http_timeout_seconds == 0 || self.http_timeout_seconds > 300 {
            return Err(anyhow::anyhow!(
                "HTTP timeout must be between 1 and 300 seconds"
            ));
        }
        if self.http_max_concurrency == 0 || self.http_max_concurrency > 10_000 {
            return Err(anyhow::anyhow!(
                "HTTP max concurrency must be between 1 and 10000"
            ));
        }
        if self.rate_limit_rps == 0 || self.rate_limit_rps > 10_000 {
            return Err(anyhow::anyhow!(
                "RATE_LIMIT_RPS must be between 1 and 10000"
            ));
        }
        if self.rate_limit_burst == 0 || self.rate_limit_burst > 10_000 {
            return Err(anyhow::anyhow!(
                "RATE_LIMIT_BURST must be between 1 and 10000"
            ));
        }

        if self.cors_allow_origins.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "CORS_ALLOW_ORIGINS cannot be empty (use * or CSV list)"
            ));
        }

        if let Some(path) = &self.ledger_seed_path {
            if !path.is_file() {
                return Err(anyhow::anyhow!(
                    "LEDGER_SEED_PATH does not point to a file: {}",
                    path.display()
                ));
            }
        }

        Ok(())
    }
}
