/// HTTP server implementation with graceful shutdown
/// Clean separation of transport layer from business logic
use crate::server::error::ApiError;
use crate::services::TransactionServiceTrait;
use crate::telemetry::TelemetrySink;
use crate::types::{BalanceReport, TelemetryEvent, UserId};
use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{Method, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Telemetry event recorded after a successful aggregate query
pub const BALANCES_RETURNED_EVENT: &str = "GetLast12MonthBalances Returned";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    transaction_service: Arc<dyn TransactionServiceTrait>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl AppState {
    pub fn new(
        transaction_service: Arc<dyn TransactionServiceTrait>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            transaction_service,
            telemetry,
        }
    }
}

/// Balance routes plus the health check, without middleware
pub fn api_routes() -> Router<AppState> {
    let transaction_routes = Router::new()
        .route("/GetLast12MonthBalances", get(get_last_12_month_balances))
        .route(
            "/GetLast12MonthBalances/:user_id",
            get(get_user_last_12_month_balances),
        );

    Router::new()
        .nest("/api/transaction", transaction_routes)
        .route("/health", get(health_check))
}

/// Requests running past `timeout` are answered with 408
fn request_timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// HTTP server with graceful shutdown
pub struct HttpServer {
    router: Router,
    host: String,
    port: u16,
}

impl HttpServer {
    /// Create new HTTP server with rate limiting and CORS
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        host: String,
        port: u16,
        state: AppState,
        http_timeout_seconds: u64,
        http_max_concurrency: usize,
        rate_limit_rps: u32,
        rate_limit_burst: u32,
        cors_allow_origins: String,
    ) -> anyhow::Result<Self> {
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(SmartIpKeyExtractor)
                .per_second(rate_limit_rps.into())
                .burst_size(rate_limit_burst)
                .finish()
                .ok_or_else(|| anyhow::anyhow!("Failed to build rate limiter config"))?,
        );

        // Comma-separated origin list or "*"
        let cors = if cors_allow_origins.trim() == "*" {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET])
                .allow_headers(Any)
        } else {
            let origins_vec: Vec<_> = cors_allow_origins
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| s.parse())
                .collect::<Result<Vec<axum::http::HeaderValue>, _>>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin value: {}", e))?;
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins_vec))
                .allow_methods([Method::GET])
                .allow_headers(Any)
        };

        let router = api_routes()
            .layer(DefaultBodyLimit::max(64 * 1024))
            .layer(GovernorLayer {
                config: governor_conf,
            })
            .layer(cors)
            .layer(ConcurrencyLimitLayer::new(http_max_concurrency))
            .layer(request_timeout_layer(Duration::from_secs(
                http_timeout_seconds,
            )))
            .layer(SetResponseHeaderLayer::overriding(
                axum::http::header::X_CONTENT_TYPE_OPTIONS,
                axum::http::HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                axum::http::header::X_FRAME_OPTIONS,
                axum::http::HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                axum::http::header::REFERRER_POLICY,
                axum::http::HeaderValue::from_static("no-referrer"),
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Ok(Self { router, host, port })
    }

    /// Bind the configured address and serve until a shutdown signal arrives
    pub async fn start(&self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        info!("Starting HTTP server on {}", addr);

        let listener = tokio::time::timeout(Duration::from_secs(5), TcpListener::bind(&addr))
            .await
            .map_err(|_| anyhow::anyhow!("Timeout waiting to bind to {}", addr))?
            .map_err(|e| anyhow::anyhow!("Failed to bind to address {}: {}", addr, e))?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(local) = listener.local_addr() {
            info!("Server listening on {}", local);
        }

        // Rate limiting keys on the peer address, so connect info is required
        axum::serve(
            listener,
            self.router
                .clone()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        info!("Server shutdown completed");
        Ok(())
    }
}

/// Aggregate balances across every user
async fn get_last_12_month_balances(
    State(state): State<AppState>,
) -> Result<Json<BalanceReport>, ApiError> {
    info!("Executing GetLast12MonthBalances");

    match state
        .transaction_service
        .get_last_12_month_balances(None)
        .await
    {
        Ok(report) => {
            state.telemetry.track_event(
                TelemetryEvent::new(BALANCES_RETURNED_EVENT)
                    .with_property("TotalFiguresReturned", report.figure_count().to_string())
                    .with_property("TotalBalance", report.total_balance.to_string()),
            );
            info!("Executed GetLast12MonthBalances");
            Ok(Json(report))
        }
        Err(e) => {
            error!(error = %e, kind = e.kind(), "Exception Executing GetLast12MonthBalances");
            Err(ApiError::from(e))
        }
    }
}

/// Balances for a single user; the id is passed through unvalidated
async fn get_user_last_12_month_balances(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BalanceReport>, ApiError> {
    let report = state
        .transaction_service
        .get_last_12_month_balances(Some(UserId::new(user_id)))
        .await?;
    Ok(Json(report))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let timestamp = chrono::Utc::now().to_rfc3339();

    let health_result = tokio::time::timeout(
        Duration::from_secs(5),
        state.transaction_service.health_check(),
    )
    .await;

    match health_result {
        Ok(Ok(())) => Json(json!({
            "status": "healthy",
            "timestamp": timestamp,
            "details": { "ledger_status": "healthy" }
        })),
        Ok(Err(e)) => Json(json!({
            "status": "degraded",
            "timestamp": timestamp,
            "error": e.to_string(),
            "details": { "ledger_status": "unhealthy" }
        })),
        Err(_) => Json(json!({
            "status": "degraded",
            "timestamp": timestamp,
            "error": "Health check timed out",
            "details": { "ledger_status": "timeout" }
        })),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install signal handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
