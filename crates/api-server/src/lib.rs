//! HTTP surface for the statement screener.
//!
//! `POST /api/analyze` runs the full chain: fetch page → parse yearly figures →
//! derive ratios → detect anomalies → narrative.

pub mod analyze_routes;
pub mod config;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use narrative_client::{narrator_from_config, NarrativeConfig, NarrativeGenerator};
use serde_json::json;
use statement_core::Thresholds;
use statement_scraper::{PageSource, ScraperConfig, StatementFetcher};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::ServerConfig;

const SERVICE_NAME: &str = "fin-screener";

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn PageSource>,
    pub narrator: Arc<dyn NarrativeGenerator>,
    pub thresholds: Thresholds,
}

/// Error returned by handlers
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed: {}", self.message);
        }
        let body = Json(json!({
            "success": false,
            "error": self.message,
        }));
        (self.status, body).into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(analyze_routes::analyze_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Financial statement ratio screener",
        "endpoints": ["/health", "/api/analyze"],
    }))
}

pub fn init_tracing(json_logging: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    init_tracing(config.json_logging);

    let thresholds = Thresholds::from_env()?;
    let fetcher = StatementFetcher::new(ScraperConfig::from_env()?)?;
    let narrator = narrator_from_config(&NarrativeConfig::from_env()?)?;

    tracing::info!("Starting {} (narrative backend: {})", SERVICE_NAME, narrator.backend_name());
    tracing::info!(
        "  Fetch: timeout {}s, {} retries, {}s delay",
        fetcher.config().timeout.as_secs(),
        fetcher.config().max_retries,
        fetcher.config().retry_delay.as_secs()
    );
    tracing::info!("  Thresholds: {:?}", thresholds);

    let state = AppState {
        source: Arc::new(fetcher),
        narrator,
        thresholds,
    };
    let app = build_router(state);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
