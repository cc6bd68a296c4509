//! Detector Service - Main Entry Point
//!
//! An AI-text detection service with chunked inference and model fallback.

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use detector::api::handlers::{self, AppState};
use detector::backends::{Backend, GigacheckBackend, RubertBackend};
use detector::chunker::TextChunker;
use detector::service::DetectionService;
use detector::types::DetectorConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "detector=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = DetectorConfig::from_env();

    info!("Starting Detector Service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        guaranteed = %config.guaranteed_backend,
        preferred = config.preferred_backend.as_deref().unwrap_or("none"),
        "Backend slots configured"
    );

    // Wire up backend slots
    let guaranteed = build_backend(&config.guaranteed_backend, &config)?;
    let preferred = match &config.preferred_backend {
        Some(name) if *name == config.guaranteed_backend => {
            warn!(
                backend = %name,
                "Preferred slot duplicates the guaranteed backend, disabling it"
            );
            None
        }
        Some(name) => Some(build_backend(name, &config)?),
        None => None,
    };

    let chunker = TextChunker::with_bounds(config.min_chunk_words, config.max_chunk_words);
    let service = DetectionService::new(chunker, guaranteed, preferred);

    // The guaranteed backend must come up; a failure here aborts startup.
    service.load().await?;

    let state = Arc::new(AppState {
        service: Arc::new(service),
    });

    // Build HTTP routes
    let app = Router::new()
        // Health checks
        .route("/health", get(handlers::health_check))
        .route("/health/ready", get(handlers::readiness_check))
        // Detection
        .route("/api/v1/detection", post(handlers::detect_text))
        .route(
            "/api/v1/detection/:backend",
            post(handlers::detect_text_with_backend),
        )
        // State
        .with_state(state)
        // Middleware
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            },
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build a backend client for the named slot.
fn build_backend(name: &str, config: &DetectorConfig) -> Result<Arc<dyn Backend>> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    match name {
        "rubert" => Ok(Arc::new(RubertBackend::new(&config.rubert_url, timeout))),
        "gigacheck" => Ok(Arc::new(GigacheckBackend::new(
            &config.gigacheck_url,
            config.gigacheck_threshold,
            timeout,
        ))),
        other => anyhow::bail!("unknown backend name in configuration: {}", other),
    }
}
