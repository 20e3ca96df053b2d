mod handlers;
mod state;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::AppConfig;
use crate::resources::LoadedResources;

pub use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/locations", get(handlers::nearby_locations))
        .route("/api/locations/count", get(handlers::location_count))
        .route("/api/categories", get(handlers::categories))
        .route("/api/reports", post(handlers::submit_report))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, resources: LoadedResources, config: AppConfig) -> std::io::Result<()> {
    let state = Arc::new(AppState {
        locations: resources.records,
        origin: resources.origin,
        config,
    });
    let count = state.locations.len();
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, locations = count, "server listening");
    eprintln!("  Nearby resources API listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
