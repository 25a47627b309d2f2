mod app_state;
mod artifact_store;
mod cache_index;
mod cache_key;
mod chart_cache;
mod config;
mod database;
mod embedded;
mod errors;
mod handlers;
mod models;
mod renderer;
mod store;

use app_state::AppState;
use artifact_store::ArtifactStore;
use axum::{routing::get, Router};
use cache_index::CacheIndex;
use chart_cache::ChartCache;
use config::Config;
use database::init_database;
use embedded::serve_embedded;
use handlers::{center_handler, chart_handler, health_check, regions_handler, station_handler};
use renderer::SvgRenderer;
use std::{net::SocketAddr, sync::Arc};
use store::StationStore;
use tower_http::cors::CorsLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    info!("Initializing database...");
    let pool = init_database(&config.database_file).await?;

    let store = StationStore::new(pool.clone());
    let chart_cache = Arc::new(ChartCache::new(
        ArtifactStore::new(config.cache_dir.clone()),
        CacheIndex::new(pool),
    ));

    // Remise à zéro du cache avant de servir la moindre requête : les
    // graphiques d'une exécution précédente pourraient être périmés.
    info!("Resetting chart cache in {}...", config.cache_dir.display());
    chart_cache.reset_all().await?;

    let state = AppState::new(store, chart_cache, Arc::new(SvgRenderer::new()));

    let app = Router::new()
        .route("/regions", get(regions_handler))
        .route("/center", get(center_handler))
        .route("/station/{id}", get(station_handler))
        .route("/chart/{id}", get(chart_handler))
        .route("/health", get(health_check))
        .with_state(state)
        .fallback(serve_embedded)
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
