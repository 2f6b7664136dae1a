use std::net::SocketAddr;

use axum::Router;
use configs::{AppConfig, StorageConfig};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;
use service::city::{CityService, JsonFileCityRepository};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the cities file named by the storage config and wire the service.
pub async fn build_state(storage: &StorageConfig) -> Result<ServerState, StartupError> {
    let path = storage.cities_path();
    let repo = JsonFileCityRepository::new(&path, storage.pretty).await?;
    info!(path = %repo.path().display(), uniqueness = ?storage.update_uniqueness, "city store ready");
    let cities = CityService::new(repo).with_uniqueness(storage.update_uniqueness);
    Ok(ServerState::new(cities))
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let raw = cfg.server.bind_addr();
    raw.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address {raw:?}: {e}")))
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    common::env::ensure_env(&cfg.storage.data_dir).await?;

    let state = build_state(&cfg.storage).await?;
    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting city api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
