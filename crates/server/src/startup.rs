use std::net::SocketAddr;

use axum::{extract::Request, Router, ServiceExt};
use common::{env::ensure_env, utils::logging::init_logging_default};
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower::Layer;
use tower_http::{
    cors::CorsLayer,
    normalize_path::{NormalizePath, NormalizePathLayer},
};
use tracing::info;

use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Router wrapped so `/api/services/` and `/api/services` hit the same route.
pub fn build_app(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(routes::build_router(state, build_cors()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl_c");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
}

/// Public entry: load config, migrate, and serve until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_default();

    let cfg = AppConfig::load_or_env()?;
    ensure_env(&cfg.server.data_dir, &cfg.database.url).await?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;
    info!(event = "migrations_applied", "database schema up to date");

    let state = AppState::new(db, cfg.booking.clone())?;
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, event = "listening", "starting booking api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
