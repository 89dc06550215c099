//! Backend entry-point: loads configuration, prepares storage and serves the
//! REST API with its OpenAPI docs.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use learning_backend::config::ServerSettings;
use learning_backend::inbound::http::health::HealthState;
use learning_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use learning_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{ServerConfig, Storage, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;

    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %session.key_fingerprint(),
        "session signing key loaded"
    );

    let mut config = ServerConfig::new(session, bind_addr);
    if let Some(database_url) = settings.database_url() {
        if settings.run_migrations {
            run_migrations(database_url)
                .await
                .map_err(std::io::Error::other)?;
        }
        let pool_size = settings.pool_size().map_err(std::io::Error::other)?;
        let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(pool_size))
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_storage(Storage::Postgres(pool));
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting server");
    create_server(health_state, config)?.await
}
