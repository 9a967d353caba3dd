//! Backend entry-point: applies migrations, builds the pool and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use backend::settings::AppSettings;
use ortho_config::OrthoConfig;

use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let database_url = settings.database_url()?;
    let bind_addr = settings.bind_addr()?;

    if settings.skip_migrations {
        info!("skipping migrations");
    } else {
        let applied = run_pending_migrations(database_url)
            .await
            .wrap_err("failed to apply migrations")?;
        info!(applied, "migrations complete");
    }

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size()))
        .await
        .wrap_err("failed to build database pool")?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(bind_addr, pool)
        .with_min_password_length(settings.min_password_length());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("server exited with an error")
}
