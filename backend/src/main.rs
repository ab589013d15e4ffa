//! StoryScape backend entry point.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, ServerSettings, create_server};
use storyscape::inbound::http::health::HealthState;
use storyscape::inbound::http::session_config::{BuildMode, session_settings_from_env};
use storyscape::outbound::persistence::{DbPool, PoolConfig, run_migrations};

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(err) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %err, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|err| startup_error("failed to load settings", err))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|err| startup_error("invalid session settings", err))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| startup_error("invalid settings", err))?;
    let max_image_bytes = settings
        .max_image_bytes()
        .map_err(|err| startup_error("invalid settings", err))?;
    let cloudinary = settings
        .cloudinary()
        .map_err(|err| startup_error("invalid settings", err))?;

    let mut config = ServerConfig::new(session, bind_addr)
        .with_max_image_bytes(max_image_bytes)
        .with_cloudinary(cloudinary);

    if let Some(url) = settings.database_url() {
        run_migrations(url)
            .await
            .map_err(|err| startup_error("database migrations failed", err))?;
        let pool = DbPool::new(PoolConfig::new(url))
            .await
            .map_err(|err| startup_error("database pool setup failed", err))?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "storyscape listening");
    server.await
}
