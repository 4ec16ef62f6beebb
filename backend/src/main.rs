//! Backend entry point: reads configuration and starts the HTTP server.

use actix_web::web;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use foodflow_backend::inbound::http::health::HealthState;
use foodflow_backend::server::{create_server, AppConfig};

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

    let config = AppConfig::from_env().map_err(|err| std::io::Error::other(err.to_string()))?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).await?;
    server.await
}
