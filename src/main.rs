mod config;
mod proxy;
mod routes;
mod state;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "portal=info,tower_http=info";

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is normal outside local development.
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .init();

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    let port = config.port;
    tracing::info!(api_url = %config.api_url, site_dir = %config.site_dir.display(), "portal configured");

    let state = match state::AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "http client init failed");
            return ExitCode::FAILURE;
        }
    };

    let app = routes::app(state);
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%port, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%port, "portal listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
