//! pdv-cloud server binary
//!
//! - Serves the tenant, auth and super-admin HTTP API
//! - Optionally runs the expiration sweep on a fixed interval

use std::time::Duration;

use pdv_cloud::{AppState, BoxError, Config, api, lifecycle};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdv_cloud=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting pdv-cloud (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    if config.sweep_interval_secs > 0 {
        let sweep_state = state.clone();
        let period = Duration::from_secs(config.sweep_interval_secs);
        tracing::info!(period_secs = config.sweep_interval_secs, "Expiration sweep enabled");
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if let Err(e) = lifecycle::sweep::run(&sweep_state.pool, sweep_state.now()).await {
                    tracing::error!("Expiration sweep failed: {e}");
                }
            }
        });
    }

    let app = api::build_app(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("pdv-cloud HTTP listening on {http_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
