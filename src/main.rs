use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use translate_relay::config::ServiceConfig;
use translate_relay::routes;
use translate_relay::state::AppState;
use translate_relay::translator::GoogleTranslator;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Configuration errors are fatal here, before anything binds.
    let config = ServiceConfig::from_env()?;

    let default_filter = if config.debug {
        "translate_relay=debug,tower_http=debug"
    } else {
        "translate_relay=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    info!(
        "Loaded configuration for {} (environment: {})",
        config.parent(),
        config.environment.as_deref().unwrap_or("unset")
    );

    let translator = Arc::new(GoogleTranslator::new(&config)?);
    let addr = SocketAddr::from((config.host, config.port));
    let state = AppState::new(config, translator);

    let app = routes::app(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
