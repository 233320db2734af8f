mod api;
mod middleware;

use std::sync::Arc;

use mpulse_scraper::NewsClient;
use mpulse_sentiment::{Scorer, Summarizer};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = mpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = mpulse_db::PoolConfig::from_app_config(&config);
    let pool = mpulse_db::connect_pool(&config.database_url, pool_config).await?;
    mpulse_db::run_migrations(&pool).await?;

    let scorer = Scorer::from_app_config(&config)?;
    tracing::info!(scorer = scorer.name(), "sentiment backend ready");

    let state = AppState {
        pool,
        news: Arc::new(NewsClient::from_app_config(&config)?),
        scorer: Arc::new(scorer),
        summarizer: Arc::new(Summarizer::from_app_config(&config)?),
    };

    let auth = AuthState::from_env(matches!(config.env, mpulse_core::Environment::Development))?;
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
