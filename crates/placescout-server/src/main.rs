mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState, ResolveDefaults};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = placescout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = placescout_db::PoolConfig::from_app_config(&config);
    let pool = placescout_db::connect_pool(&config.database_url, pool_config).await?;
    placescout_db::run_migrations(&pool).await?;

    let places = match config.places_api_key.as_deref() {
        Some(key) => Some(Arc::new(placescout_places::PlacesClient::new(
            key,
            config.places_request_timeout_secs,
        )?)),
        None => {
            tracing::warn!(
                "GOOGLE_PLACES_API_KEY not set; the external source will report ConfigurationMissing"
            );
            None
        }
    };

    let state = AppState {
        pool,
        places,
        defaults: ResolveDefaults {
            radius_meters: config.default_radius_meters,
            max_results: config.default_max_results,
        },
    };
    let app = build_app(state, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
