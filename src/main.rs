use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};

use bookease::bootstrap::ensure_admin;
use bookease::router::init_router;
use bookease::state::AppState;
use bookease_auth::{KeyPair, TokenService};
use bookease_config::{AdminConfig, CorsConfig, DatabaseConfig, JwtConfig, ServerConfig};
use bookease_core::BcryptHasher;
use bookease_db::{init_db_pool, run_migrations};
use bookease_observability::{init_metrics, init_tracing, metrics_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guards = init_tracing().context("failed to initialise logging")?;
    let metrics_handle = init_metrics().context("failed to install metrics recorder")?;

    let server_config = ServerConfig::from_env();
    let jwt_config = JwtConfig::from_env();
    let database_config =
        DatabaseConfig::from_env().context("DATABASE_URL must be set to start the server")?;

    let keys = Arc::new(KeyPair::load(&jwt_config).context("cannot start without signing keys")?);
    let tokens = Arc::new(
        TokenService::new(keys, &jwt_config).context("invalid JWT token lifetime settings")?,
    );

    let pool = init_db_pool(&database_config)
        .await
        .context("failed to connect to PostgreSQL")?;
    run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    let state = AppState::postgres(
        pool,
        tokens,
        Arc::new(BcryptHasher::default()),
        CorsConfig::from_env(),
    );

    match AdminConfig::from_env() {
        Some(admin) => {
            ensure_admin(state.users.as_ref(), state.hasher.as_ref(), &admin)
                .await
                .context("failed to create admin account")?;
        }
        None => warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set, skipping admin bootstrap"),
    }

    if let Some(handle) = metrics_handle {
        let metrics_listener = tokio::net::TcpListener::bind(server_config.metrics_addr())
            .await
            .context("failed to bind metrics listener")?;
        info!(addr = %server_config.metrics_addr(), "Metrics endpoint listening");
        tokio::spawn(async move {
            if let Err(err) = axum::serve(metrics_listener, metrics_app(handle)).await {
                warn!(error = %err, "Metrics server stopped");
            }
        });
    }

    let app = init_router(state);
    let listener = tokio::net::TcpListener::bind(server_config.addr())
        .await
        .with_context(|| format!("failed to bind {}", server_config.addr()))?;

    info!(addr = %server_config.addr(), "Server running");
    info!("Scalar UI available at /scalar");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
