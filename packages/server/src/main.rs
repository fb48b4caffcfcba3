use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use vidhost_server::config::AppConfig;
use vidhost_server::state::AppState;
use vidhost_server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=info")),
        )
        .init();

    let config = AppConfig::load()?;

    let db = database::init_db(&config.database).await?;
    seed::ensure_indexes(&db).await?;
    if let Some(ref staff) = config.auth.bootstrap_staff {
        seed::ensure_staff_account(&db, staff).await?;
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = build_router(AppState { db, config });

    info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
