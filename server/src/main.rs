//! Resource Access Server - Main Entry Point

use anyhow::Result;
use std::net::SocketAddr;
use tracing::info;

use lc_server::{
    api, config,
    principals::{Directory, DirectorySeed},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lc_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting resource access server"
    );

    // Load the principal directory
    let directory = match config.directory_seed_path.as_deref() {
        Some(path) => {
            let seed = DirectorySeed::from_file(path)?;
            info!(
                path,
                users = seed.users.len(),
                groups = seed.groups.len(),
                "Directory seed loaded"
            );
            Directory::from_seed(seed)
        }
        None => {
            tracing::warn!("DIRECTORY_SEED_PATH not set, starting with an empty directory");
            Directory::new()
        }
    };

    let bind_address = config.bind_address.clone();

    // Build application state
    let state = api::AppState::new(config, directory);

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    info!("Server shutdown complete");

    Ok(())
}
