//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! CloudShell Gateway Server — thin entry point for the Axum HTTP/WebSocket
//! service.
//!
//! All routing logic lives in `cloudshell_platform::http::create_router`.
//! This binary is responsible only for: CLI parsing, env config loading,
//! database bootstrap, `AppState` wiring, server binding, and graceful
//! shutdown.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cloudshell_platform::database::{
    connect, run_migrations, DeviceRepository, SqliteAdminCredentialStore, SqliteAuditSink, SqliteRevocationStore,
};
use cloudshell_platform::http::{create_router, AppState, Config};

/// CloudShell Gateway Server — boots the browser SSH/SFTP gateway.
#[derive(Parser)]
#[command(
    name = "cloudshell-gateway-server",
    version = env!("CARGO_PKG_VERSION"),
    about = "CloudShell Gateway — browser-based SSH/SFTP access"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP/WebSocket server (default)
    Serve,
    /// Run database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Migrate => migrate().await,
    }
}

async fn serve() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    config.ensure_data_dir()?;

    tracing::info!("cloudshell-gateway-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Port: {}", config.port);
    tracing::info!("Data dir: {}", config.data_dir.display());

    let pool = connect(&config.data_dir).await?;
    run_migrations(&pool).await?;

    let admin_credentials = Arc::new(SqliteAdminCredentialStore::new(pool.clone()));
    let revocations = Arc::new(SqliteRevocationStore::new(pool.clone()));
    let audit = Arc::new(SqliteAuditSink::new(pool.clone()));

    // Touch the device repository so its migration-dependent table exists
    // before the router starts serving requests.
    let _devices = DeviceRepository::new(pool.clone());

    let state = AppState::new(pool, config.clone(), admin_credentials, revocations, audit);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!("Listening on 0.0.0.0:{}", config.port);

    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("Server shut down cleanly");
    Ok(())
}

async fn migrate() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = Config::from_env()?;
    config.ensure_data_dir()?;

    let pool = connect(&config.data_dir).await?;
    run_migrations(&pool).await?;
    tracing::info!("Migrations complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
