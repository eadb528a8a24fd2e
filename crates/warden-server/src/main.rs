//! Warden Server — Application entry point.
//!
//! Connects to SurrealDB, applies pending migrations, and logs
//! readiness. The HTTP surface that exposes the engine and the
//! assignment service is wired by the embedding deployment.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use warden_db::{DbConfig, DbManager};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("warden=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting Warden server...");

    let config = DbConfig::from_env();
    let manager = match DbManager::connect(&config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to SurrealDB");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = warden_db::run_migrations(manager.client()).await {
        tracing::error!(error = %e, "Failed to apply migrations");
        return ExitCode::FAILURE;
    }

    tracing::info!("Warden ready");
    ExitCode::SUCCESS
}
