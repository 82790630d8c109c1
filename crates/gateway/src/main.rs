//! Pager: GitHub webhook driven on-call escalation.

use std::sync::Arc;
use std::time::Duration;

use database::Database;
use github_client::{GitHubClient, IssueCommenter};
use module_core::{Dispatcher, ModuleRegistry};
use oncall::OnCallModule;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gateway::{AppState, Config};

/// How long shutdown waits for in-flight module handlers.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        addr = %config.addr,
        database = %config.database_url,
        repositories = config.enabled_repositories.len(),
        sweep_interval = ?config.sweep_interval,
        escalation_threshold = ?config.escalation_threshold,
        "Starting Pager"
    );

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // GitHub client; a bad token is logged, comments will fail until fixed
    let github = GitHubClient::new(config.github())?;
    if let Err(e) = github.verify().await {
        warn!("GitHub credential check failed: {}", e);
    }
    let commenter: Arc<dyn IssueCommenter> = Arc::new(github);

    // Register and start modules
    let registry = Arc::new(ModuleRegistry::new());
    registry.register(Arc::new(OnCallModule::new(config.oncall(), db.clone(), commenter)));
    registry.initialize_all().await?;

    let dispatcher = Dispatcher::new(registry.clone());
    let state = AppState::new(db.clone(), dispatcher.clone(), config.webhook_secret.as_bytes());
    let app = gateway::app(state);

    // Start server
    info!(addr = %config.addr, "Pager listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop modules, then let running handlers finish
    info!("Shutting down");
    let failures = registry.shutdown_all().await;
    if !failures.is_empty() {
        warn!(count = failures.len(), "Some modules did not shut down cleanly");
    }
    dispatcher.drain(DRAIN_TIMEOUT).await;
    db.close().await;

    info!("Pager stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
