//! payfix-api - HTTP service for the payments exception desk
//!
//! Serves the exception queue, correct-and-resubmit workflow, audit trail,
//! and dashboard statistics. `payfix-api seed` queues the demo exceptions
//! and exits.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use payfix_api::{build_router, AppState};
use payfix_common::auth::load_token_secret;
use payfix_common::config::{database_path, resolve_root_folder, ServiceConfig, ROOT_FOLDER_ENV};
use payfix_common::db::{init_database, seed_sample_exceptions};
use sqlx::SqlitePool;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for payfix-api
#[derive(Parser, Debug)]
#[command(name = "payfix-api")]
#[command(about = "HTTP service for the payments exception desk")]
#[command(version)]
struct Args {
    /// Configuration file (default: platform config dir)
    #[arg(short, long, env = "PAYFIX_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder holding payfix.db (also PAYFIX_ROOT_FOLDER)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PAYFIX_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "PAYFIX_BIND")]
    bind: Option<String>,

    /// Token signing secret (generated and stored in the database when unset)
    #[arg(long, env = "PAYFIX_TOKEN_SECRET", hide_env_values = true)]
    token_secret: Option<String>,

    /// Require a bearer token on data routes
    #[arg(long, env = "PAYFIX_REQUIRE_AUTH")]
    require_auth: Option<bool>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Queue the demo exceptions and exit
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payfix_api=info,payfix_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting PayFix API (payfix-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let mut config =
        ServiceConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(secret) = args.token_secret.filter(|s| !s.is_empty()) {
        config.token_secret = Some(secret);
    }
    if let Some(require_auth) = args.require_auth {
        config.require_auth = require_auth;
    }

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV, &config);
    let db_path = database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(pool, config).await,
        Command::Seed => {
            let inserted = seed_sample_exceptions(&pool, Utc::now())
                .await
                .context("Failed to seed sample exceptions")?;
            println!("Seeded {} sample exceptions", inserted);
            Ok(())
        }
    }
}

async fn serve(pool: SqlitePool, config: ServiceConfig) -> Result<()> {
    let token_secret = match config.token_secret.clone() {
        Some(secret) => secret,
        None => load_token_secret(&pool)
            .await
            .context("Failed to load token secret")?,
    };

    if config.require_auth {
        info!("✓ Bearer token authentication enabled");
    } else {
        warn!("API authentication disabled (require_auth = false)");
    }

    let state = AppState::from_config(pool, token_secret, &config);
    let app = build_router(state);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("payfix-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
