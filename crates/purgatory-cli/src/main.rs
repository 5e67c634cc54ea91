//! Purgatory CLI: reserve sessions, log attempts, and read them back.

mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use purgatory_config::{CliOverrides, PurgatoryConfig};
use purgatory_session::{EngineSettings, FileBackend, SessionEngine, SessionError, SessionStore};
use purgatory_types::SessionId;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "purgatory",
    version,
    about = "Capture and replay spammer password attempts"
)]
struct Cli {
    /// Directory holding session files (overrides PURGATORY_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Minutes after the first attempt during which attempts are recorded
    #[arg(long, global = true)]
    window_minutes: Option<u32>,

    /// Enable verbose/debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reserve a new session and print its key
    Create {
        /// API key that must match the configured one
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Record one attempt against a reserved session
    Log {
        kv_key: String,
        #[arg(long, default_value = "")]
        criteria: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Show a session's attempts
    Get {
        kv_key: String,
        /// Print the raw attempt history as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = PurgatoryConfig::load(CliOverrides {
        window_minutes: cli.window_minutes,
        data_dir: cli.data_dir,
    })
    .context("Failed to load configuration")?;

    let engine = build_engine(&config).await?;

    match cli.command {
        Command::Create { api_key } => create(&engine, api_key.as_deref()).await,
        Command::Log {
            kv_key,
            criteria,
            password,
        } => log(&engine, SessionId::from(kv_key), criteria, password).await,
        Command::Get { kv_key, json } => get(&engine, SessionId::from(kv_key), json).await,
    }
}

async fn build_engine(config: &PurgatoryConfig) -> Result<SessionEngine> {
    let backend = FileBackend::new(config.data_dir.clone())
        .await
        .with_context(|| format!("Failed to open {}", config.data_dir.display()))?;
    let notifier = purgatory_notify::build_sink(&config.notification)
        .context("Failed to set up notifications")?;

    let mut settings = EngineSettings::default()
        .with_api_key(config.api_key.clone())
        .with_window_minutes(config.window_minutes)
        .with_page_metadata(config.page_metadata);
    if let Some(notifier) = notifier {
        settings = settings.with_notifier(notifier);
    }
    tracing::debug!("Engine settings: {settings:?}");

    Ok(SessionEngine::new(
        SessionStore::new(Arc::new(backend)),
        settings,
    ))
}

async fn create(engine: &SessionEngine, api_key: Option<&str>) -> Result<ExitCode> {
    if let Err(e) = engine.authorize(api_key) {
        eprintln!("{e}");
        return Ok(ExitCode::FAILURE);
    }
    let id = engine.reserve_session().await?;
    println!("{}", serde_json::json!({ "kvKey": id }));
    Ok(ExitCode::SUCCESS)
}

async fn log(
    engine: &SessionEngine,
    id: SessionId,
    criteria: String,
    password: String,
) -> Result<ExitCode> {
    match engine.append_attempt(&id, criteria, password).await {
        Ok(outcome) => {
            if !outcome.accepted {
                tracing::info!("Session {id} is frozen; attempt was not recorded");
            }
            println!("{}", serde_json::to_string(&outcome.history)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => not_found_or_err(e),
    }
}

async fn get(engine: &SessionEngine, id: SessionId, json: bool) -> Result<ExitCode> {
    match engine.read_session(&id).await {
        Ok(view) if json => {
            println!("{}", serde_json::to_string(&view.history)?);
            Ok(ExitCode::SUCCESS)
        }
        Ok(view) => {
            print!("{}", report::render(&view));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_not_found() && !json => {
            println!("{}", report::NOT_FOUND);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => not_found_or_err(e),
    }
}

/// Print the not-found JSON body, or propagate anything else.
fn not_found_or_err(e: SessionError) -> Result<ExitCode> {
    match e.not_found_body() {
        Some(body) => {
            println!("{}", serde_json::to_string(&body)?);
            Ok(ExitCode::FAILURE)
        }
        None => Err(e.into()),
    }
}
