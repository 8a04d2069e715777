//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::market_data_from_settings;
use crate::domain::command_parser;
use crate::domain::error::InvestiqError;
use crate::domain::evaluator;
use crate::domain::settings::load_provider_settings;

#[derive(Parser, Debug)]
#[command(name = "investiq", about = "Conditional stock command backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web server
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Parse a command without fetching any price
    Parse {
        /// e.g. "buy AAPL if price goes below 150"
        query: String,
    },
    /// Parse a command and check it against the current price
    Evaluate {
        query: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Install the tracing subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Serve { config } => run_serve(config.as_ref()),
        Command::Parse { query } => run_parse(&query),
        Command::Evaluate { query, config } => run_evaluate(&query, config.as_ref()),
    }
}

/// Load the INI file at `path`, or an empty configuration when none is given.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, InvestiqError> {
    match path {
        None => Ok(FileConfigAdapter::empty()),
        Some(path) => {
            FileConfigAdapter::from_file(path).map_err(|e| InvestiqError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    }
}

fn report(err: &InvestiqError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn new_runtime() -> Result<tokio::runtime::Runtime, InvestiqError> {
    tokio::runtime::Runtime::new().map_err(InvestiqError::from)
}

fn run_parse(query: &str) -> ExitCode {
    match command_parser::parse(query) {
        Ok(intent) => {
            println!("{}", intent);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e.display_with_context(&query.to_lowercase()));
            (&InvestiqError::from(e)).into()
        }
    }
}

fn run_evaluate(query: &str, config_path: Option<&PathBuf>) -> ExitCode {
    let result = load_config(config_path)
        .and_then(|config| load_provider_settings(&config))
        .and_then(|settings| {
            let market = market_data_from_settings(&settings)?;
            Ok((settings, market))
        });
    let (settings, market) = match result {
        Ok(ready) => ready,
        Err(e) => return report(&e),
    };

    let runtime = match new_runtime() {
        Ok(rt) => rt,
        Err(e) => return report(&e),
    };

    match runtime.block_on(evaluator::run_query(
        &*market,
        query,
        &settings.history_period,
    )) {
        Ok(outcome) => {
            println!("{}", outcome.message());
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}", e);
            (&e).into()
        }
    }
}

fn run_serve(config_path: Option<&PathBuf>) -> ExitCode {
    #[cfg(feature = "web")]
    {
        match serve(config_path) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => report(&e),
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}

#[cfg(feature = "web")]
fn serve(config_path: Option<&PathBuf>) -> Result<(), InvestiqError> {
    use crate::adapters::web::{build_router, AppState};
    use crate::domain::settings::load_server_settings;

    if let Some(path) = config_path {
        tracing::info!("loading config from {}", path.display());
    }
    let config = load_config(config_path)?;
    let settings = load_server_settings(&config)?;

    let state = AppState {
        market: market_data_from_settings(&settings.provider)?,
        history_period: settings.provider.history_period.clone(),
    };
    let router = build_router(state, &settings.cors)?;

    new_runtime()?.block_on(async {
        let listener = tokio::net::TcpListener::bind(settings.listen).await?;
        tracing::info!(
            provider = ?settings.provider.kind,
            origin = %settings.cors.allowed_origin,
            "InvestIQ listening on http://{}",
            settings.listen
        );
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok::<(), InvestiqError>(())
    })
}

#[cfg(feature = "web")]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received, stopping");
}
