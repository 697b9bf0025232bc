//! Currex CLI
//!
//! Currency converter with live rates, offline fallback, favorites and
//! historical trends.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use currex_fx::{AppContext, FxConfig, OfflineProvider, SameCurrencyPolicy};
use currex_store::JsonFileStore;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod messages;
mod render;

use commands::{Command, Runner};
use config::Overrides;

/// Currex CLI
#[derive(Parser, Debug)]
#[command(name = "currex")]
#[command(about = "Currency converter with live rates and offline fallback")]
struct Args {
    /// Preferences file (defaults to CURREX_STORE_PATH or the data directory)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Base URL of the rate API
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Rate API timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Same-currency conversions: identity or reject
    #[arg(long, global = true)]
    same_currency: Option<SameCurrencyPolicy>,

    /// Never contact the rate API
    #[arg(long, global = true)]
    offline: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    fn overrides(&self) -> Overrides {
        let trend_days = match &self.command {
            Command::Trend { days, .. } => *days,
            _ => None,
        };
        Overrides {
            api_base: self.api_base.clone(),
            timeout_ms: self.timeout_ms,
            same_currency: self.same_currency,
            trend_days,
        }
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    // Results go to stdout, so logs stay on stderr
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.log_json);

    let config = args.overrides().apply(FxConfig::from_env());
    let store_path = config::store_path(args.store.clone())?;
    debug!(store = %store_path.display(), offline = args.offline, "Starting currex");

    let kv = Arc::new(
        JsonFileStore::open(store_path.clone())
            .with_context(|| format!("failed to open preferences at {}", store_path.display()))?,
    );

    let ctx = if args.offline {
        AppContext::new(config, Arc::new(OfflineProvider), kv.clone())
    } else {
        AppContext::with_live_provider(config, kv.clone())
    }
    .context("failed to initialize")?;

    let runner = Runner::new(&ctx, args.json, kv.path());
    match runner.run(args.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            info!(error = %e, "Command failed");
            eprintln!(
                "{}",
                messages::describe_error(ctx.preferences().language(), &e)
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
