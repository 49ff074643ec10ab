//! Hermes - strategy execution engine for a desktop trading platform
//!
//! Usage: `hermes --symbol EURUSD --timeframe H1 --strategy guardian`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use uuid::Uuid;

use hermes_runner::{
    RunOutcome, Session, StrategyKind, load_config, load_default_config, normalize_endpoint,
};

#[derive(Parser, Debug)]
#[command(name = "hermes", version, about = "Serve a trading strategy to the platform")]
struct Cli {
    /// Instrument symbol, e.g. EURUSD
    #[arg(long)]
    symbol: String,

    /// Bar timeframe, e.g. H1
    #[arg(long)]
    timeframe: String,

    /// Strategy to run; overrides the config file
    #[arg(long, value_enum)]
    strategy: Option<StrategyKind>,

    /// JSON configuration file; embedded defaults when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Instance id shown in logs; overrides the config file
    #[arg(long)]
    iid: Option<Uuid>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    verbose: LevelFilter,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose)
        .parse_default_env()
        .init();

    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => load_default_config().context("Failed to load embedded config")?,
    };
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    if let Some(iid) = cli.iid {
        config.instance_id = Some(iid);
    }
    config.validate()?;

    let endpoint = normalize_endpoint(&cli.symbol, &cli.timeframe);
    let session = Session::new(config, endpoint);
    log::info!(
        "[{}] {}: {} via {}",
        session.instance_id(),
        session.endpoint(),
        session.config().strategy,
        session.config().transport.path(session.endpoint()).display()
    );

    let transport = session.transport();
    match session.run(&transport)? {
        RunOutcome::Completed { events } => {
            log::info!("[{}] Completed after {} events", session.instance_id(), events)
        }
        RunOutcome::Shutdown { events } => {
            log::info!("[{}] Shut down after {} events", session.instance_id(), events)
        }
    }
    Ok(())
}
