//! # Precompile Pipe Shim
//!
//! Serves precompile calls over stdin/stdout until stdin ends.
//!
//! ## Startup Sequence
//!
//! 1. Refuse to run on an interactive terminal
//! 2. Initialize logging (stderr; stdout carries frames only)
//! 3. Load configuration (file, environment, flags)
//! 4. Build the registry for the selected fork
//! 5. Serve until input is exhausted

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shim_core::prelude::*;

/// Pipe-mode EVM precompile shim
#[derive(Parser, Debug)]
#[command(name = "precompile-pipe", version)]
#[command(about = "Runs EVM precompiles for length-prefixed requests on stdin")]
struct Args {
    /// JSON config file (`gas_budget`, `fork`)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gas budget for every call (overrides config and environment)
    #[arg(short, long)]
    gas_budget: Option<u64>,

    /// Precompile set: homestead, byzantium, istanbul, berlin, cancun
    #[arg(short, long)]
    fork: Option<Fork>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<ShimConfig> {
    let mut config = ShimConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(gas_budget) = args.gas_budget {
        config.gas_budget = gas_budget;
    }
    if let Some(fork) = args.fork {
        config.fork = fork;
    }
    config.validate().context("validating configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if io::stdin().is_terminal() {
        eprintln!("Piped only");
        return Ok(());
    }

    init_logging();

    let config = load_config(&args)?;
    let dispatcher = Dispatcher::from_config(&config);
    info!(
        "Fork {} with precompiles {:02x?}, gas budget {}",
        config.fork,
        dispatcher.registry().addresses(),
        config.gas_budget
    );

    let mut server = PipeServer::new(&dispatcher);
    server
        .serve(&mut io::stdin().lock(), &mut io::stdout().lock())
        .context("writing response")?;

    Ok(())
}
