//! # Shim Differential Runner
//!
//! Compares a pipe-mode shim against a control on seeded inputs.
//!
//! ```text
//! shim-diff --experimental ./precompile-pipe --address 0x02 --iterations 1000
//! shim-diff --experimental ./precompile-pipe --control ./other-shim --address 0x08
//! ```
//!
//! Exits non-zero if any input produced a disagreement.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use shim_client::generator::{DEFAULT_MAX_LEN, DEFAULT_SEED};
use shim_client::runner::DEFAULT_THREADS;
use shim_client::{
    reference_control, Backend, Caller, DiffRunner, InProcess, InputGenerator, ParallelDiff,
};
use shim_core::prelude::*;

/// Differential tester for precompile shims
#[derive(Parser, Debug)]
#[command(name = "shim-diff", version)]
struct Args {
    /// Pipe-mode shim under test
    #[arg(short, long)]
    experimental: PathBuf,

    /// Control: "in-process", "reference", or a path to another shim
    #[arg(short, long, default_value = "in-process")]
    control: String,

    /// Precompile address, decimal or 0x-prefixed hex
    #[arg(short, long, value_parser = parse_address)]
    address: u8,

    /// Number of inputs to try
    #[arg(short = 'n', long, default_value_t = 1000)]
    iterations: u64,

    /// RNG seed; worker N uses seed + N
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Worker threads, each with its own shim processes
    #[arg(short, long, default_value_t = DEFAULT_THREADS)]
    threads: usize,

    /// Share of inputs that are unstructured random bytes (0.0 - 1.0)
    #[arg(long, default_value_t = 0.1)]
    invalid_ratio: f64,

    /// Maximum length of unstructured inputs
    #[arg(long, default_value_t = DEFAULT_MAX_LEN)]
    max_len: usize,

    /// Gas budget for the in-process control
    #[arg(long, default_value_t = DEFAULT_GAS_BUDGET)]
    gas_budget: u64,

    /// Precompile set for the in-process control
    #[arg(long, default_value = "istanbul")]
    fork: Fork,

    /// Report differing error messages, not just success/failure splits
    #[arg(long)]
    verbose_errors: bool,
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address {s:?}: {e}"))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn control_backend(args: &Args) -> Result<Box<dyn Backend>> {
    match args.control.as_str() {
        "in-process" => {
            let config = ShimConfig {
                gas_budget: args.gas_budget,
                fork: args.fork,
            };
            config.validate()?;
            Ok(Box::new(InProcess::new(Dispatcher::from_config(&config))))
        }
        "reference" => match reference_control(args.address) {
            Some(control) => Ok(control),
            None => bail!("no reference control for 0x{:02x}", args.address),
        },
        path => Ok(Box::new(
            Caller::spawn(path).with_context(|| format!("starting control {path}"))?,
        )),
    }
}

/// One worker's runner: its own experimental process, control and generator.
fn worker_runner(args: &Args, worker: usize) -> Result<DiffRunner> {
    let experimental = Caller::spawn(&args.experimental)
        .with_context(|| format!("starting {}", args.experimental.display()))?;
    let control = control_backend(args)?;

    let generator = InputGenerator::new(args.seed.wrapping_add(worker as u64))
        .with_invalid_ratio(args.invalid_ratio)
        .with_max_len(args.max_len);

    Ok(DiffRunner::new(Box::new(experimental), control, generator)
        .with_verbose_errors(args.verbose_errors))
}

fn run(args: &Args) -> Result<bool> {
    let report = ParallelDiff::new(args.threads)
        .run(args.address, args.iterations, |worker| worker_runner(args, worker))?;

    for mismatch in &report.mismatches {
        error!("input {}\n{}", hex::encode(&mismatch.input), mismatch.error);
    }
    info!(
        "{} iterations, {} agreed ok, {} agreed err, {} mismatches",
        report.iterations,
        report.agreed_ok,
        report.agreed_err,
        report.mismatches.len()
    );

    Ok(report.is_clean())
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging();

    if run(&args)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
