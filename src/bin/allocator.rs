//! Contiguous allocator shell
//!
//! Interactive (or scripted) front end over a simulated address space

use anyhow::Context;
use clap::Parser;
use contigalloc::{AllocatorConfig, ContiguousAllocator, Dispatcher};
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "allocator")]
#[command(about = "Contiguous memory allocation simulator (first, best and worst fit)")]
struct Args {
    /// Size of the address space (overrides the config file) [default: 1024]
    capacity: Option<u64>,

    /// TOML config file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Read commands from a file instead of standard input
    #[arg(short = 's', long)]
    script: Option<PathBuf>,

    /// Print STAT output as JSON
    #[arg(long)]
    json: bool,

    /// Never print the prompt, even on a terminal
    #[arg(short = 'q', long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AllocatorConfig::load(path)
            .with_context(|| format!("failed to load config {:?}", path))?,
        None => AllocatorConfig::default(),
    };
    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    if args.json {
        config.json_status = true;
    }
    config.validate_config()?;

    info!(
        "Starting allocator: capacity={}, json_status={}",
        config.capacity, config.json_status
    );

    let allocator = ContiguousAllocator::new(config.capacity)?;
    let mut dispatcher = Dispatcher::new(allocator).with_json_status(config.json_status);
    let stdout = io::stdout().lock();

    match &args.script {
        Some(path) => {
            info!("Running script {:?}", path);
            let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
            dispatcher.run(BufReader::new(file), stdout, None)?;
        }
        None => {
            let stdin = io::stdin();
            let prompt = (!args.quiet && stdin.is_terminal()).then_some(config.prompt.as_str());
            dispatcher.run(stdin.lock(), stdout, prompt)?;
        }
    }

    Ok(())
}
