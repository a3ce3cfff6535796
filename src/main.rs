//! Solospace - Gives fullscreen windows a workspace of their own
//!
//! Replays scenario files (a starting desktop plus a list of window
//! operations) against the placement engine and prints what it did.
//!
//! # Features
//! - Fullscreen and (optionally) maximized windows are moved to a free
//!   workspace, which is slid next to their old one
//! - The arrangement is undone on unmaximize, unfullscreen, minimize and close
//! - Primary-only and per-monitor workspace topologies
//! - TOML configuration and scenarios, text or JSON reports

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod scenario;

use scenario::Scenario;
use solospace_core::config::Config;

/// Solospace - A workspace of their own for fullscreen windows
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Run in debug mode with verbose logging
    #[arg(short, long)]
    debug: bool,

    /// Validate configuration (and scenario, if given) and exit
    #[arg(long)]
    validate: bool,

    /// Print default configuration to stdout
    #[arg(long)]
    print_default_config: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Scenario file to replay
    scenario: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; reports go to stdout, logs to stderr
    let log_level = if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Solospace v{} starting...", env!("CARGO_PKG_VERSION"));

    // Handle special commands
    if args.print_default_config {
        println!("{}", Config::default_config_string());
        return Ok(());
    }

    // Load configuration
    let config = match Config::load(args.config.as_deref()) {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        },
        Err(e) if args.validate => return Err(e),
        Err(e) => {
            warn!("Failed to load config: {:#}, using defaults", e);
            Config::default()
        },
    };

    let Some(path) = args.scenario else {
        if args.validate {
            info!("Configuration is valid");
            return Ok(());
        }
        anyhow::bail!("No scenario given (see --help)");
    };

    let scenario = Scenario::load(&path)?;
    if args.validate {
        info!("Configuration and scenario are valid");
        return Ok(());
    }

    let report = scenario::replay(&scenario, config)?;
    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        println!("{json}");
    } else {
        print!("{}", report.to_text());
    }

    Ok(())
}
