//! warden CLI - container replica auditor

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use warden_config::{config_true_value, WardenConfig};
use warden_telemetry::{init_logging, LogConfig, LogLevel};

mod commands;

#[derive(Parser)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "WARDEN_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding one subdirectory per device
    #[arg(long, global = true)]
    devices: Option<PathBuf>,

    /// Skip devices that are not mount points (true/false, yes/no, on/off)
    #[arg(long, global = true, value_parser = parse_flag)]
    mount_check: Option<bool>,

    /// Minimum seconds between the starts of two passes
    #[arg(long, global = true)]
    interval: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit replicas continuously until stopped
    Run,
    /// Audit the first replica found and exit
    Once,
}

fn parse_flag(value: &str) -> std::result::Result<bool, String> {
    Ok(config_true_value(value))
}

/// Assemble configuration: defaults < file < environment < flags
fn load_config(cli: &Cli) -> Result<WardenConfig> {
    let mut config = match &cli.config {
        Some(path) => WardenConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => WardenConfig::default(),
    };
    config.apply_env_overrides()?;

    if let Some(devices) = &cli.devices {
        config.auditor.devices = devices.clone();
    }
    if let Some(mount_check) = cli.mount_check {
        config.auditor.mount_check = mount_check;
    }
    if let Some(interval) = cli.interval {
        config.auditor.interval = interval;
    }
    if let Some(level) = LogLevel::from_verbosity(cli.verbose) {
        config.logging.level = level.to_string();
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn log_config(config: &WardenConfig) -> Result<LogConfig> {
    let logging = &config.logging;
    Ok(LogConfig::from_settings(
        &logging.level,
        &logging.format,
        &logging.output,
        logging.file.as_deref(),
    )?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_logging(&log_config(&config)?)?;

    match cli.command {
        Commands::Run => commands::run::execute(config.auditor).await,
        Commands::Once => commands::once::execute(config.auditor),
    }
}
