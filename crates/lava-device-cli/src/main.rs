//! LAVA Device - Main entry point
//!
//! Loads a device configuration and prints the values the dispatcher would
//! resolve from it.

mod config;
mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lava_device::DeviceConfig;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "lava-device")]
#[command(about = "Inspect LAVA device configurations")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "lava-device.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the resolved power, reset and connect commands
    Show {
        /// Device file path or hostname
        device: String,
    },
    /// Look up a constant
    Constant {
        /// Device file path or hostname
        device: String,
        /// Constant name
        name: String,
        /// Prefix the constant is scoped under (e.g. a boot method)
        #[arg(short, long)]
        prefix: Option<String>,
        /// Print "-" instead of failing when the constant is missing
        #[arg(long)]
        missing_ok: bool,
    },
    /// Print the loaded configuration with defaults applied
    Dump {
        /// Device file path or hostname
        device: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    debug!("lava-device v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config(&args.config)?;
    let load = |device: &str| -> Result<DeviceConfig> {
        let path = config.device_path(device);
        DeviceConfig::from_path(&path).with_context(|| format!("loading device {}", device))
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Show { device } => {
            report::write_commands(&mut out, &load(&device)?)?;
        }
        Command::Constant {
            device,
            name,
            prefix,
            missing_ok,
        } => {
            report::write_constant(
                &mut out,
                &load(&device)?,
                &name,
                prefix.as_deref(),
                missing_ok,
            )?;
        }
        Command::Dump { device } => {
            write!(out, "{}", load(&device)?.to_yaml()?)?;
        }
    }

    Ok(())
}
