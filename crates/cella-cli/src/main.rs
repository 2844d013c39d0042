use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::OutputFormat;

#[derive(Parser)]
#[command(name = "cella")]
#[command(author, version, about = "CLI for Cella secure storage drives", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan for nearby Cella drives
    Scan {
        /// Scan timeout in seconds
        #[arg(short, long, default_value = "10")]
        timeout: u64,

        /// Include all BLE devices, not just Cella drives
        #[arg(long)]
        all: bool,
    },

    /// Display drive identity and lock state
    Info {
        /// Drive name, MAC address, or platform identifier
        device: String,
    },

    /// Read or modify the drive configuration
    Config {
        /// Drive name, MAC address, or platform identifier
        device: String,

        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the full configuration
    Show,

    /// Print the value of a single field
    Get {
        /// Field name (e.g., encryption_level)
        field: String,
    },

    /// Write a new value for a single field
    Set {
        /// Field name (e.g., encryption_level)
        field: String,

        /// New value (unsigned integer)
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Scan { timeout, all } => commands::cmd_scan(timeout, all, cli.format).await,
        Commands::Info { device } => commands::cmd_info(&device, cli.format).await,
        Commands::Config { device, action } => match action {
            ConfigAction::Show => commands::cmd_config_show(&device, cli.format).await,
            ConfigAction::Get { field } => commands::cmd_config_get(&device, &field).await,
            ConfigAction::Set { field, value } => {
                commands::cmd_config_set(&device, &field, &value).await
            }
        },
    }
}
