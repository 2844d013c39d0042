//! Command implementations for the Cella CLI.

use clap::ValueEnum;

mod config;
mod info;
mod scan;

pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use info::cmd_info;
pub use scan::cmd_scan;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// JSON, one document per command.
    Json,
}
