//! Command-line interface definition for nutrisage
//!
//! This module defines the CLI structure using clap's derive API.
//! The service runs a single webhook server, so the surface is small:
//! config path plus a few startup overrides.

use clap::Parser;

/// nutrisage - Telegram nutrition assistant driven by a tool-calling agent
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "nutrisage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the server bind host
    #[arg(long)]
    pub host: Option<String>,

    /// Override the server bind port
    #[arg(long)]
    pub port: Option<u16>,

    /// Skip registering the webhook URL with Telegram on startup
    ///
    /// Useful for local runs behind an already-registered tunnel.
    #[arg(long)]
    pub no_register_webhook: bool,
}

impl Cli {
    /// Parse CLI arguments from the process environment
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
