//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// pocketlink - a local URL shortener
#[derive(Parser, Debug)]
#[command(name = "pocketlink")]
#[command(version)]
#[command(about = "Shorten URLs into a local record store and resolve them later", long_about = None)]
pub struct Cli {
    /// Configuration file (default: pocketlink.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    /// Override the record store file path
    #[arg(long, global = true)]
    pub store: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Shorten one or more URLs (up to the configured batch size)
    ///
    /// Usage: shorten <URL>... [--validity MINUTES] [--code CODE]...
    /// - Custom codes are matched to URLs by position
    /// - URLs without a custom code get a generated one
    Shorten {
        /// URLs to shorten
        #[arg(required = true, num_args = 1..)]
        urls: Vec<String>,

        /// Validity in minutes, applied to every URL (default: 30)
        #[arg(long, short = 'v')]
        validity: Option<f64>,

        /// Custom short code, repeatable; matched to URLs by position
        #[arg(long = "code", short = 'k')]
        codes: Vec<String>,
    },

    /// Resolve a short code to its original URL and record a click
    Resolve {
        /// Short code to resolve
        shortcode: String,
    },

    /// List all short links
    List,

    /// Show click statistics
    Stats {
        /// Only this short code
        shortcode: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or clear mirrored log entries
    Logs {
        /// Show only the newest N entries
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Remove all mirrored entries
        #[arg(long)]
        clear: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: pocketlink.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}
