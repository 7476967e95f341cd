//! CLI interface module
//!
//! This module provides command-line interface functionality for pocketlink.

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};
use crate::errors::PocketlinkError;
use crate::runtime::StartupContext;
use commands::{
    build_requests, config_management, list_links, resolve_link, show_logs, show_stats,
    shorten_links,
};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<PocketlinkError> for CliError {
    fn from(err: PocketlinkError) -> Self {
        match err {
            PocketlinkError::StoreFailure(_) | PocketlinkError::FileOperation(_) => {
                CliError::StorageError(err.format_simple())
            }
            other => CliError::CommandError(other.format_simple()),
        }
    }
}

/// Config subcommands that never touch the record store
pub fn run_config_command(
    config: &crate::config::AppConfig,
    action: ConfigCommands,
) -> Result<(), CliError> {
    match action {
        ConfigCommands::Generate { output_path, force } => {
            config_management::config_generate(output_path, force)
        }
        ConfigCommands::Show => config_management::config_show(config),
    }
}

/// Run a CLI command from clap-parsed input
pub fn run_cli_command(ctx: &StartupContext, cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Shorten {
            urls,
            validity,
            codes,
        } => {
            let requests = build_requests(urls, validity, codes)?;
            shorten_links(&ctx.shortener, &ctx.stats, requests)
        }

        Commands::Resolve { shortcode } => resolve_link(&ctx.redirect, &shortcode),

        Commands::List => list_links(&ctx.stats),

        Commands::Stats { shortcode, json } => show_stats(&ctx.stats, shortcode, json),

        Commands::Logs { limit, clear } => show_logs(&ctx.log_mirror, limit, clear),

        Commands::Config { action } => run_config_command(&ctx.config, action),
    }
}
