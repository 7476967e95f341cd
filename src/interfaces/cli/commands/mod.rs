//! CLI command implementations
//!
//! This module re-exports all CLI command functions.

pub mod config_management;
mod link_management;
mod logs;
mod stats;

pub use link_management::*;
pub use logs::show_logs;
pub use stats::show_stats;
