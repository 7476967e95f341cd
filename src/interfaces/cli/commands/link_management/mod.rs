//! Link management commands
//!
//! This module provides CLI commands for creating, resolving and listing
//! short links.

mod list;
mod resolve;
mod shorten;

pub use list::list_links;
pub use resolve::resolve_link;
pub use shorten::{build_requests, shorten_links};
