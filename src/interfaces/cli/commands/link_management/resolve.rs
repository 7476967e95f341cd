//! Resolve command

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::RedirectService;

pub fn resolve_link(redirect: &RedirectService, shortcode: &str) -> Result<(), CliError> {
    let resolution = redirect.resolve(shortcode)?;

    if resolution.click_id.is_none() {
        eprintln!("{} Click could not be recorded", "⚠".bold().yellow());
    }

    // 只输出目标地址，便于脚本使用
    println!("{}", resolution.target);
    Ok(())
}
