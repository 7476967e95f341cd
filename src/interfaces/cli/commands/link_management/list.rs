//! List links command

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::{LinkStatus, StatsService};

pub fn list_links(stats: &StatsService) -> Result<(), CliError> {
    let links = stats.overview();

    if links.is_empty() {
        println!(
            "{} No shortened URLs yet. Create some with `pocketlink shorten`",
            "ℹ".bold().blue()
        );
        return Ok(());
    }

    println!("{}", "Short link list:".bold().green());
    println!();
    for link in &links {
        let status = match link.status {
            LinkStatus::Active => link.status.to_string().green(),
            LinkStatus::Expired => link.status.to_string().red(),
        };

        let mut info_parts = vec![
            format!(
                "{} -> {}",
                link.short_url.cyan(),
                link.record.original_url.blue().underline()
            ),
            format!("[{}]", status),
            format!(
                "(expires: {})",
                link.record.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
            )
            .dimmed()
            .yellow()
            .to_string(),
        ];

        if link.click_count > 0 {
            info_parts.push(
                format!("(clicks: {})", link.click_count)
                    .dimmed()
                    .cyan()
                    .to_string(),
            );
        }

        println!("  {}", info_parts.join(" "));
    }
    println!();
    println!(
        "{} Total {} short links",
        "ℹ".bold().blue(),
        links.len().to_string().green()
    );

    Ok(())
}
