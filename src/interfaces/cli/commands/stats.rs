//! Statistics command

use colored::Colorize;
use serde::Serialize;

use crate::interfaces::cli::CliError;
use crate::services::{CodeClicks, LinkStats, LinkStatus, StatsService};
use crate::storage::ClickEvent;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReport {
    links: Vec<LinkStats>,
    click_analytics: Vec<CodeClicks>,
}

pub fn show_stats(
    stats: &StatsService,
    shortcode: Option<String>,
    as_json: bool,
) -> Result<(), CliError> {
    let report = match shortcode {
        Some(code) => {
            let links: Vec<LinkStats> = stats.for_code(&code).into_iter().collect();
            let click_analytics: Vec<CodeClicks> = stats.clicks_for_code(&code).into_iter().collect();
            // 没有记录但有点击的短码也要能查到
            if links.is_empty() && click_analytics.is_empty() {
                return Err(CliError::CommandError(format!(
                    "Short URL '{}' not found",
                    code
                )));
            }
            StatsReport {
                links,
                click_analytics,
            }
        }
        None => StatsReport {
            links: stats.overview(),
            click_analytics: stats.click_analytics(),
        },
    };

    if as_json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::CommandError(format!("Failed to serialize stats: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    if report.links.is_empty() {
        println!("{} No shortened URLs yet", "ℹ".bold().blue());
    } else {
        println!("{}", "URL statistics:".bold().green());
        for link in &report.links {
            print_link(link);
        }
    }

    if !report.click_analytics.is_empty() {
        println!();
        println!("{}", "Click analytics:".bold().green());
        for entry in &report.click_analytics {
            print_code_clicks(entry);
        }
    }

    Ok(())
}

fn print_link(link: &LinkStats) {
    let status = match link.status {
        LinkStatus::Active => link.status.to_string().green(),
        LinkStatus::Expired => link.status.to_string().red(),
    };

    println!();
    println!(
        "  {} [{}] {} click(s)",
        link.short_url.cyan().bold(),
        status,
        link.click_count.to_string().green()
    );
    println!("    {} {}", "target: ".dimmed(), link.record.original_url.blue().underline());
    println!(
        "    {} {}",
        "created:".dimmed(),
        link.record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "    {} {}",
        "expires:".dimmed(),
        link.record.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    print_clicks(&link.clicks);
}

fn print_code_clicks(entry: &CodeClicks) {
    let label = if entry.registered {
        "".normal()
    } else {
        " (no record)".yellow()
    };

    println!();
    println!(
        "  {}{} {} click(s)",
        entry.shortcode.cyan().bold(),
        label,
        entry.click_count.to_string().green()
    );
    print_clicks(&entry.clicks);
}

fn print_clicks(clicks: &[ClickEvent]) {
    for click in clicks {
        println!(
            "      {} {} {} {}",
            "•".dimmed(),
            click.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            click.source.magenta(),
            click.location.dimmed()
        );
    }
}
