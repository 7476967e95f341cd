//! Mirrored log command

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::logging::{LogEntry, LogLevel, StoreMirrorSink};

pub fn show_logs(mirror: &StoreMirrorSink, limit: Option<usize>, clear: bool) -> Result<(), CliError> {
    if clear {
        mirror.clear()?;
        println!("{} Cleared mirrored logs", "✓".bold().green());
        return Ok(());
    }

    let entries = mirror.stored_entries();
    let shown = newest(&entries, limit);

    if shown.is_empty() {
        println!("{} No log entries", "ℹ".bold().blue());
        return Ok(());
    }

    for entry in shown {
        let level = match entry.level {
            LogLevel::Info => entry.level.to_string().blue(),
            LogLevel::Warn => entry.level.to_string().yellow(),
            LogLevel::Error => entry.level.to_string().red(),
        };
        println!(
            "{} {:>5} {} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
            level,
            entry.message,
            entry.data.to_string().dimmed()
        );
    }

    Ok(())
}

fn newest(entries: &[LogEntry], limit: Option<usize>) -> &[LogEntry] {
    match limit {
        Some(n) if n < entries.len() => &entries[entries.len() - n..],
        _ => entries,
    }
}
