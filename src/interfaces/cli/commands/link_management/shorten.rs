//! Shorten command

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::{BatchOutcome, ShortenRequest, Shortener, StatsService};
use crate::storage::UrlRecord;

/// Pairs URLs with custom codes by position.
pub fn build_requests(
    urls: Vec<String>,
    validity: Option<f64>,
    codes: Vec<String>,
) -> Result<Vec<ShortenRequest>, CliError> {
    if codes.len() > urls.len() {
        return Err(CliError::ParseError(format!(
            "{} custom codes given for {} URLs",
            codes.len(),
            urls.len()
        )));
    }

    let mut codes = codes.into_iter();
    Ok(urls
        .into_iter()
        .map(|url| ShortenRequest {
            original_url: url,
            validity_minutes: validity,
            custom_shortcode: codes.next(),
        })
        .collect())
}

pub fn shorten_links(
    shortener: &Shortener,
    stats: &StatsService,
    requests: Vec<ShortenRequest>,
) -> Result<(), CliError> {
    let outcome = shortener.shorten_batch(&requests)?;

    for record in outcome.created() {
        print_created(stats, record);
    }

    match outcome {
        BatchOutcome::Completed(created) => {
            println!();
            println!(
                "{} Shortened {} URL(s)",
                "ℹ".bold().blue(),
                created.len().to_string().green()
            );
            Ok(())
        }
        BatchOutcome::Rejected(errors) => {
            for error in &errors {
                println!(
                    "{} URL #{} {}: {}",
                    "✗".bold().red(),
                    error.index + 1,
                    error.field.to_string().yellow(),
                    error.message
                );
            }
            Err(CliError::CommandError(format!(
                "{} input error(s), nothing was shortened",
                errors.len()
            )))
        }
        BatchOutcome::Partial {
            created,
            failed_index,
            error,
        } => {
            println!(
                "{} URL #{} failed: {}",
                "✗".bold().red(),
                failed_index + 1,
                error.format_simple()
            );
            Err(CliError::CommandError(format!(
                "Stopped after {} of {} URL(s)",
                created.len(),
                requests.len()
            )))
        }
    }
}

fn print_created(stats: &StatsService, record: &UrlRecord) {
    println!(
        "{} {} -> {} (expires: {})",
        "✓".bold().green(),
        stats.short_url(&record.shortcode).cyan(),
        record.original_url.blue().underline(),
        record
            .expires_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .yellow()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_matched_by_position() {
        let requests = build_requests(
            vec!["https://a.example".into(), "https://b.example".into()],
            Some(10.0),
            vec!["alpha".into()],
        )
        .unwrap();

        assert_eq!(requests[0].custom_shortcode.as_deref(), Some("alpha"));
        assert_eq!(requests[1].custom_shortcode, None);
        assert!(requests.iter().all(|r| r.validity_minutes == Some(10.0)));
    }

    #[test]
    fn test_more_codes_than_urls_is_an_error() {
        let result = build_requests(
            vec!["https://a.example".into()],
            None,
            vec!["one1".into(), "two2".into()],
        );
        assert!(matches!(result, Err(CliError::ParseError(_))));
    }
}
