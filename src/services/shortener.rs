//! Batch shortening of up to `max_batch_size` URLs at once.

use std::fmt;
use std::sync::Arc;

use serde_json::json;

use super::registry::CodeRegistry;
use crate::errors::{PocketlinkError, Result};
use crate::logging::EventLog;
use crate::storage::UrlRecord;
use crate::utils::is_valid_short_code;

/// One entry of a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortenRequest {
    pub original_url: String,
    pub validity_minutes: Option<f64>,
    pub custom_shortcode: Option<String>,
}

impl ShortenRequest {
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            ..Self::default()
        }
    }

    pub fn validity(mut self, minutes: f64) -> Self {
        self.validity_minutes = Some(minutes);
        self
    }

    pub fn shortcode(mut self, code: impl Into<String>) -> Self {
        self.custom_shortcode = Some(code.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestField {
    OriginalUrl,
    Validity,
    Shortcode,
}

impl fmt::Display for RequestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OriginalUrl => write!(f, "originalUrl"),
            Self::Validity => write!(f, "validity"),
            Self::Shortcode => write!(f, "shortcode"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub index: usize,
    pub field: RequestField,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}: {}", self.index + 1, self.field, self.message)
    }
}

#[derive(Debug)]
pub enum BatchOutcome {
    /// Pre-validation failed; nothing was created.
    Rejected(Vec<FieldError>),
    /// Every entry was created, in request order.
    Completed(Vec<UrlRecord>),
    /// Creation stopped at `failed_index`. Earlier entries remain created.
    Partial {
        created: Vec<UrlRecord>,
        failed_index: usize,
        error: PocketlinkError,
    },
}

impl BatchOutcome {
    pub fn created(&self) -> &[UrlRecord] {
        match self {
            Self::Rejected(_) => &[],
            Self::Completed(created) | Self::Partial { created, .. } => created,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

pub struct Shortener {
    registry: Arc<CodeRegistry>,
    log: EventLog,
}

impl Shortener {
    pub fn new(registry: Arc<CodeRegistry>, log: EventLog) -> Self {
        Self { registry, log }
    }

    pub fn max_batch_size(&self) -> usize {
        self.registry.config().max_batch_size
    }

    /// Field-level checks for every entry, without touching the store.
    pub fn validate(&self, requests: &[ShortenRequest]) -> Vec<FieldError> {
        let mut errors = Vec::new();

        for (index, request) in requests.iter().enumerate() {
            if request.original_url.trim().is_empty() {
                errors.push(FieldError {
                    index,
                    field: RequestField::OriginalUrl,
                    message: "URL is required".to_string(),
                });
            } else if !self.registry.is_valid_url(&request.original_url) {
                errors.push(FieldError {
                    index,
                    field: RequestField::OriginalUrl,
                    message: "Invalid URL format".to_string(),
                });
            }

            if let Some(minutes) = request.validity_minutes
                && !(minutes.is_finite() && minutes > 0.0)
            {
                errors.push(FieldError {
                    index,
                    field: RequestField::Validity,
                    message: "Validity must be a positive number".to_string(),
                });
            }

            if let Some(code) = request.custom_shortcode.as_deref()
                && !code.is_empty()
                && !is_valid_short_code(code)
            {
                errors.push(FieldError {
                    index,
                    field: RequestField::Shortcode,
                    message: "Shortcode must be at least 4 characters and contain only letters, numbers, hyphens, and underscores".to_string(),
                });
            }
        }

        errors
    }

    /// Validates the whole batch, then creates entries in order until the
    /// first failure.
    pub fn shorten_batch(&self, requests: &[ShortenRequest]) -> Result<BatchOutcome> {
        self.log.info("Attempting to shorten URLs", json!({ "count": requests.len() }));

        if requests.is_empty() {
            return Err(PocketlinkError::validation("At least one URL is required"));
        }
        let max = self.max_batch_size();
        if requests.len() > max {
            self.log.warn(
                "Too many URLs in one batch",
                json!({ "count": requests.len(), "max": max }),
            );
            return Err(PocketlinkError::validation(format!(
                "At most {} URLs can be shortened at once, got {}",
                max,
                requests.len()
            )));
        }

        let field_errors = self.validate(requests);
        if !field_errors.is_empty() {
            self.log.warn(
                "URL shortening failed validation",
                json!({ "errors": field_errors.iter().map(ToString::to_string).collect::<Vec<_>>() }),
            );
            return Ok(BatchOutcome::Rejected(field_errors));
        }

        let mut created = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            match self.registry.create_short_url(
                &request.original_url,
                request.validity_minutes,
                request.custom_shortcode.as_deref(),
            ) {
                Ok(record) => {
                    self.log.info(
                        "URL shortened successfully",
                        json!({ "shortcode": record.shortcode }),
                    );
                    created.push(record);
                }
                Err(error) => {
                    self.log.error(
                        "URL shortening failed",
                        json!({ "index": index, "error": error.to_string() }),
                    );
                    return Ok(BatchOutcome::Partial {
                        created,
                        failed_index: index,
                        error,
                    });
                }
            }
        }

        self.log.info(
            "All URLs shortened successfully",
            json!({ "count": created.len() }),
        );
        Ok(BatchOutcome::Completed(created))
    }
}
