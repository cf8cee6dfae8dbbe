//! Payload size and content validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::body::is_blank;
use super::{Tier, WebhookPayload};

/// Usage percentage above which a payload close to the limit is flagged.
const NEAR_LIMIT_PERCENT: f64 = 90.0;

/// Outcome of validating a payload against a tier.
///
/// Errors block sending; warnings are informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when `errors` is empty.
    pub valid: bool,
    /// UTF-8 size of the compact JSON serialization.
    pub size_bytes: usize,
    /// Tier the payload was checked against.
    pub tier: Tier,
    /// Size limit of `tier`.
    pub limit_bytes: usize,
    /// `limit_bytes - size_bytes`; negative when over the limit.
    pub remaining_bytes: i64,
    /// Share of the limit used, rounded to one decimal place.
    pub percent_used: f64,
    /// Non-blocking findings.
    pub warnings: Vec<String>,
    /// Blocking findings.
    pub errors: Vec<String>,
}

/// Validates a payload against the size limit of `tier`.
///
/// Size is measured on the compact JSON text of the payload, not on the raw
/// input. The HTML checks are substring heuristics, not parsing.
#[must_use]
pub fn validate(payload: &WebhookPayload, tier: Tier) -> ValidationResult {
    let size_bytes = payload.to_json().len();
    let limit_bytes = tier.limit_bytes();
    let percent_used = percent_of(size_bytes, limit_bytes);

    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    if size_bytes > limit_bytes {
        errors.push(format!(
            "Payload exceeds {tier} tier limit: {size_bytes} bytes > {limit_bytes} bytes"
        ));
    } else if percent_used > NEAR_LIMIT_PERCENT {
        warnings.push(format!("Payload is at {percent_used}% of {tier} tier limit"));
    }

    if payload.merge_variables().is_none() {
        errors.push("Missing merge_variables object".to_string());
    } else if is_blank(payload.variable("content")) && is_blank(payload.variable("text")) {
        warnings.push("No content or text field in merge_variables".to_string());
    }

    if let Some(content) = payload.content() {
        check_markup(content, &mut warnings);
    }

    ValidationResult {
        valid: errors.is_empty(),
        size_bytes,
        tier,
        limit_bytes,
        remaining_bytes: signed(limit_bytes) - signed(size_bytes),
        percent_used,
        warnings,
        errors,
    }
}

fn check_markup(content: &str, warnings: &mut Vec<String>) {
    let open = content.matches("<div").count();
    let close = content.matches("</div>").count();
    if open != close {
        warnings.push(format!(
            "Potential unclosed divs: {open} open, {close} close"
        ));
    }

    if !content.contains(r#"class="layout""#) && !content.contains("class='layout'") {
        warnings.push("Missing .layout class - TRMNL requires a root layout element".to_string());
    }
}

#[allow(clippy::cast_precision_loss)] // payload sizes are far below 2^52
fn percent_of(size: usize, limit: usize) -> f64 {
    (size as f64 / limit as f64 * 1000.0).round() / 10.0
}

fn signed(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[allow(clippy::cast_precision_loss)]
fn kilobytes(bytes: usize) -> f64 {
    bytes as f64 / 1024.0
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.valid { '✓' } else { '✗' };
        writeln!(
            f,
            "{status} Payload: {} bytes ({:.2} KB)",
            self.size_bytes,
            kilobytes(self.size_bytes)
        )?;
        writeln!(
            f,
            "  Tier: {} (limit: {:.2} KB)",
            self.tier,
            kilobytes(self.limit_bytes)
        )?;
        write!(
            f,
            "  Used: {}% ({} bytes remaining)",
            self.percent_used, self.remaining_bytes
        )?;

        if !self.errors.is_empty() {
            write!(f, "\n\nErrors:")?;
            for error in &self.errors {
                write!(f, "\n  ✗ {error}")?;
            }
        }

        if !self.warnings.is_empty() {
            write!(f, "\n\nWarnings:")?;
            for warning in &self.warnings {
                write!(f, "\n  ⚠ {warning}")?;
            }
        }

        Ok(())
    }
}
