//! History entry type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::payload::{Tier, WebhookPayload};

/// Immutable record of one send attempt.
///
/// Serialized as one JSON object per line. Optional fields are omitted when
/// absent so that lines written by earlier releases (which had no `plugin`)
/// keep parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the attempt finished.
    pub timestamp: DateTime<Utc>,

    /// Plugin name, `$TRMNL_WEBHOOK`, or `(direct)`; absent if no target resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,

    /// Serialized payload size.
    pub size_bytes: usize,

    /// Tier the payload was validated against.
    pub tier: Tier,

    /// The payload itself.
    pub payload: WebhookPayload,

    /// Whether the webhook accepted the payload.
    pub success: bool,

    /// HTTP status, if a response was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Response body text, if a response was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    /// Human-readable failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Wall-clock duration of the attempt.
    pub duration_ms: u64,
}
