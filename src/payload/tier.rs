//! Payload size tiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::defaults;

/// Payload size class of a TRMNL account.
///
/// The tier bounds the serialized size of every webhook payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Free accounts: 2 KB payloads.
    #[default]
    Free,
    /// TRMNL+ accounts: 5 KB payloads.
    Plus,
}

impl Tier {
    /// Maximum serialized payload size in bytes.
    #[must_use]
    pub const fn limit_bytes(self) -> usize {
        match self {
            Self::Free => defaults::FREE_LIMIT_BYTES,
            Self::Plus => defaults::PLUS_LIMIT_BYTES,
        }
    }

    /// Lowercase name as stored in the config file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Plus => "plus",
        }
    }

    /// Short human description of the limit, e.g. `2 KB (2,048 bytes)`.
    #[must_use]
    pub const fn limit_label(self) -> &'static str {
        match self {
            Self::Free => "2 KB (2,048 bytes)",
            Self::Plus => "5 KB (5,120 bytes)",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown tier name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid tier '{0}': expected free or plus")]
pub struct ParseTierError(pub String);

impl FromStr for Tier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "plus" => Ok(Self::Plus),
            _ => Err(ParseTierError(s.to_string())),
        }
    }
}
