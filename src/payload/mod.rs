//! Webhook payloads and their validation.
//!
//! This module provides:
//! - Size tiers and their byte limits ([`Tier`])
//! - Payload construction from raw input ([`WebhookPayload`])
//! - Size and content diagnostics ([`validate`], [`ValidationResult`])

mod body;
mod tier;
mod validate;


pub use body::{MERGE_VARIABLES, WebhookPayload};
pub use tier::{ParseTierError, Tier};
pub use validate::{ValidationResult, validate};
