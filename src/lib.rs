//! trmnl: send content to TRMNL e-ink displays
//!
//! A library for building TRMNL webhook payloads, checking them against the
//! account's size limit, posting them to configured plugins, and keeping a
//! history of every send.

pub mod config;
pub mod history;
pub mod input;
pub mod payload;
pub mod time;
pub mod webhook;
