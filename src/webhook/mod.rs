//! Webhook layer for posting payloads to TRMNL.
//!
//! This module provides types and traits for:
//! - Building HTTP requests ([`HttpRequest`])
//! - Handling HTTP responses ([`HttpResponse`])
//! - Abstracting HTTP clients ([`HttpClient`])
//! - Production HTTP client implementation ([`ReqwestClient`])
//! - Choosing where a payload goes ([`resolve_target`])
//! - Sending with validation and history ([`Dispatcher`])

mod client;
mod dispatcher;
mod error;
mod http;
mod target;

#[cfg(test)]
mod dispatcher_tests;
#[cfg(test)]
mod http_tests;

pub use client::ReqwestClient;
pub use dispatcher::{Dispatcher, FailureKind, SendOptions, SendResult};
pub use error::{HttpError, TargetError};
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use target::{Target, resolve_target};
