//! Validated webhook dispatch with history recording.

use std::time::Instant;

use serde::Serialize;

use crate::config::Config;
use crate::history::{HistoryEntry, HistoryLog};
use crate::payload::{Tier, ValidationResult, WebhookPayload, validate};
use crate::time::{Clock, SystemClock};

use super::{HttpClient, HttpRequest, Target, resolve_target};

/// Per-send options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Explicit URL, bypassing the environment and plugins.
    pub webhook_url: Option<String>,
    /// Plugin to send to instead of the default.
    pub plugin: Option<String>,
    /// Tier to validate against instead of the configured one.
    pub tier: Option<Tier>,
    /// Send even when validation reports errors.
    pub skip_validation: bool,
    /// Do not write a history entry.
    pub skip_log: bool,
}

/// Which stage a failed send stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// No usable target: unknown plugin, nothing configured, bad URL.
    Configuration,
    /// The payload failed validation.
    Validation,
    /// No response was received.
    Transport,
    /// The webhook answered with a non-success status.
    Protocol,
}

/// Outcome of one send.
///
/// Expected failures are reported here rather than as `Err`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    /// Whether the webhook accepted the payload.
    pub success: bool,
    /// HTTP status, when a response was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Response body text, when a response was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Milliseconds from target resolution to the interpreted response.
    pub duration_ms: u64,
    /// Resolved target name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    /// Failure classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Validation report for the payload.
    pub validation: ValidationResult,
}

#[derive(Debug, Default)]
struct Outcome {
    success: bool,
    status_code: Option<u16>,
    response: Option<String>,
    error: Option<String>,
    failure: Option<FailureKind>,
}

impl Outcome {
    fn failed(kind: FailureKind, error: String) -> Self {
        Self {
            error: Some(error),
            failure: Some(kind),
            ..Self::default()
        }
    }
}

/// Sends payloads to TRMNL webhooks.
///
/// One send is a single linear pass: resolve the target, validate, POST once,
/// interpret the response and append a history entry. There are no retries.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `C`: The clock stamping history entries (defaults to [`SystemClock`])
///
/// # Example
///
/// ```no_run
/// use trmnl::config::Config;
/// use trmnl::payload::WebhookPayload;
/// use trmnl::webhook::{Dispatcher, ReqwestClient, SendOptions};
///
/// # async fn example() {
/// let dispatcher = Dispatcher::new(ReqwestClient::new(), Config::default())
///     .with_env_webhook(Some("https://usetrmnl.com/api/custom_plugins/abc".into()));
/// let payload = WebhookPayload::from_content(r#"<div class="layout">Hi</div>"#);
/// let result = dispatcher.send(&payload, &SendOptions::default()).await;
/// println!("success: {}", result.success);
/// # }
/// ```
#[derive(Debug)]
pub struct Dispatcher<H, C = SystemClock> {
    client: H,
    clock: C,
    config: Config,
    env_webhook: Option<String>,
    history: Option<HistoryLog>,
}

impl<H> Dispatcher<H, SystemClock> {
    /// Creates a dispatcher without an environment override or history log.
    #[must_use]
    pub const fn new(client: H, config: Config) -> Self {
        Self {
            client,
            clock: SystemClock,
            config,
            env_webhook: None,
            history: None,
        }
    }
}

impl<H, C> Dispatcher<H, C> {
    /// Sets the clock used for history timestamps.
    #[must_use]
    pub fn with_clock<C2>(self, clock: C2) -> Dispatcher<H, C2> {
        Dispatcher {
            client: self.client,
            clock,
            config: self.config,
            env_webhook: self.env_webhook,
            history: self.history,
        }
    }

    /// Sets the `TRMNL_WEBHOOK` value, which overrides every plugin.
    #[must_use]
    pub fn with_env_webhook(mut self, url: Option<String>) -> Self {
        self.env_webhook = url;
        self
    }

    /// Records every send in the given log.
    #[must_use]
    pub fn with_history(mut self, history: HistoryLog) -> Self {
        self.history = Some(history);
        self
    }

    /// Returns the configuration targets are resolved against.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}

impl<H: HttpClient, C: Clock> Dispatcher<H, C> {
    /// Validates and sends a payload, then records the attempt.
    pub async fn send(&self, payload: &WebhookPayload, options: &SendOptions) -> SendResult {
        let started = Instant::now();

        let target = resolve_target(
            options.webhook_url.as_deref(),
            self.env_webhook.as_deref(),
            options.plugin.as_deref(),
            &self.config,
        );
        let validation = validate(payload, options.tier.unwrap_or(self.config.tier));

        let (plugin, outcome) = match target {
            Err(e) => (None, Outcome::failed(FailureKind::Configuration, e.to_string())),
            Ok(target) if !options.skip_validation && !validation.valid => (
                Some(target.name),
                Outcome::failed(FailureKind::Validation, validation.errors.join("; ")),
            ),
            Ok(target) => {
                let outcome = self.post(&target, payload).await;
                (Some(target.name), outcome)
            }
        };

        let result = SendResult {
            success: outcome.success,
            status_code: outcome.status_code,
            response: outcome.response,
            error: outcome.error,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            plugin,
            failure: outcome.failure,
            validation,
        };

        if !options.skip_log {
            self.record(payload, &result);
        }
        result
    }

    async fn post(&self, target: &Target, payload: &WebhookPayload) -> Outcome {
        tracing::debug!("Sending to {} ({})", target.name, target.url);
        let request = HttpRequest::post_json(target.url.clone(), payload.to_json());

        match self.client.request(request).await {
            Ok(response) => {
                let status = response.status.as_u16();
                let body = response.body_text().into_owned();
                if response.is_success() {
                    tracing::info!("Webhook {} accepted payload ({status})", target.name);
                    Outcome {
                        success: true,
                        status_code: Some(status),
                        response: Some(body),
                        ..Outcome::default()
                    }
                } else {
                    tracing::info!("Webhook {} rejected payload ({status})", target.name);
                    Outcome {
                        status_code: Some(status),
                        error: Some(format!("HTTP {status}: {body}")),
                        response: Some(body),
                        failure: Some(FailureKind::Protocol),
                        ..Outcome::default()
                    }
                }
            }
            Err(e) => {
                tracing::info!("Webhook {} unreachable: {e}", target.name);
                Outcome::failed(FailureKind::Transport, error_chain(&e))
            }
        }
    }

    fn record(&self, payload: &WebhookPayload, result: &SendResult) {
        let Some(history) = &self.history else {
            return;
        };

        let entry = HistoryEntry {
            timestamp: self.clock.now(),
            plugin: result.plugin.clone(),
            size_bytes: result.validation.size_bytes,
            tier: result.validation.tier,
            payload: payload.clone(),
            success: result.success,
            status_code: result.status_code,
            response: result.response.clone(),
            error: result.error.clone(),
            duration_ms: result.duration_ms,
        };

        if let Err(e) = history.append(&entry) {
            tracing::warn!("Send not recorded in history: {e}");
        }
    }
}

/// Joins an error and its sources as `outer: inner: root`.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
