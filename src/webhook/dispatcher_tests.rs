//! Tests for `Dispatcher`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use super::{
    Dispatcher, FailureKind, HttpClient, HttpError, HttpRequest, HttpResponse, SendOptions,
};
use crate::config::Config;
use crate::history::HistoryLog;
use crate::payload::{Tier, WebhookPayload};
use crate::time::FixedClock;

const HOME_URL: &str = "https://usetrmnl.com/api/custom_plugins/home";

/// Mock HTTP client that returns a configurable sequence of responses.
#[derive(Debug)]
struct MockClient {
    responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    call_count: AtomicUsize,
}

impl MockClient {
    fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    fn responding(status: u16, body: &str) -> Self {
        Self::new(vec![Ok(HttpResponse::new(
            http::StatusCode::from_u16(status).unwrap(),
            http::HeaderMap::new(),
            body.as_bytes().to_vec(),
        ))])
    }

    fn failing(error: HttpError) -> Self {
        Self::new(vec![Err(error)])
    }

    fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn captured_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for MockClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(req);
        self.responses.lock().unwrap().remove(0)
    }
}

impl HttpClient for Arc<MockClient> {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        (**self).request(req).await
    }
}

fn home_config() -> Config {
    let mut config = Config::default();
    config.set_plugin("home", HOME_URL, None);
    config
}

fn layout_payload() -> WebhookPayload {
    WebhookPayload::from_content(r#"<div class="layout">Hello</div>"#)
}

fn oversized_payload() -> WebhookPayload {
    WebhookPayload::from_content(format!(r#"<div class="layout">{}</div>"#, "x".repeat(2100)))
}

struct Harness {
    _dir: TempDir,
    client: Arc<MockClient>,
    history: HistoryLog,
    dispatcher: Dispatcher<Arc<MockClient>, FixedClock>,
}

fn harness(client: MockClient, config: Config) -> Harness {
    let dir = TempDir::new().unwrap();
    let history = HistoryLog::new(dir.path().join("history.jsonl"));
    let client = Arc::new(client);
    let dispatcher = Dispatcher::new(Arc::clone(&client), config)
        .with_clock(FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()))
        .with_history(history.clone());

    Harness {
        _dir: dir,
        client,
        history,
        dispatcher,
    }
}

mod success {
    use super::*;

    #[tokio::test]
    async fn posts_compact_json_to_plugin() {
        let h = harness(MockClient::responding(200, r#"{"message":"ok"}"#), home_config());
        let payload = layout_payload();

        let result = h.dispatcher.send(&payload, &SendOptions::default()).await;

        assert!(result.success);
        assert_eq!(result.status_code, Some(200));
        assert_eq!(result.response.as_deref(), Some(r#"{"message":"ok"}"#));
        assert!(result.error.is_none());
        assert!(result.failure.is_none());
        assert_eq!(result.plugin.as_deref(), Some("home"));

        let requests = h.client.captured_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, http::Method::POST);
        assert_eq!(requests[0].url.as_str(), HOME_URL);
        assert_eq!(
            requests[0].headers.get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(requests[0].body.as_deref(), Some(payload.to_json().as_bytes()));
    }

    #[tokio::test]
    async fn records_one_history_entry() {
        let h = harness(MockClient::responding(200, "ok"), home_config());
        let payload = layout_payload();

        let result = h.dispatcher.send(&payload, &SendOptions::default()).await;

        let entries = h.history.read_all();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert!(entry.success);
        assert_eq!(entry.plugin.as_deref(), Some("home"));
        assert_eq!(entry.status_code, Some(200));
        assert_eq!(entry.size_bytes, result.validation.size_bytes);
        assert_eq!(entry.payload, payload);
        assert_eq!(entry.duration_ms, result.duration_ms);
        assert_eq!(
            entry.timestamp,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn skip_log_writes_nothing() {
        let h = harness(MockClient::responding(200, "ok"), home_config());
        let options = SendOptions {
            skip_log: true,
            ..SendOptions::default()
        };

        let result = h.dispatcher.send(&layout_payload(), &options).await;

        assert!(result.success);
        assert!(!h.history.path().exists());
    }

    #[tokio::test]
    async fn explicit_url_is_recorded_as_direct() {
        let h = harness(MockClient::responding(200, "ok"), Config::default());
        let options = SendOptions {
            webhook_url: Some("https://example.com/hook".into()),
            ..SendOptions::default()
        };

        let result = h.dispatcher.send(&layout_payload(), &options).await;

        assert!(result.success);
        assert_eq!(result.plugin.as_deref(), Some("(direct)"));
        assert_eq!(
            h.client.captured_requests()[0].url.as_str(),
            "https://example.com/hook"
        );
    }

    #[tokio::test]
    async fn environment_webhook_overrides_plugins() {
        let client = Arc::new(MockClient::responding(200, "ok"));
        let dispatcher = Dispatcher::new(Arc::clone(&client), home_config())
            .with_env_webhook(Some("https://example.com/env".into()));

        let result = dispatcher
            .send(&layout_payload(), &SendOptions::default())
            .await;

        assert_eq!(result.plugin.as_deref(), Some("$TRMNL_WEBHOOK"));
        assert_eq!(
            client.captured_requests()[0].url.as_str(),
            "https://example.com/env"
        );
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn server_error_carries_status_and_body() {
        let h = harness(MockClient::responding(500, "oops"), home_config());

        let result = h
            .dispatcher
            .send(&layout_payload(), &SendOptions::default())
            .await;

        assert!(!result.success);
        assert_eq!(result.status_code, Some(500));
        assert_eq!(result.response.as_deref(), Some("oops"));
        assert_eq!(result.error.as_deref(), Some("HTTP 500: oops"));
        assert_eq!(result.failure, Some(FailureKind::Protocol));

        let entries = h.history.read_all();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].success);
        assert_eq!(entries[0].error.as_deref(), Some("HTTP 500: oops"));
    }

    #[tokio::test]
    async fn transport_error_includes_cause() {
        let h = harness(
            MockClient::failing(HttpError::Connection(Box::new(std::io::Error::other(
                "connection refused",
            )))),
            home_config(),
        );

        let result = h
            .dispatcher
            .send(&layout_payload(), &SendOptions::default())
            .await;

        assert!(!result.success);
        assert!(result.status_code.is_none());
        assert_eq!(
            result.error.as_deref(),
            Some("Connection error: connection refused")
        );
        assert_eq!(result.failure, Some(FailureKind::Transport));
        assert_eq!(h.history.read_all().len(), 1);
    }

    #[tokio::test]
    async fn timeout_is_a_transport_failure() {
        let h = harness(MockClient::failing(HttpError::Timeout), home_config());

        let result = h
            .dispatcher
            .send(&layout_payload(), &SendOptions::default())
            .await;

        assert_eq!(result.error.as_deref(), Some("Request timed out"));
        assert_eq!(result.failure, Some(FailureKind::Transport));
    }

    #[tokio::test]
    async fn invalid_payload_is_not_sent() {
        let h = harness(MockClient::new(vec![]), home_config());

        let result = h
            .dispatcher
            .send(&oversized_payload(), &SendOptions::default())
            .await;

        assert!(!result.success);
        assert_eq!(result.failure, Some(FailureKind::Validation));
        assert_eq!(result.error, Some(result.validation.errors.join("; ")));
        assert!(result.error.as_deref().unwrap().contains("2048"));
        assert_eq!(h.client.calls(), 0);

        let entries = h.history.read_all();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].plugin.as_deref(), Some("home"));
    }

    #[tokio::test]
    async fn skip_validation_sends_anyway() {
        let h = harness(MockClient::responding(200, "ok"), home_config());
        let options = SendOptions {
            skip_validation: true,
            ..SendOptions::default()
        };

        let result = h.dispatcher.send(&oversized_payload(), &options).await;

        assert!(result.success);
        assert!(!result.validation.valid);
        assert_eq!(h.client.calls(), 1);
    }

    #[tokio::test]
    async fn tier_override_changes_the_limit() {
        let h = harness(MockClient::responding(200, "ok"), home_config());
        let options = SendOptions {
            tier: Some(Tier::Plus),
            ..SendOptions::default()
        };

        let result = h.dispatcher.send(&oversized_payload(), &options).await;

        assert!(result.success);
        assert_eq!(result.validation.tier, Tier::Plus);
        assert_eq!(h.history.read_all()[0].tier, Tier::Plus);
    }
}

mod configuration {
    use super::*;

    #[tokio::test]
    async fn no_target_is_recorded_once() {
        let h = harness(MockClient::new(vec![]), Config::default());

        let result = h
            .dispatcher
            .send(&layout_payload(), &SendOptions::default())
            .await;

        assert!(!result.success);
        assert_eq!(result.failure, Some(FailureKind::Configuration));
        assert!(
            result
                .error
                .as_deref()
                .unwrap()
                .starts_with("No webhook URL configured")
        );
        assert!(result.plugin.is_none());
        assert_eq!(h.client.calls(), 0);

        let entries = h.history.read_all();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].plugin.is_none());
    }

    #[tokio::test]
    async fn no_target_with_skip_log_writes_nothing() {
        let h = harness(MockClient::new(vec![]), Config::default());
        let options = SendOptions {
            skip_log: true,
            ..SendOptions::default()
        };

        let result = h.dispatcher.send(&layout_payload(), &options).await;

        assert!(!result.success);
        assert!(h.history.read_all().is_empty());
    }

    #[tokio::test]
    async fn unknown_plugin_is_not_sent() {
        let h = harness(MockClient::new(vec![]), home_config());
        let options = SendOptions {
            plugin: Some("garage".into()),
            ..SendOptions::default()
        };

        let result = h.dispatcher.send(&layout_payload(), &options).await;

        assert_eq!(result.error.as_deref(), Some("Plugin not found: garage"));
        assert_eq!(h.client.calls(), 0);
    }

    #[tokio::test]
    async fn validation_still_reported_on_configuration_failure() {
        let h = harness(MockClient::new(vec![]), Config::default());

        let result = h
            .dispatcher
            .send(&oversized_payload(), &SendOptions::default())
            .await;

        assert_eq!(result.failure, Some(FailureKind::Configuration));
        assert!(!result.validation.valid);
    }

    #[tokio::test]
    async fn unwritable_history_does_not_change_result() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let client = Arc::new(MockClient::responding(200, "ok"));
        let dispatcher = Dispatcher::new(Arc::clone(&client), home_config())
            .with_history(HistoryLog::new(blocker.join("history.jsonl")));

        let result = dispatcher
            .send(&layout_payload(), &SendOptions::default())
            .await;

        assert!(result.success);
    }
}

mod serialization {
    use super::*;

    #[tokio::test]
    async fn json_uses_camel_case() {
        let h = harness(MockClient::responding(500, "oops"), home_config());

        let result = h
            .dispatcher
            .send(&layout_payload(), &SendOptions::default())
            .await;
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["statusCode"], 500);
        assert_eq!(json["failure"], "protocol");
        assert!(json["durationMs"].is_u64());
        assert_eq!(json["validation"]["valid"], true);
    }

    #[tokio::test]
    async fn absent_fields_are_omitted() {
        let h = harness(MockClient::new(vec![]), Config::default());

        let result = h
            .dispatcher
            .send(&layout_payload(), &SendOptions::default())
            .await;
        let json = serde_json::to_value(&result).unwrap();

        assert!(json.get("statusCode").is_none());
        assert!(json.get("response").is_none());
        assert!(json.get("plugin").is_none());
    }
}
