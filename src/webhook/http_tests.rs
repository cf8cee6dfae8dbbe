//! Tests for HTTP request/response types and errors.

use super::{HttpError, HttpRequest, HttpResponse, TargetError};

fn url() -> url::Url {
    url::Url::parse("https://usetrmnl.com/api/custom_plugins/abc").unwrap()
}

mod http_request {
    use super::*;

    #[test]
    fn new_creates_request_with_method_and_url() {
        let req = HttpRequest::new(http::Method::PUT, url());

        assert_eq!(req.method, http::Method::PUT);
        assert_eq!(req.url, url());
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn post_creates_post_request() {
        let req = HttpRequest::post(url());

        assert_eq!(req.method, http::Method::POST);
    }

    #[test]
    fn post_json_sets_content_type_and_body() {
        let req = HttpRequest::post_json(url(), r#"{"merge_variables":{}}"#.to_string());

        assert_eq!(req.method, http::Method::POST);
        assert_eq!(
            req.headers.get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(req.body, Some(br#"{"merge_variables":{}}"#.to_vec()));
    }

    #[test]
    fn with_header_appends_multiple_values_for_same_name() {
        let req = HttpRequest::post(url())
            .with_header(
                http::header::ACCEPT,
                http::HeaderValue::from_static("text/html"),
            )
            .with_header(
                http::header::ACCEPT,
                http::HeaderValue::from_static("application/json"),
            );

        assert_eq!(req.headers.get_all(http::header::ACCEPT).iter().count(), 2);
    }
}

mod http_response {
    use super::*;

    #[test]
    fn is_success_returns_true_for_2xx() {
        let statuses = [
            http::StatusCode::OK,
            http::StatusCode::CREATED,
            http::StatusCode::ACCEPTED,
            http::StatusCode::NO_CONTENT,
        ];

        for status in statuses {
            let resp = HttpResponse::new(status, http::HeaderMap::new(), vec![]);
            assert!(resp.is_success(), "Expected {status} to be success");
        }
    }

    #[test]
    fn is_success_returns_false_for_non_2xx() {
        let statuses = [
            http::StatusCode::MOVED_PERMANENTLY,
            http::StatusCode::BAD_REQUEST,
            http::StatusCode::TOO_MANY_REQUESTS,
            http::StatusCode::INTERNAL_SERVER_ERROR,
        ];

        for status in statuses {
            let resp = HttpResponse::new(status, http::HeaderMap::new(), vec![]);
            assert!(!resp.is_success(), "Expected {status} to not be success");
        }
    }

    #[test]
    fn body_text_returns_utf8() {
        let resp = HttpResponse::new(
            http::StatusCode::OK,
            http::HeaderMap::new(),
            b"{\"message\":\"ok\"}".to_vec(),
        );

        assert_eq!(resp.body_text(), "{\"message\":\"ok\"}");
    }

    #[test]
    fn body_text_replaces_invalid_utf8() {
        let resp = HttpResponse::new(
            http::StatusCode::BAD_GATEWAY,
            http::HeaderMap::new(),
            vec![b'o', 0xFF, b'k'],
        );

        assert_eq!(resp.body_text(), "o\u{FFFD}k");
    }

    #[test]
    fn body_text_is_empty_for_empty_body() {
        let resp = HttpResponse::new(http::StatusCode::OK, http::HeaderMap::new(), vec![]);

        assert_eq!(resp.body_text(), "");
    }
}

mod errors {
    use super::*;
    use std::error::Error;

    #[test]
    fn connection_error_keeps_cause_as_source() {
        let error = HttpError::Connection(Box::new(std::io::Error::other("network unavailable")));

        assert_eq!(error.to_string(), "Connection error");
        assert_eq!(error.source().unwrap().to_string(), "network unavailable");
    }

    #[test]
    fn timeout_has_no_source() {
        let error = HttpError::Timeout;

        assert_eq!(error.to_string(), "Request timed out");
        assert!(error.source().is_none());
    }

    #[test]
    fn http_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpError>();
    }

    #[test]
    fn target_errors_name_the_problem() {
        let not_found = TargetError::PluginNotFound {
            name: "kitchen".into(),
        };
        let none = TargetError::NoPluginsConfigured;
        let ambiguous = TargetError::NoDefaultPlugin { count: 3 };

        assert_eq!(not_found.to_string(), "Plugin not found: kitchen");
        assert!(none.to_string().starts_with("No webhook URL configured"));
        assert!(ambiguous.to_string().starts_with("No default plugin set"));
        assert!(ambiguous.to_string().contains('3'));
    }
}
