//! The pluggable network boundary of the transport.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A fully built request aimed at one host.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    /// Body is gzip-encoded (and `content-encoding: gzip` is set).
    pub compressed: bool,
}

/// Raw result of one attempt, before classification.
///
/// Failures are data here, not errors: a timeout or a refused connection is
/// something the retry strategy decides about.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// HTTP status, or 0 when no response was received.
    pub status: u16,
    pub body: Bytes,
    pub error: Option<String>,
    pub is_timed_out: bool,
    pub is_network_error: bool,
}

impl HttpResponse {
    pub fn with_status(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn timed_out(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            is_timed_out: true,
            ..Self::default()
        }
    }

    pub fn network_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            is_network_error: true,
            ..Self::default()
        }
    }

    /// Human-readable description of what went wrong, preferring the server's
    /// `{"message": ...}` field, then the raw body, then the transport error.
    pub fn error_message(&self) -> String {
        if !self.body.is_empty() {
            if let Ok(json) = serde_json::from_slice::<serde_json::Value>(&self.body) {
                if let Some(msg) = json.get("message").and_then(|v| v.as_str()) {
                    return msg.to_string();
                }
            }
            return String::from_utf8_lossy(&self.body).into_owned();
        }
        if let Some(err) = &self.error {
            return err.clone();
        }
        if self.is_timed_out {
            return "request timed out".to_string();
        }
        format!("HTTP {}", self.status)
    }
}

/// Performs the network I/O for one attempt.
///
/// Implementations must be safe to share across concurrent calls. They should
/// stop promptly once `cancel` fires; whatever they return afterwards is
/// discarded by the caller.
#[async_trait]
pub trait RequestSender: Send + Sync {
    async fn send(
        &self,
        request: HttpRequest,
        request_timeout: Duration,
        connect_timeout: Duration,
        cancel: &CancellationToken,
    ) -> HttpResponse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_server_message() {
        let resp = HttpResponse::with_status(400, r#"{"message":"Invalid Application-ID or API key","status":400}"#);
        assert_eq!(resp.error_message(), "Invalid Application-ID or API key");

        let resp = HttpResponse::with_status(502, "Bad Gateway");
        assert_eq!(resp.error_message(), "Bad Gateway");
    }

    #[test]
    fn test_error_message_without_body() {
        assert_eq!(
            HttpResponse::network_error("connection refused").error_message(),
            "connection refused"
        );
        let resp = HttpResponse {
            is_timed_out: true,
            ..HttpResponse::default()
        };
        assert_eq!(resp.error_message(), "request timed out");
        assert_eq!(HttpResponse::with_status(503, "").error_message(), "HTTP 503");
    }
}
