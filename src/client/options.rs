use crate::transport::CallType;
use crate::{Error, ErrorContext, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Per-call knobs for [`SearchClient::execute`](crate::SearchClient::execute).
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HashMap<String, String>,
    pub query_params: Vec<(String, String)>,
    /// JSON body, serialized when the call is executed.
    pub body: Option<serde_json::Value>,
    pub read_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
    /// Overrides the role derived from the HTTP method (GET reads, everything else writes).
    pub call_type: Option<CallType>,
    pub cancel: Option<CancellationToken>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query_params.push((name.into(), value.to_string()));
        self
    }

    /// Serialize `body` as the JSON payload.
    pub fn body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| {
            Error::validation_with_context(
                format!("request body is not serializable: {}", e),
                ErrorContext::new()
                    .with_field_path("options.body")
                    .with_source("request_options"),
            )
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Route the call to hosts accepting `call_type` (e.g. a search sent as POST
    /// but served by read hosts).
    pub fn call_type(mut self, call_type: CallType) -> Self {
        self.call_type = Some(call_type);
        self
    }

    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Reject overrides that would make every attempt fail on the spot.
    pub fn validate(&self) -> Result<()> {
        for (value, field) in [
            (self.read_timeout, "options.read_timeout"),
            (self.write_timeout, "options.write_timeout"),
        ] {
            if value.is_some_and(|t| t.is_zero()) {
                return Err(Error::validation_with_context(
                    "timeout must be greater than zero",
                    ErrorContext::new()
                        .with_field_path(field)
                        .with_source("request_options"),
                ));
            }
        }
        Ok(())
    }
}
