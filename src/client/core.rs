use crate::config::ClientConfig;
use crate::transport::{HostSnapshot, RequestSender, RetryStrategy};
use crate::{Error, ErrorContext, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;

pub(crate) const APPLICATION_ID_HEADER: &str = "x-algolia-application-id";
pub(crate) const API_KEY_HEADER: &str = "x-algolia-api-key";
pub(crate) const REQUEST_ID_HEADER: &str = "x-search-client-request-id";

/// Client for the hosted search API.
///
/// Cheap to clone; clones share host state, so a host that fails for one
/// call is skipped by every other call on the same client.
#[derive(Clone)]
pub struct SearchClient {
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) strategy: Arc<RetryStrategy>,
    pub(crate) sender: Arc<dyn RequestSender>,
    pub(crate) default_headers: HeaderMap,
}

impl SearchClient {
    /// Client with default hosts and the reqwest sender.
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        crate::client::builder::SearchClientBuilder::new(ClientConfig::new(app_id, api_key)).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn app_id(&self) -> &str {
        &self.config.app_id
    }

    pub fn retry_strategy(&self) -> &RetryStrategy {
        &self.strategy
    }

    /// Snapshot current host state (facts only), in registry order.
    pub fn host_snapshots(&self) -> Vec<HostSnapshot> {
        self.strategy.snapshot()
    }
}

/// Insert a header given as strings, reporting bad names or values against `field`.
pub(crate) fn insert_header(headers: &mut HeaderMap, name: &str, value: &str, field: &str) -> Result<()> {
    let invalid = |what: &str| {
        Error::validation_with_context(
            format!("invalid header {} for {:?}", what, name),
            ErrorContext::new()
                .with_field_path(field)
                .with_source("request_builder"),
        )
    };
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid("name"))?;
    let header_value = HeaderValue::from_str(value).map_err(|_| invalid("value"))?;
    headers.insert(header_name, header_value);
    Ok(())
}
