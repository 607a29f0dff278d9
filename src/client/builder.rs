use crate::client::core::{insert_header, SearchClient, API_KEY_HEADER, APPLICATION_ID_HEADER};
use crate::config::ClientConfig;
use crate::transport::{HttpRequester, HttpSettings, RequestSender, RetryStrategy, StatefulHost};
use crate::{Error, ErrorContext, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::sync::Arc;

/// Builder for creating clients with custom configuration.
///
/// Keep this surface area small and predictable.
pub struct SearchClientBuilder {
    config: ClientConfig,
    sender: Option<Arc<dyn RequestSender>>,
    http_settings: Option<HttpSettings>,
    initial_hosts: Option<Vec<StatefulHost>>,
}

impl SearchClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            sender: None,
            http_settings: None,
            initial_hosts: None,
        }
    }

    /// Replace the reqwest sender (e.g. with [`EchoRequester`](crate::transport::EchoRequester)).
    pub fn sender(mut self, sender: Arc<dyn RequestSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Connection pool settings for the default sender. Defaults come from env.
    pub fn http_settings(mut self, settings: HttpSettings) -> Self {
        self.http_settings = Some(settings);
        self
    }

    /// Start from pre-existing host state instead of fresh hosts, e.g. to
    /// carry availability over from a previous client.
    pub fn initial_hosts(mut self, hosts: Vec<StatefulHost>) -> Self {
        self.initial_hosts = Some(hosts);
        self
    }

    fn default_headers(config: &ClientConfig) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        insert_header(&mut headers, APPLICATION_ID_HEADER, &config.app_id, "config.app_id")?;
        insert_header(&mut headers, API_KEY_HEADER, &config.api_key, "config.api_key")?;
        insert_header(&mut headers, USER_AGENT.as_str(), &config.user_agent(), "config.user_agent_segments")?;
        for (name, value) in &config.default_headers {
            insert_header(&mut headers, name, value, "config.default_headers")?;
        }
        Ok(headers)
    }

    /// Build the client.
    pub fn build(self) -> Result<SearchClient> {
        self.config.validate()?;
        let default_headers = Self::default_headers(&self.config)
            .map_err(|e| match e {
                Error::Validation { message, context } => Error::Configuration { message, context },
                other => other,
            })?;

        let hosts = match self.initial_hosts {
            Some(hosts) if hosts.is_empty() => {
                return Err(Error::configuration_with_context(
                    "initial host list is empty",
                    ErrorContext::new()
                        .with_field_path("builder.initial_hosts")
                        .with_source("client_builder"),
                ))
            }
            Some(hosts) => hosts,
            None => self.config.hosts().into_iter().map(StatefulHost::new).collect(),
        };
        let strategy = RetryStrategy::new(hosts).with_cooldown(self.config.host_cooldown);

        let sender: Arc<dyn RequestSender> = match self.sender {
            Some(sender) => sender,
            None => Arc::new(HttpRequester::new(
                self.http_settings.unwrap_or_else(HttpSettings::from_env),
                self.config.connect_timeout,
            )?),
        };

        Ok(SearchClient {
            config: Arc::new(self.config),
            strategy: Arc::new(strategy),
            sender,
            default_headers,
        })
    }
}
