use crate::transport::sender::{HttpRequest, HttpResponse, RequestSender};
use crate::transport::TransportError;
use async_trait::async_trait;
use reqwest::Proxy;
use std::collections::HashMap;
use std::env;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Connection pool knobs shared by every underlying `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub proxy_url: Option<String>,
    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` when no explicit proxy is set.
    pub system_proxy: bool,
}

impl HttpSettings {
    /// Minimal production-friendly defaults (env-overridable).
    pub fn from_env() -> Self {
        Self {
            pool_max_idle_per_host: env::var("SEARCH_HTTP_POOL_MAX_IDLE_PER_HOST")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(32),
            pool_idle_timeout: Duration::from_secs(
                env::var("SEARCH_HTTP_POOL_IDLE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(90),
            ),
            proxy_url: env::var("SEARCH_PROXY_URL").ok(),
            system_proxy: true,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            proxy_url: None,
            system_proxy: true,
        }
    }
}

/// [`RequestSender`] backed by `reqwest`.
///
/// reqwest fixes the connect timeout when a client is built, so one client is
/// kept per distinct connect timeout (in practice there is exactly one).
pub struct HttpRequester {
    settings: HttpSettings,
    clients: Mutex<HashMap<Duration, reqwest::Client>>,
}

impl HttpRequester {
    pub fn new(settings: HttpSettings, connect_timeout: Duration) -> Result<Self, TransportError> {
        let requester = Self {
            settings,
            clients: Mutex::new(HashMap::new()),
        };
        // Build eagerly so configuration problems surface at construction.
        requester.client_for(connect_timeout)?;
        Ok(requester)
    }

    fn build_client(&self, connect_timeout: Duration) -> Result<reqwest::Client, TransportError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(self.settings.pool_max_idle_per_host)
            .pool_idle_timeout(Some(self.settings.pool_idle_timeout))
            .http2_adaptive_window(true)
            .http2_keep_alive_interval(Some(Duration::from_secs(30)))
            .http2_keep_alive_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &self.settings.proxy_url {
            match Proxy::all(proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => warn!(proxy = proxy_url.as_str(), error = %e, "search-client ignoring invalid proxy url"),
            }
        } else if !self.settings.system_proxy {
            builder = builder.no_proxy();
        }

        builder.build().map_err(TransportError::Http)
    }

    fn client_for(&self, connect_timeout: Duration) -> Result<reqwest::Client, TransportError> {
        let mut clients = self
            .clients
            .lock()
            .map_err(|_| TransportError::Other("HTTP client cache poisoned".to_string()))?;
        if let Some(client) = clients.get(&connect_timeout) {
            return Ok(client.clone());
        }
        let client = self.build_client(connect_timeout)?;
        clients.insert(connect_timeout, client.clone());
        Ok(client)
    }

    fn response_from_error(err: reqwest::Error) -> HttpResponse {
        if err.is_timeout() {
            HttpResponse::timed_out(err.to_string())
        } else {
            HttpResponse::network_error(err.to_string())
        }
    }

    async fn perform(client: reqwest::Client, request: HttpRequest, request_timeout: Duration) -> HttpResponse {
        let mut req = client
            .request(request.method, request.url)
            .headers(request.headers)
            .timeout(request_timeout);
        if let Some(body) = request.body {
            req = req.body(body);
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => return Self::response_from_error(e),
        };
        let status = resp.status().as_u16();
        match resp.bytes().await {
            Ok(body) => HttpResponse::with_status(status, body),
            // Headers arrived but the body did not: the exchange is unusable.
            Err(e) => Self::response_from_error(e),
        }
    }
}

#[async_trait]
impl RequestSender for HttpRequester {
    async fn send(
        &self,
        request: HttpRequest,
        request_timeout: Duration,
        connect_timeout: Duration,
        cancel: &CancellationToken,
    ) -> HttpResponse {
        let client = match self.client_for(connect_timeout) {
            Ok(client) => client,
            Err(e) => return HttpResponse::network_error(e.to_string()),
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => HttpResponse::network_error("request cancelled"),
            resp = Self::perform(client, request, request_timeout) => resp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_cache_per_connect_timeout() {
        let requester = HttpRequester::new(HttpSettings::default(), Duration::from_secs(2)).unwrap();
        requester.client_for(Duration::from_secs(2)).unwrap();
        requester.client_for(Duration::from_secs(5)).unwrap();
        assert_eq!(requester.clients.lock().unwrap().len(), 2);
    }
}
