//! Request execution: one logical call driven across the tryable hosts.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use super::core::{insert_header, SearchClient, REQUEST_ID_HEADER};
use super::options::RequestOptions;
use crate::transport::{serializer, request_timeout, CallType, Compression, Host, HttpRequest, RetryOutcome};
use crate::{Error, ErrorContext, Result};

/// Role of a call: GET reads, everything else writes, unless overridden.
pub(crate) fn call_type_for(method: &Method, call_type: Option<CallType>) -> CallType {
    call_type.unwrap_or(if *method == Method::GET {
        CallType::READ
    } else {
        CallType::WRITE
    })
}

fn carries_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT
}

/// Body bytes shared by every attempt of one call.
struct PreparedBody {
    bytes: Option<Bytes>,
    gzipped: bool,
}

fn prepare_body(method: &Method, options: &RequestOptions, compression: Compression) -> Result<PreparedBody> {
    let bytes = match &options.body {
        Some(value) => Some(serializer::serialize(value)?),
        None if carries_body(method) => Some(Bytes::from_static(b"{}")),
        None => None,
    };
    match bytes {
        Some(raw) if compression == Compression::Gzip && carries_body(method) => Ok(PreparedBody {
            bytes: Some(serializer::gzip(&raw)?),
            gzipped: true,
        }),
        bytes => Ok(PreparedBody { bytes, gzipped: false }),
    }
}

impl SearchClient {
    /// Execute a call and deserialize the JSON response into `T`.
    pub async fn execute<T: DeserializeOwned>(&self, method: Method, path: &str, options: RequestOptions) -> Result<T> {
        let body = self.execute_raw(method, path, options).await?;
        serializer::deserialize(&body)
    }

    /// Execute a call whose response body is of no interest.
    pub async fn execute_no_content(&self, method: Method, path: &str, options: RequestOptions) -> Result<()> {
        self.execute_raw(method, path, options).await.map(|_| ())
    }

    fn base_timeout(&self, call_type: CallType, options: &RequestOptions) -> Duration {
        if call_type.contains(CallType::WRITE) {
            options.write_timeout.unwrap_or(self.config.write_timeout)
        } else {
            options.read_timeout.unwrap_or(self.config.read_timeout)
        }
    }

    fn build_request(
        &self,
        method: &Method,
        host: &Host,
        path: &str,
        options: &RequestOptions,
        body: &PreparedBody,
        request_id: &str,
    ) -> Result<HttpRequest> {
        let mut url = Url::parse(&host.base_url()).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid host url: {}", e),
                ErrorContext::new()
                    .with_field_path("config.custom_hosts")
                    .with_details(host.base_url())
                    .with_source("request_builder"),
            )
        })?;
        url.set_path(path);
        if !options.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(options.query_params.iter());
        }

        let mut headers: HeaderMap = self.default_headers.clone();
        for (name, value) in &options.headers {
            insert_header(&mut headers, name, value, "options.headers")?;
        }
        insert_header(&mut headers, REQUEST_ID_HEADER, request_id, "request_id")?;
        if body.bytes.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        }
        if body.gzipped {
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        }

        Ok(HttpRequest {
            method: method.clone(),
            url,
            headers,
            body: body.bytes.clone(),
            compressed: body.gzipped,
        })
    }

    /// Drive one call over the tryable hosts and return the successful body.
    pub(crate) async fn execute_raw(&self, method: Method, path: &str, options: RequestOptions) -> Result<Bytes> {
        options.validate()?;
        let call_type = call_type_for(&method, options.call_type);
        let cancel = options.cancel.clone().unwrap_or_else(CancellationToken::new);
        let base_timeout = self.base_timeout(call_type, &options);
        let body = prepare_body(&method, &options, self.config.compression)?;
        let request_id = Uuid::new_v4().to_string();

        // Selection revives and resets hosts, so a cancelled call must not reach it.
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let hosts = self.strategy.tryable_hosts(call_type);
        if hosts.is_empty() {
            return Err(Error::configuration_with_context(
                format!("no configured host accepts {} calls", call_type),
                ErrorContext::new()
                    .with_field_path("config.custom_hosts")
                    .with_source("retry_strategy"),
            ));
        }

        let start = Instant::now();
        let mut last_error: Option<String> = None;
        for tryable in hosts {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let request = self.build_request(&method, &tryable.host, path, &options, &body, &request_id)?;
            let retry_count = self.strategy.retry_count(tryable.id);
            let timeout = request_timeout(base_timeout, retry_count);
            debug!(
                request_id = request_id.as_str(),
                host = tryable.host.url.as_str(),
                retry_count,
                timeout_ms = timeout.as_millis() as u64,
                "search-client attempt"
            );

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                resp = self.sender.send(request, timeout, self.config.connect_timeout, &cancel) => resp,
            };
            // A sender that noticed the cancellation reports it as a failed
            // exchange; that is not the host's fault.
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            match self.strategy.decide(
                tryable.id,
                response.status,
                response.is_timed_out,
                response.is_network_error,
            ) {
                RetryOutcome::Success => {
                    debug!(
                        request_id = request_id.as_str(),
                        host = tryable.host.url.as_str(),
                        http_status = response.status,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "search-client request succeeded"
                    );
                    return Ok(response.body);
                }
                RetryOutcome::Retry => {
                    let message = response.error_message();
                    info!(
                        request_id = request_id.as_str(),
                        host = tryable.host.url.as_str(),
                        http_status = response.status,
                        timed_out = response.is_timed_out,
                        network_error = response.is_network_error,
                        error = message.as_str(),
                        "search-client retrying on next host"
                    );
                    last_error = Some(message);
                }
                RetryOutcome::Failure => {
                    let message = response.error_message();
                    info!(
                        request_id = request_id.as_str(),
                        host = tryable.host.url.as_str(),
                        http_status = response.status,
                        path,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "search-client request failed"
                    );
                    return Err(Error::Api {
                        status: response.status,
                        message,
                    });
                }
            }
        }

        warn!(
            request_id = request_id.as_str(),
            call_type = %call_type,
            path,
            duration_ms = start.elapsed().as_millis() as u64,
            "search-client exhausted all hosts"
        );
        Err(Error::Unreachable { last_error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_type_for_method() {
        assert_eq!(call_type_for(&Method::GET, None), CallType::READ);
        assert_eq!(call_type_for(&Method::POST, None), CallType::WRITE);
        assert_eq!(call_type_for(&Method::PUT, None), CallType::WRITE);
        assert_eq!(call_type_for(&Method::DELETE, None), CallType::WRITE);
        assert_eq!(call_type_for(&Method::POST, Some(CallType::READ)), CallType::READ);
    }

    #[test]
    fn test_prepare_body() {
        let empty = RequestOptions::new();
        let body = prepare_body(&Method::POST, &empty, Compression::None).unwrap();
        assert_eq!(body.bytes.as_deref(), Some(&b"{}"[..]));
        assert!(!body.gzipped);

        assert!(prepare_body(&Method::GET, &empty, Compression::Gzip).unwrap().bytes.is_none());
        assert!(prepare_body(&Method::DELETE, &empty, Compression::None).unwrap().bytes.is_none());

        let with_body = RequestOptions::new().json(serde_json::json!({"query": "tv"}));
        let body = prepare_body(&Method::PUT, &with_body, Compression::Gzip).unwrap();
        assert!(body.gzipped);
        assert_eq!(&body.bytes.unwrap()[..2], &[0x1f, 0x8b]);

        // Never compressed for methods that don't carry a body, even with one attached.
        let body = prepare_body(&Method::DELETE, &with_body, Compression::Gzip).unwrap();
        assert!(!body.gzipped);
        assert_eq!(body.bytes.as_deref(), Some(&br#"{"query":"tv"}"#[..]));
    }
}
