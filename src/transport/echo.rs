//! Deterministic [`RequestSender`] that never touches the network.
//!
//! Replies are scripted per host name and consumed in order; a host with no
//! script left gets the default reply (`200 {}`). Every request is recorded
//! with the timeouts it was sent with.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::sender::{HttpRequest, HttpResponse, RequestSender};

#[derive(Debug, Clone)]
enum Reply {
    Respond(HttpResponse),
    /// Park until the caller cancels or the request timeout elapses.
    Hang,
}

/// A request as seen by [`EchoRequester`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request: HttpRequest,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl RecordedRequest {
    pub fn host(&self) -> &str {
        self.request.url.host_str().unwrap_or_default()
    }
}

pub struct EchoRequester {
    default_reply: HttpResponse,
    script: Mutex<HashMap<String, VecDeque<Reply>>>,
    recorded: Mutex<Vec<RecordedRequest>>,
}

impl EchoRequester {
    pub fn new() -> Self {
        Self {
            default_reply: HttpResponse::with_status(200, "{}"),
            script: Mutex::new(HashMap::new()),
            recorded: Mutex::new(Vec::new()),
        }
    }

    /// Reply used once a host's script is exhausted.
    pub fn with_default_reply(mut self, reply: HttpResponse) -> Self {
        self.default_reply = reply;
        self
    }

    /// Queue `reply` for the next request to `host`.
    pub fn push(&self, host: &str, reply: HttpResponse) {
        self.enqueue(host, Reply::Respond(reply));
    }

    /// Queue a reply that never arrives; the request ends on cancellation or
    /// times out after its request timeout.
    pub fn push_hang(&self, host: &str) {
        self.enqueue(host, Reply::Hang);
    }

    fn enqueue(&self, host: &str, reply: Reply) {
        if let Ok(mut script) = self.script.lock() {
            script.entry(host.to_string()).or_default().push_back(reply);
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Hosts in the order they were contacted.
    pub fn hosts_contacted(&self) -> Vec<String> {
        self.requests().iter().map(|r| r.host().to_string()).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.clear();
        }
    }
}

impl Default for EchoRequester {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestSender for EchoRequester {
    async fn send(
        &self,
        request: HttpRequest,
        request_timeout: Duration,
        connect_timeout: Duration,
        cancel: &CancellationToken,
    ) -> HttpResponse {
        let host = request.url.host_str().unwrap_or_default().to_string();
        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.push(RecordedRequest {
                request,
                request_timeout,
                connect_timeout,
            });
        }

        let reply = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.get_mut(&host).and_then(|q| q.pop_front()));

        match reply {
            Some(Reply::Respond(resp)) => resp,
            Some(Reply::Hang) => {
                tokio::select! {
                    _ = cancel.cancelled() => HttpResponse::network_error("request cancelled"),
                    _ = tokio::time::sleep(request_timeout) => HttpResponse::timed_out("request timed out"),
                }
            }
            None => self.default_reply.clone(),
        }
    }
}
