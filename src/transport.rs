//! Multi-host transport: host registry, retry strategy and the network boundary.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`host`] | Host configuration, call roles, per-host state |
//! | [`retry_strategy`] | Host selection, outcome classification, timeout escalation |
//! | [`sender`] | The [`RequestSender`] trait and request/response descriptors |
//! | [`http`] | reqwest-backed sender |
//! | [`echo`] | Scripted sender for tests |
//! | [`serializer`] | JSON bodies and gzip compression |

pub mod echo;
pub mod host;
pub mod http;
pub mod retry_strategy;
pub mod sender;
pub mod serializer;

pub use echo::{EchoRequester, RecordedRequest};
pub use host::{CallType, Host, Scheme, StatefulHost};
pub use http::{HttpRequester, HttpSettings};
pub use retry_strategy::{
    classify, request_timeout, HostId, HostSnapshot, RetryOutcome, RetryStrategy, TryableHost,
    DEFAULT_HOST_COOLDOWN,
};
pub use sender::{HttpRequest, HttpResponse, RequestSender};
pub use serializer::Compression;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
