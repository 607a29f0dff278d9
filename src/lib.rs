//! # search-client
//!
//! Async client for a hosted search API, built around a stateful multi-host
//! failover transport.
//!
//! ## Overview
//!
//! An application is served by a ranked set of hosts. Every call is tried
//! against the hosts that are currently up for its role (read or write), in
//! priority order. Server errors, network failures and timeouts move on to the
//! next host; client errors (4xx) fail immediately. Host availability is shared
//! by every call on a client, so a host that just failed is skipped by the
//! next call until it recovers or its cooldown expires.
//!
//! ## Key Features
//!
//! - **Failover**: [`transport::RetryStrategy`] selects hosts and classifies outcomes
//! - **Timeout escalation**: a host that timed out N times gets N+1 times the base timeout
//! - **Pluggable I/O**: any [`transport::RequestSender`]; reqwest by default,
//!   [`transport::EchoRequester`] for tests
//! - **Cancellation**: per-call [`tokio_util::sync::CancellationToken`]
//! - **Compression**: optional gzip request bodies
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use search_client::{RequestOptions, SearchClient};
//! use reqwest::Method;
//!
//! #[tokio::main]
//! async fn main() -> search_client::Result<()> {
//!     let client = SearchClient::new("YourApplicationID", "YourAPIKey")?;
//!
//!     let indices: serde_json::Value = client
//!         .execute(Method::GET, "/1/indexes", RequestOptions::new())
//!         .await?;
//!     println!("{}", indices);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client, builder and per-call options |
//! | [`config`] | Credentials, hosts, timeouts, compression |
//! | [`transport`] | Host registry, retry strategy, request senders |
//! | [`error`] | Error types |

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use client::{RequestOptions, SearchClient, SearchClientBuilder};
pub use config::ClientConfig;
pub use error::{Error, ErrorContext};
pub use transport::{CallType, Compression, Host};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
