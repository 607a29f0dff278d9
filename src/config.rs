//! Client configuration: credentials, hosts, timeouts, compression.

use crate::transport::{CallType, Compression, Host};
use crate::{Error, ErrorContext, Result};
use keyring::Entry;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::env;
use std::time::Duration;

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Keyring service under which API keys are looked up (user = application id).
pub const KEYRING_SERVICE: &str = "search-client";

const USER_AGENT_PREFIX: &str = "Search Client for Rust";

/// Default host list for an application.
///
/// The low-latency read host and the primary write host come first; the three
/// fallback hosts follow in random order so that clients spread their
/// failover load.
pub fn default_hosts(app_id: &str) -> Vec<Host> {
    let mut hosts = vec![
        Host::new(format!("{}-dsn.algolia.net", app_id)).with_accept(CallType::READ),
        Host::new(format!("{}.algolia.net", app_id)).with_accept(CallType::WRITE),
    ];
    let mut fallbacks: Vec<Host> = (1..=3)
        .map(|i| Host::new(format!("{}-{}.algolianet.com", app_id, i)))
        .collect();
    fallbacks.shuffle(&mut rand::rng());
    hosts.extend(fallbacks);
    hosts
}

/// The single host serving the analytics API, optionally region-pinned.
pub fn analytics_hosts(region: Option<&str>) -> Vec<Host> {
    let url = match region {
        Some(region) => format!("analytics.{}.algolia.com", region),
        None => "analytics.algolia.com".to_string(),
    };
    vec![Host::new(url).with_accept(CallType::ALL)]
}

/// Look up the API key for `app_id`: OS keyring first, then `SEARCH_API_KEY`.
pub fn resolve_api_key(app_id: &str) -> Option<String> {
    if let Ok(entry) = Entry::new(KEYRING_SERVICE, app_id) {
        if let Ok(key) = entry.get_password() {
            return Some(key);
        }
    }
    env::var("SEARCH_API_KEY").ok().filter(|k| !k.is_empty())
}

fn env_secs(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub app_id: String,
    pub api_key: String,
    /// Replaces the default hosts entirely when set.
    pub custom_hosts: Option<Vec<Host>>,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub connect_timeout: Duration,
    pub compression: Compression,
    /// Sent with every request; per-call headers win.
    pub default_headers: HashMap<String, String>,
    pub user_agent_segments: Vec<String>,
    /// How long a down host is skipped before being offered again.
    pub host_cooldown: Duration,
}

impl ClientConfig {
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            api_key: api_key.into(),
            custom_hosts: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            compression: Compression::None,
            default_headers: HashMap::new(),
            user_agent_segments: Vec::new(),
            host_cooldown: crate::transport::DEFAULT_HOST_COOLDOWN,
        }
    }

    /// Configuration for `app_id` with the API key from the keyring or env,
    /// and env overrides applied.
    pub fn from_env(app_id: impl Into<String>) -> Result<Self> {
        let app_id = app_id.into();
        let api_key = resolve_api_key(&app_id).ok_or_else(|| {
            Error::configuration_with_context(
                "no API key found in keyring or SEARCH_API_KEY",
                ErrorContext::new()
                    .with_field_path("config.api_key")
                    .with_source("client_config"),
            )
        })?;
        Ok(Self::new(app_id, api_key).with_env_overrides())
    }

    /// Apply `SEARCH_*` environment overrides for timeouts and compression.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(t) = env_secs("SEARCH_READ_TIMEOUT_SECS") {
            self.read_timeout = t;
        }
        if let Some(t) = env_secs("SEARCH_WRITE_TIMEOUT_SECS") {
            self.write_timeout = t;
        }
        if let Some(t) = env_secs("SEARCH_CONNECT_TIMEOUT_SECS") {
            self.connect_timeout = t;
        }
        if let Some(c) = env::var("SEARCH_COMPRESSION")
            .ok()
            .and_then(|v| Compression::parse(&v))
        {
            self.compression = c;
        }
        self
    }

    pub fn with_hosts(mut self, hosts: Vec<Host>) -> Self {
        self.custom_hosts = Some(hosts);
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_host_cooldown(mut self, cooldown: Duration) -> Self {
        self.host_cooldown = cooldown;
        self
    }

    /// Append `segment` to the user agent (e.g. `"my-app (1.2.0)"`).
    pub fn add_user_agent_segment(mut self, segment: impl Into<String>) -> Self {
        self.user_agent_segments.push(segment.into());
        self
    }

    pub fn user_agent(&self) -> String {
        let mut ua = format!("{} ({})", USER_AGENT_PREFIX, env!("CARGO_PKG_VERSION"));
        for segment in &self.user_agent_segments {
            ua.push_str("; ");
            ua.push_str(segment);
        }
        ua
    }

    /// Hosts the client starts with: the custom list, or the defaults.
    pub fn hosts(&self) -> Vec<Host> {
        match &self.custom_hosts {
            Some(hosts) => hosts.clone(),
            None => default_hosts(&self.app_id),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str, field: &str| {
            Err(Error::configuration_with_context(
                msg,
                ErrorContext::new()
                    .with_field_path(field)
                    .with_source("client_config"),
            ))
        };

        if self.app_id.trim().is_empty() {
            return invalid("application id is empty", "config.app_id");
        }
        if self.api_key.trim().is_empty() {
            return invalid("API key is empty", "config.api_key");
        }
        if let Some(hosts) = &self.custom_hosts {
            if hosts.is_empty() {
                return invalid("custom host list is empty", "config.custom_hosts");
            }
            for (i, host) in hosts.iter().enumerate() {
                if host.url.trim().is_empty() {
                    return invalid("host url is empty", &format!("config.custom_hosts[{}].url", i));
                }
                if host.accept.is_empty() {
                    return invalid(
                        "host accepts no call type",
                        &format!("config.custom_hosts[{}].accept", i),
                    );
                }
            }
        }
        for (value, field) in [
            (self.read_timeout, "config.read_timeout"),
            (self.write_timeout, "config.write_timeout"),
            (self.connect_timeout, "config.connect_timeout"),
        ] {
            if value.is_zero() {
                return invalid("timeout must be greater than zero", field);
            }
        }
        Ok(())
    }
}
