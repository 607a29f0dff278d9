//! Host definitions and per-host availability state.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::time::Instant;

/// Set of call roles a host accepts (or a call requires).
///
/// Roles combine with `|`: a host serving both reads and writes is
/// `CallType::READ | CallType::WRITE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CallType(u8);

impl CallType {
    pub const NONE: CallType = CallType(0);
    pub const READ: CallType = CallType(0b001);
    pub const WRITE: CallType = CallType(0b010);
    pub const ANALYTICS: CallType = CallType(0b100);

    /// Every role.
    pub const ALL: CallType = CallType(0b111);

    /// True when every role in `other` is also in `self`.
    pub fn contains(self, other: CallType) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when the two sets share at least one role.
    pub fn intersects(self, other: CallType) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for CallType {
    type Output = CallType;

    fn bitor(self, rhs: CallType) -> CallType {
        CallType(self.0 | rhs.0)
    }
}

impl BitOrAssign for CallType {
    fn bitor_assign(&mut self, rhs: CallType) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(CallType::READ) {
            names.push("read");
        }
        if self.contains(CallType::WRITE) {
            names.push("write");
        }
        if self.contains(CallType::ANALYTICS) {
            names.push("analytics");
        }
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

/// URL scheme used to reach a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Https,
    Http,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Https => "https",
            Scheme::Http => "http",
        }
    }
}

/// One configured API endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub url: String,
    pub port: Option<u16>,
    pub scheme: Scheme,
    pub accept: CallType,
}

impl Host {
    /// HTTPS host accepting reads and writes.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            port: None,
            scheme: Scheme::Https,
            accept: CallType::READ | CallType::WRITE,
        }
    }

    pub fn with_accept(mut self, accept: CallType) -> Self {
        self.accept = accept;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// `scheme://host[:port]`, without a trailing slash.
    pub fn base_url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}", self.scheme.as_str(), self.url, port),
            None => format!("{}://{}", self.scheme.as_str(), self.url),
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url())
    }
}

/// A [`Host`] together with the availability state the retry strategy keeps for it.
#[derive(Debug, Clone)]
pub struct StatefulHost {
    pub host: Host,
    pub up: bool,
    /// Consecutive timeouts since the last success; drives timeout escalation.
    pub retry_count: u32,
    pub last_use: Instant,
}

impl StatefulHost {
    pub fn new(host: Host) -> Self {
        Self {
            host,
            up: true,
            retry_count: 0,
            last_use: Instant::now(),
        }
    }

    pub fn accepts(&self, call_type: CallType) -> bool {
        self.host.accept.intersects(call_type)
    }

    /// Mark up, clear the retry counter and stamp the last use.
    pub(crate) fn reset(&mut self, now: Instant) {
        self.up = true;
        self.retry_count = 0;
        self.last_use = now;
    }
}
