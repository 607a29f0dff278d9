//! Host selection and attempt classification.
//!
//! The strategy owns the ranked host list of one client. Every read and every
//! mutation of host state goes through a single mutex, held only for the
//! in-memory bookkeeping and never across network I/O. Callers address hosts
//! by [`HostId`] rather than holding references into the list.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::warn;

use super::host::{CallType, Host, StatefulHost};

/// How long a host stays down before it is offered again.
pub const DEFAULT_HOST_COOLDOWN: Duration = Duration::from_secs(5 * 60);

/// Index of a host in its strategy's registry.
pub type HostId = usize;

/// Verdict for one attempt against one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    Success,
    Retry,
    Failure,
}

/// A host selected for a call, in try order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryableHost {
    pub id: HostId,
    pub host: Host,
}

/// Facts-only view of one host's state.
#[derive(Debug, Clone)]
pub struct HostSnapshot {
    pub url: String,
    pub accept: CallType,
    pub up: bool,
    pub retry_count: u32,
    pub since_last_use_ms: u64,
}

/// Classify an attempt outcome. Pure; host state is not consulted.
///
/// A timeout wins over any status code. 4xx is terminal; any other non-2xx
/// status and any network-level error is worth another host.
pub fn classify(status: u16, timed_out: bool, network_error: bool) -> RetryOutcome {
    if timed_out {
        return RetryOutcome::Retry;
    }
    if is_success(status) {
        return RetryOutcome::Success;
    }
    if network_error || !is_client_error(status) {
        return RetryOutcome::Retry;
    }
    RetryOutcome::Failure
}

/// Request timeout for a host that already timed out `retry_count` times.
pub fn request_timeout(base: Duration, retry_count: u32) -> Duration {
    base.saturating_mul(retry_count.saturating_add(1))
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn is_client_error(status: u16) -> bool {
    (400..500).contains(&status)
}

pub struct RetryStrategy {
    hosts: Mutex<Vec<StatefulHost>>,
    cooldown: Duration,
}

impl RetryStrategy {
    pub fn new(hosts: Vec<StatefulHost>) -> Self {
        Self {
            hosts: Mutex::new(hosts),
            cooldown: DEFAULT_HOST_COOLDOWN,
        }
    }

    /// Strategy over freshly configured hosts, all up.
    pub fn from_hosts(hosts: Vec<Host>) -> Self {
        Self::new(hosts.into_iter().map(StatefulHost::new).collect())
    }

    /// Override the down-host cooldown window.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave a host half-updated: every
    // mutation below is a handful of plain field stores.
    fn lock(&self) -> MutexGuard<'_, Vec<StatefulHost>> {
        self.hosts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Hosts to try for `call_type`, in priority order.
    ///
    /// Down hosts past the cooldown are revived first. When no host accepting
    /// `call_type` is up, all of them are reset and returned: the result is
    /// only empty if no configured host accepts `call_type` at all.
    pub fn tryable_hosts(&self, call_type: CallType) -> Vec<TryableHost> {
        self.tryable_hosts_at(call_type, Instant::now())
    }

    pub(crate) fn tryable_hosts_at(&self, call_type: CallType, now: Instant) -> Vec<TryableHost> {
        let mut hosts = self.lock();

        for host in hosts.iter_mut() {
            if !host.up && now.saturating_duration_since(host.last_use) > self.cooldown {
                warn!(
                    host = host.host.url.as_str(),
                    cooldown_secs = self.cooldown.as_secs(),
                    "search-client host cooldown expired, marking up"
                );
                host.reset(now);
            }
        }

        let up: Vec<TryableHost> = hosts
            .iter()
            .enumerate()
            .filter(|(_, h)| h.up && h.accepts(call_type))
            .map(|(id, h)| TryableHost {
                id,
                host: h.host.clone(),
            })
            .collect();
        if !up.is_empty() {
            return up;
        }

        let mut all = Vec::new();
        for (id, host) in hosts.iter_mut().enumerate() {
            if host.accepts(call_type) {
                host.reset(now);
                all.push(TryableHost {
                    id,
                    host: host.host.clone(),
                });
            }
        }
        if !all.is_empty() {
            warn!(
                call_type = %call_type,
                hosts = all.len(),
                "search-client all hosts down, resetting every eligible host"
            );
        }
        all
    }

    /// Record the outcome of an attempt against `id` and classify it.
    ///
    /// `status` is ignored when `timed_out` is set; pass 0 when no response
    /// was received.
    pub fn decide(
        &self,
        id: HostId,
        status: u16,
        timed_out: bool,
        network_error: bool,
    ) -> RetryOutcome {
        self.decide_at(id, status, timed_out, network_error, Instant::now())
    }

    pub(crate) fn decide_at(
        &self,
        id: HostId,
        status: u16,
        timed_out: bool,
        network_error: bool,
        now: Instant,
    ) -> RetryOutcome {
        let mut hosts = self.lock();
        let outcome = classify(status, timed_out, network_error);
        let Some(host) = hosts.get_mut(id) else {
            return outcome;
        };

        match outcome {
            RetryOutcome::Success => host.reset(now),
            RetryOutcome::Retry if timed_out => {
                host.up = true;
                host.retry_count = host.retry_count.saturating_add(1);
                host.last_use = now;
            }
            RetryOutcome::Retry => {
                host.up = false;
                host.last_use = now;
            }
            RetryOutcome::Failure => {}
        }
        outcome
    }

    /// Current retry counter of `id`, read under the registry lock.
    pub fn retry_count(&self, id: HostId) -> u32 {
        self.lock().get(id).map(|h| h.retry_count).unwrap_or(0)
    }

    pub fn snapshot(&self) -> Vec<HostSnapshot> {
        let now = Instant::now();
        self.lock()
            .iter()
            .map(|h| HostSnapshot {
                url: h.host.base_url(),
                accept: h.host.accept,
                up: h.up,
                retry_count: h.retry_count,
                since_last_use_ms: now.saturating_duration_since(h.last_use).as_millis() as u64,
            })
            .collect()
    }
}
