//! Host token resolution
//!
//! A host token is what the user typed: `web`, `web.example.com`,
//! `admin@db` or `10.0.0.5`. [`resolve`] turns it into something ssh can
//! connect to by trying, in order, and stopping at the first success:
//!
//! 1. The host as a literal IP address or network: returned unchanged, no lookup.
//! 2. The host as given, but only when it contains a `.`.
//! 3. The host with each candidate domain appended, in list order.
//!
//! Step 2 is skipped for bare labels because unqualified lookups against
//! public resolvers are slow. Private DNS zones that publish bare-label
//! records therefore cannot be reached without a matching candidate domain.
//!
//! Every individual lookup failure is expected and silent; only exhausting
//! all candidates is an error.

use std::net::{IpAddr, ToSocketAddrs};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default upper bound for a single name lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

/// Resolution error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No literal, direct or suffixed candidate resolved
    #[error("Host \"{host}\" is unreachable")]
    HostUnreachable { host: String },
}

/// Name resolution seam
///
/// Returns whether `name` resolves to at least one address. Implementations
/// must not panic or error on failure; a failed lookup is simply `false`.
pub trait HostLookup {
    fn lookup(&self, name: &str) -> bool;
}

impl<F> HostLookup for F
where
    F: Fn(&str) -> bool,
{
    fn lookup(&self, name: &str) -> bool {
        self(name)
    }
}

/// Bounds every lookup of an inner [`HostLookup`] by `timeout`
///
/// Each lookup runs on a worker thread; if it has not answered within
/// `timeout` the candidate counts as unresolved and the thread is abandoned.
#[derive(Debug)]
pub struct TimeoutLookup<L> {
    inner: Arc<L>,
    timeout: Duration,
}

impl<L> TimeoutLookup<L> {
    pub fn new(inner: L, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
        }
    }
}

impl<L> HostLookup for TimeoutLookup<L>
where
    L: HostLookup + Send + Sync + 'static,
{
    fn lookup(&self, name: &str) -> bool {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let target = name.to_string();

        std::thread::spawn(move || {
            let _ = tx.send(inner.lookup(&target));
        });

        match rx.recv_timeout(self.timeout) {
            Ok(resolved) => resolved,
            Err(_) => {
                debug!(name, timeout_ms = self.timeout.as_millis() as u64, "Lookup timed out");
                false
            }
        }
    }
}

/// Unbounded lookup through the operating system resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct OsLookup;

impl HostLookup for OsLookup {
    fn lookup(&self, name: &str) -> bool {
        match (name, 0).to_socket_addrs() {
            Ok(mut addrs) => addrs.next().is_some(),
            Err(e) => {
                debug!(name, error = %e, "Lookup failed");
                false
            }
        }
    }
}

/// Lookup through the operating system resolver, bounded per lookup
#[derive(Debug)]
pub struct SystemLookup {
    inner: TimeoutLookup<OsLookup>,
}

impl SystemLookup {
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: TimeoutLookup::new(OsLookup, timeout),
        }
    }
}

impl Default for SystemLookup {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_TIMEOUT)
    }
}

impl HostLookup for SystemLookup {
    fn lookup(&self, name: &str) -> bool {
        self.inner.lookup(name)
    }
}

/// Resolve `host_token` to a connectable address
///
/// The `user@` prefix, split on the first `@`, is kept and carried into the
/// result. A successful suffixed candidate yields `host_token + "." + domain`.
///
/// # Errors
///
/// Returns [`ResolveError::HostUnreachable`] naming the host without its user
/// prefix when no candidate resolves.
pub fn resolve<L>(host_token: &str, domains: &[String], lookup: &L) -> Result<String, ResolveError>
where
    L: HostLookup + ?Sized,
{
    let host = strip_user(host_token);

    if is_ip_literal(host) {
        debug!(host, "Host is an IP literal");
        return Ok(host_token.to_string());
    }

    if host.contains('.') {
        if lookup.lookup(host) {
            debug!(host, "Host resolved as given");
            return Ok(host_token.to_string());
        }
        debug!(host, "Host did not resolve as given, trying candidate domains");
    }

    domains
        .iter()
        .find(|domain| lookup.lookup(&format!("{host}.{domain}")))
        .map(|domain| {
            debug!(host, domain = %domain, "Host resolved with candidate domain");
            format!("{host_token}.{domain}")
        })
        .ok_or_else(|| ResolveError::HostUnreachable {
            host: host.to_string(),
        })
}

/// Host part of a token, without any `user@` prefix
pub fn strip_user(host_token: &str) -> &str {
    match host_token.split_once('@') {
        Some((_, host)) => host,
        None => host_token,
    }
}

/// Whether `host` is an IPv4/IPv6 address or network (`10.0.0.0/8`).
///
/// Bracketed IPv6 (`[::1]`) and zone-scoped IPv6 (`fe80::1%eth0`) are
/// accepted too.
pub fn is_ip_literal(host: &str) -> bool {
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    let (host, zone) = match host.split_once('%') {
        Some((addr, zone)) => (addr, Some(zone)),
        None => (host, None),
    };
    if zone.is_some_and(|zone| zone.is_empty() || zone.contains('/')) {
        return false;
    }

    let (addr, prefix) = match host.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (host, None),
    };

    let Ok(addr) = addr.parse::<IpAddr>() else {
        return false;
    };

    if zone.is_some() && !addr.is_ipv6() {
        return false;
    }

    match prefix {
        None => true,
        Some(prefix) => {
            let max = if addr.is_ipv4() { 32 } else { 128 };
            prefix.parse::<u8>().is_ok_and(|bits| bits <= max)
        }
    }
}
