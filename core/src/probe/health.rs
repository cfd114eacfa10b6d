//! Liveness probe: a single bounded TCP connect.
//!
//! A service is `Running` when something accepts a connection on its port
//! and `Down` otherwise. The socket is dropped as soon as the connect
//! completes; no data is exchanged.
//!
//! Name resolution counts against the same timeout as the connect. Host
//! names are resolved on a short-lived helper thread so a hung resolver
//! cannot hold the caller past its budget.

use std::io;
use std::net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use crate::types::service::{ServiceDescriptor, ServiceStatus};


/// Something that can classify a service as up or down.
pub trait HealthCheck: Send + Sync {
    fn check(&self, service: &ServiceDescriptor) -> ServiceStatus;
}


/// Turns a host name into socket addresses. May block.
pub trait Resolver: Send + Sync {
    fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>>;
}


/// Resolver backed by the system (`getaddrinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;


impl Resolver for SystemResolver {
    fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
        Ok((host, port).to_socket_addrs()?.collect())
    }
}


/// Production health check backed by [`probe_with`].
#[derive(Clone)]
pub struct TcpProbe {
    pub timeout: Duration,
    resolver: Arc<dyn Resolver>,
}


impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self::with_resolver(timeout, Arc::new(SystemResolver))
    }

    pub fn with_resolver(timeout: Duration, resolver: Arc<dyn Resolver>) -> Self {
        TcpProbe { timeout, resolver }
    }
}


impl HealthCheck for TcpProbe {
    fn check(&self, service: &ServiceDescriptor) -> ServiceStatus {
        probe_with(&self.resolver, &service.host, service.port, self.timeout)
    }
}


/// Attempt one TCP connection to `host:port` using the system resolver.
pub fn probe(host: &str, port: u16, timeout: Duration) -> ServiceStatus {
    let resolver: Arc<dyn Resolver> = Arc::new(SystemResolver);
    probe_with(&resolver, host, port, timeout)
}


/// Attempt one TCP connection to `host:port` within `timeout`.
///
/// Resolution and every connect attempt share the budget. Resolution
/// failures, refused connections and expired budgets all map to `Down`.
/// There is no retry.
pub fn probe_with(
    resolver: &Arc<dyn Resolver>,
    host: &str,
    port: u16,
    timeout: Duration,
) -> ServiceStatus {
    let deadline = Instant::now() + timeout;
    let addrs = match resolve_within(resolver, host, port, timeout) {
        Some(addrs) => addrs,
        None => return ServiceStatus::Down,
    };

    for addr in addrs {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        if TcpStream::connect_timeout(&addr, remaining).is_ok() {
            return ServiceStatus::Running;
        }
    }
    ServiceStatus::Down
}


/// Resolve `host`, giving up after `timeout`. IP literals skip the helper
/// thread. A resolver that outlives the budget is left to finish on its own.
fn resolve_within(
    resolver: &Arc<dyn Resolver>,
    host: &str,
    port: u16,
    timeout: Duration,
) -> Option<Vec<SocketAddr>> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Some(vec![SocketAddr::new(ip, port)]);
    }
    if timeout.is_zero() {
        return None;
    }

    let (sender, receiver) = mpsc::channel();
    let resolver = Arc::clone(resolver);
    let owned_host = host.to_string();
    let spawned = thread::Builder::new()
        .name("resolve".into())
        .spawn(move || {
            let _ = sender.send(resolver.resolve(&owned_host, port));
        });
    if let Err(e) = spawned {
        tracing::warn!(host, error = %e, "cannot spawn resolver thread");
        return None;
    }

    match receiver.recv_timeout(timeout) {
        Ok(Ok(addrs)) => Some(addrs),
        Ok(Err(_)) => None,
        Err(_) => {
            tracing::debug!(host, ?timeout, "name resolution timed out");
            None
        }
    }
}
