//! Watcher: the per-service polling loop.
//!
//! Each watcher owns one descriptor for its whole life. The revision is
//! resolved once, when the watcher is primed; after that every cycle is
//! probe -> timestamp -> publish -> sleep until the stop flag is raised or
//! the aggregator goes away.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::monitor::aggregator::AggregatorHandle;
use crate::probe::health::HealthCheck;
use crate::probe::revision::RevisionProbe;
use crate::types::service::{Revision, ServiceDescriptor, ServiceSnapshot};

/// Granularity at which a sleeping watcher notices the stop flag.
const STOP_POLL: Duration = Duration::from_millis(50);


/// Shared cancellation signal for all watchers.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);


impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`, waking early if the flag is raised.
    /// Returns true if the flag was raised.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_raised() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return self.is_raised();
            }
            thread::sleep(remaining.min(STOP_POLL));
        }
    }
}


/// Polls one service and publishes what it sees.
pub struct Watcher {
    service: ServiceDescriptor,
    health: Arc<dyn HealthCheck>,
    revisions: RevisionProbe,
    interval: Duration,
    revision: Option<Revision>,
}


impl Watcher {
    pub fn new(
        service: ServiceDescriptor,
        health: Arc<dyn HealthCheck>,
        revisions: RevisionProbe,
        interval: Duration,
    ) -> Self {
        Watcher {
            service,
            health,
            revisions,
            interval,
            revision: None,
        }
    }

    pub fn service(&self) -> &ServiceDescriptor {
        &self.service
    }

    /// Resolve the revision and take the first observation synchronously.
    pub fn prime(&mut self) -> ServiceSnapshot {
        self.observe()
    }

    /// Take one observation. The revision query only runs the first time.
    pub fn observe(&mut self) -> ServiceSnapshot {
        let revisions = &self.revisions;
        let service = &self.service;
        let revision = self
            .revision
            .get_or_insert_with(|| revisions.revision(service))
            .clone();
        let status = self.health.check(&self.service);
        ServiceSnapshot::new(&self.service.name, status, revision)
    }

    /// Move the watcher onto its own thread.
    pub fn spawn(self, handle: AggregatorHandle, stop: StopFlag) -> Result<JoinHandle<()>, String> {
        let name = format!("watch-{}", self.service.name);
        thread::Builder::new()
            .name(name)
            .spawn(move || self.run(handle, stop))
            .map_err(|e| format!("Failed to spawn watcher: {}", e))
    }

    fn run(mut self, handle: AggregatorHandle, stop: StopFlag) {
        tracing::debug!(service = %self.service.name, "watcher started");
        while !stop.is_raised() {
            let snapshot = self.observe();
            if let Err(e) = handle.publish(snapshot) {
                tracing::debug!(service = %self.service.name, error = %e, "aggregator gone");
                break;
            }
            if stop.sleep(self.interval) {
                break;
            }
        }
        tracing::debug!(service = %self.service.name, "watcher stopped");
    }
}
