//! Monitoring session: wires watchers to an aggregator and runs until shutdown.
//!
//! Startup primes every watcher in parallel so the first frame already shows
//! real statuses and branches, then hands each watcher its own thread. The
//! aggregator loop runs on the calling thread; when it returns, the stop flag
//! is raised and every watcher is joined.

use std::sync::Arc;
use std::thread;

use crate::config::MonitorConfig;
use crate::monitor::aggregator::{Aggregator, Renderer};
use crate::monitor::watcher::{StopFlag, Watcher};
use crate::probe::health::HealthCheck;
use crate::probe::revision::RevisionProbe;
use crate::types::service::{ServiceDescriptor, ServiceSnapshot};


pub struct Monitor {
    config: MonitorConfig,
    health: Arc<dyn HealthCheck>,
    revisions: RevisionProbe,
}


impl Monitor {
    pub fn new(config: MonitorConfig, health: Arc<dyn HealthCheck>, revisions: RevisionProbe) -> Self {
        Monitor {
            config,
            health,
            revisions,
        }
    }

    /// One watcher per service, in config order.
    pub fn watchers(&self, services: &[ServiceDescriptor]) -> Vec<Watcher> {
        services
            .iter()
            .map(|service| {
                Watcher::new(
                    service.clone(),
                    Arc::clone(&self.health),
                    self.revisions.clone(),
                    self.config.interval,
                )
            })
            .collect()
    }

    /// Seed the aggregator, start watchers, and block until shutdown.
    pub fn run<R: Renderer>(&self, aggregator: &mut Aggregator<R>) -> Result<(), String> {
        let mut watchers = self.watchers(aggregator.services());
        let seed = prime_all(&mut watchers)?;
        aggregator.seed(seed);

        let stop = StopFlag::new();
        let mut threads = Vec::with_capacity(watchers.len());
        for watcher in watchers {
            match watcher.spawn(aggregator.handle(), stop.clone()) {
                Ok(thread) => threads.push(thread),
                Err(e) => {
                    stop.raise();
                    join_all(threads);
                    return Err(e);
                }
            }
        }
        tracing::info!(services = threads.len(), "monitoring started");

        aggregator.run();

        stop.raise();
        join_all(threads);
        tracing::info!("monitoring stopped");
        Ok(())
    }
}


/// Prime all watchers concurrently, returning snapshots in watcher order.
fn prime_all(watchers: &mut [Watcher]) -> Result<Vec<ServiceSnapshot>, String> {
    thread::scope(|scope| {
        let pending: Vec<_> = watchers
            .iter_mut()
            .map(|watcher| scope.spawn(move || watcher.prime()))
            .collect();
        pending
            .into_iter()
            .map(|p| p.join().map_err(|_| "watcher panicked during startup".to_string()))
            .collect()
    })
}


fn join_all(threads: Vec<thread::JoinHandle<()>>) {
    for thread in threads {
        if thread.join().is_err() {
            tracing::warn!("watcher thread panicked");
        }
    }
}
