//! Monitoring subsystem: per-service watchers feeding a single aggregator.
//!
//! The `watcher` module runs one polling loop per service.
//! The `aggregator` module owns the status table and decides when to render.
//! The `session` module primes the watchers, starts them, and runs the
//! aggregator until shutdown.

pub mod aggregator;
pub mod session;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;
