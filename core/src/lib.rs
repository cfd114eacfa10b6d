//! svcwatch core: watch a fixed list of local services and report liveness
//! and checked-out branch.
//!
//! # Modules
//!
//! - [`config`]: `services.yml` loading and timing defaults
//! - [`infrastructure`]: command runner seam
//! - [`monitor`]: watchers, aggregator, and the monitoring session
//! - [`probe`]: TCP health probe and git revision probe
//! - [`types`]: descriptors, statuses, snapshots

pub mod config;
pub mod infrastructure;
pub mod monitor;
pub mod probe;
pub mod types;
