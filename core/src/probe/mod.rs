//! Probes: one-shot observations of a single service.
//!
//! The `health` module answers "is something listening on the port".
//! The `revision` module answers "which branch is checked out".

pub mod health;
pub mod revision;
