//! Infrastructure seams for talking to the outside world.
//!
//! `runner` wraps process spawning behind the `CommandRunner` trait so the
//! revision probe can be exercised without a real `git`.

pub mod runner;
