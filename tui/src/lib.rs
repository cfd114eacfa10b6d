//! svcwatch terminal UI.
//!
//! # Modules
//!
//! - [`dashboard`]: service table and summary widgets
//! - [`theme`]: dashboard colors
//! - [`tui`]: terminal ownership, the `Renderer` impl, keyboard input

pub mod dashboard;
pub mod theme;
pub mod tui;
