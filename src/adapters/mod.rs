//! Adapters - concrete implementations of the ports.
//!
//! In-process implementations suitable for a single-instance
//! deployment, plus capturing doubles for tests and the console demo.

pub mod catalog;
pub mod directory;
pub mod messaging;
pub mod quotes;
pub mod state;
