//! Application layer - orchestration around the domain workflow.
//!
//! Owns delivery concerns the workflow core stays free of: the typing
//! indicator, mapping effects onto gateway calls, and background
//! expiry of abandoned conversations.

pub mod intake;

pub use intake::{IntakeService, ServiceError, SessionSweeper};
