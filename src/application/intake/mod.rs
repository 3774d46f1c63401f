mod service;
mod sweeper;

pub use service::{IntakeService, ServiceError};
pub use sweeper::SessionSweeper;
