mod capture;
mod console;

pub use capture::{CapturingGateway, SentMessage};
pub use console::ConsoleGateway;
