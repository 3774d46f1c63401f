//! Domain layer - business logic with no infrastructure dependencies.

pub mod catalog;
pub mod foundation;
pub mod intake;
