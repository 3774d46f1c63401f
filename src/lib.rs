//! Labquote - Conversational quote intake for a medical laboratory.
//!
//! This crate implements the multi-turn "presupuesto" intake protocol:
//! patient identification and verification, study search against the
//! priced catalog, cart building, and quote confirmation.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
