//! Triage Module - poll, classify, close
//!
//! - `service` - the triage service and its state machine
//! - `stats` - per-run counters

pub mod service;
pub mod stats;

#[cfg(test)]
mod tests;

pub use service::{InitError, ServiceState, TicketOutcome, TriageService};
pub use stats::TriageStats;
