//! Spam Triage core library
//!
//! CRM access, corpus tooling, the text classifier and the triage service.

pub mod constants;
pub mod logic;
