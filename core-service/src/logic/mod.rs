//! Logic Module - Business Logic & Engines
//!
//! - `crm/` - CRM session and REST client
//! - `dataset/` - training corpus: build, augment, load
//! - `model/` - TF-IDF + logistic regression, training, artifacts
//! - `triage/` - poll, classify, close

pub mod config;
pub mod crm;
pub mod dataset;
pub mod model;
pub mod triage;
