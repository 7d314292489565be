//! Dataset Module - Training corpus collection and preparation
//!
//! Builds the labelled (subject, description, is_spam) table from CRM cases,
//! augments spam rows with sample bodies, and loads it back for training.

pub mod augment;
pub mod corpus;
pub mod record;
pub mod table;


use std::path::PathBuf;

pub use record::LabeledExample;
pub use table::Table;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Training data file {0} not found. Run `spam-triage build-corpus` first to generate the CSV.")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV must have columns: {required:?}. Missing: {missing:?}")]
    MissingColumns {
        required: Vec<String>,
        missing: Vec<String>,
    },
    #[error("row {row}: invalid is_spam value {value:?}")]
    InvalidLabel { row: usize, value: String },
}

/// Load the labelled corpus from a CSV file
pub fn load_examples(path: &std::path::Path) -> Result<Vec<LabeledExample>, DatasetError> {
    log::info!("Loading training data from {}...", path.display());
    Table::read(path)?.to_examples()
}
