//! Corpus Augmenter
//!
//! Swaps the bodies of spam-labelled rows for real-world spam bodies drawn
//! at random from a `---` separated text file. Destructive: the table is
//! rewritten in place and every run draws again.

use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

use crate::logic::dataset::record::{DESCRIPTION_COLUMN, LABEL_COLUMN};
use crate::logic::dataset::table::Table;
use crate::logic::dataset::DatasetError;

/// Record separator in the body pool file
pub const BODY_DELIMITER: &str = "---";

/// Lines starting with this marker are headers, not body text
pub const SUBJECT_MARKER: &str = "Subject";

#[derive(Debug, thiserror::Error)]
pub enum AugmentError {
    #[error("Error: {0} not found")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("no usable bodies in pool for {0} spam rows")]
    EmptyPool(usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AugmentReport {
    pub total_rows: usize,
    pub spam_rows: usize,
    pub bodies_loaded: usize,
    pub rows_updated: usize,
}

/// Split the pool into bodies, dropping subject lines and blank records
pub fn parse_bodies(content: &str) -> Vec<String> {
    content
        .split(BODY_DELIMITER)
        .map(str::trim)
        .filter(|record| !record.is_empty())
        .map(|record| {
            record
                .lines()
                .filter(|line| !line.trim().starts_with(SUBJECT_MARKER))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|body| !body.is_empty())
        .collect()
}

pub fn load_bodies(path: &Path) -> Result<Vec<String>, AugmentError> {
    if !path.exists() {
        return Err(AugmentError::NotFound(path.to_path_buf()));
    }
    Ok(parse_bodies(&fs::read_to_string(path)?))
}

/// Replace the description of every spam row with a random pool entry
pub fn replace_spam_descriptions<R: Rng + ?Sized>(
    table: &mut Table,
    bodies: &[String],
    rng: &mut R,
) -> Result<AugmentReport, AugmentError> {
    let cols = table.require_columns(&[DESCRIPTION_COLUMN, LABEL_COLUMN])?;
    let (description, label) = (cols[0], cols[1]);

    let mut spam_rows = Vec::new();
    for row in 0..table.len() {
        if table.label(row, label)? {
            spam_rows.push(row);
        }
    }

    if !spam_rows.is_empty() && bodies.is_empty() {
        return Err(AugmentError::EmptyPool(spam_rows.len()));
    }

    for &row in &spam_rows {
        if let Some(body) = bodies.choose(rng) {
            table.set_cell(row, description, body.clone());
        }
    }

    Ok(AugmentReport {
        total_rows: table.len(),
        spam_rows: spam_rows.len(),
        bodies_loaded: bodies.len(),
        rows_updated: spam_rows.len(),
    })
}

/// Load both files, rewrite spam bodies, save the table back in place
pub fn augment_file<R: Rng + ?Sized>(
    table_path: &Path,
    bodies_path: &Path,
    rng: &mut R,
) -> Result<AugmentReport, AugmentError> {
    if !table_path.exists() {
        return Err(AugmentError::NotFound(table_path.to_path_buf()));
    }
    if !bodies_path.exists() {
        return Err(AugmentError::NotFound(bodies_path.to_path_buf()));
    }

    let mut table = Table::read(table_path)?;
    let bodies = load_bodies(bodies_path)?;

    log::info!("Loaded {} email bodies from {}", bodies.len(), bodies_path.display());

    let report = replace_spam_descriptions(&mut table, &bodies, rng)?;
    table.write(table_path)?;

    log::info!(
        "Updated descriptions for {} of {} rows, saved back to {}",
        report.rows_updated,
        report.total_rows,
        table_path.display()
    );
    Ok(report)
}
