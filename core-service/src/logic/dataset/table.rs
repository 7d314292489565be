use std::fs;
use std::path::Path;

use crate::logic::dataset::record::{format_label, parse_label, LabeledExample, REQUIRED_COLUMNS};
use crate::logic::dataset::DatasetError;

/// Header + rows of a delimiter-separated training table.
///
/// Empty cells are missing values. Columns the pipeline does not know
/// about are carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Read a CSV file with a header row
    pub fn read(path: &Path) -> Result<Self, DatasetError> {
        if !path.exists() {
            return Err(DatasetError::NotFound(path.to_path_buf()));
        }

        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let headers = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Write the table as CSV, creating the parent directory if needed
    pub fn write(&self, path: &Path) -> Result<(), DatasetError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Resolve column indexes, failing with every missing name at once
    pub fn require_columns(&self, names: &[&str]) -> Result<Vec<usize>, DatasetError> {
        let missing: Vec<String> = names
            .iter()
            .filter(|name| self.column(name).is_none())
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(DatasetError::MissingColumns {
                required: names.iter().map(|n| n.to_string()).collect(),
                missing,
            });
        }

        Ok(names.iter().filter_map(|name| self.column(name)).collect())
    }

    /// Cell value, `None` when empty
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: String) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }

    /// Spam label of one row
    pub fn label(&self, row: usize, label_col: usize) -> Result<bool, DatasetError> {
        let value = self.cell(row, label_col).unwrap_or("");
        parse_label(value).ok_or_else(|| DatasetError::InvalidLabel {
            row: row + 1,
            value: value.to_string(),
        })
    }

    /// Build the three-column training table
    pub fn from_examples(examples: &[LabeledExample]) -> Self {
        let mut table = Self::new(REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect());
        for example in examples {
            table.push_row(vec![
                example.subject.clone().unwrap_or_default(),
                example.description.clone().unwrap_or_default(),
                format_label(example.is_spam).to_string(),
            ]);
        }
        table
    }

    /// Extract labelled examples; the required columns must be present
    pub fn to_examples(&self) -> Result<Vec<LabeledExample>, DatasetError> {
        let cols = self.require_columns(&REQUIRED_COLUMNS)?;
        let (subject, description, label) = (cols[0], cols[1], cols[2]);

        (0..self.len())
            .map(|row| {
                Ok(LabeledExample {
                    subject: self.cell(row, subject).map(str::to_string),
                    description: self.cell(row, description).map(str::to_string),
                    is_spam: self.label(row, label)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::dataset::record::{DESCRIPTION_COLUMN, LABEL_COLUMN, SUBJECT_COLUMN};

    #[test]
    fn test_require_columns_names_all_missing() {
        let table = Table::new(vec![SUBJECT_COLUMN.to_string()]);

        match table.require_columns(&REQUIRED_COLUMNS) {
            Err(DatasetError::MissingColumns { missing, .. }) => {
                assert_eq!(missing, vec![DESCRIPTION_COLUMN.to_string(), LABEL_COLUMN.to_string()]);
            }
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_cells_are_missing() {
        let mut table = Table::new(REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect());
        table.push_row(vec!["Hello".into(), "".into(), "False".into()]);

        let examples = table.to_examples().unwrap();
        assert_eq!(examples[0].subject.as_deref(), Some("Hello"));
        assert_eq!(examples[0].description, None);
        assert!(!examples[0].is_spam);
        assert_eq!(examples[0].text(), "Hello");
    }

    #[test]
    fn test_invalid_label_reports_row() {
        let mut table = Table::new(REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect());
        table.push_row(vec!["a".into(), "b".into(), "True".into()]);
        table.push_row(vec!["c".into(), "d".into(), "maybe".into()]);

        match table.to_examples() {
            Err(DatasetError::InvalidLabel { row, value }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "maybe");
            }
            other => panic!("Expected InvalidLabel, got {:?}", other),
        }
    }
}
