use serde::{Deserialize, Serialize};

/// Column holding the case subject
pub const SUBJECT_COLUMN: &str = "Subject";
/// Column holding the case body
pub const DESCRIPTION_COLUMN: &str = "Description";
/// Column holding the boolean spam label
pub const LABEL_COLUMN: &str = "is_spam";

/// Columns every training table must carry
pub const REQUIRED_COLUMNS: [&str; 3] = [SUBJECT_COLUMN, DESCRIPTION_COLUMN, LABEL_COLUMN];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LabeledExample {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub is_spam: bool,
}

impl LabeledExample {
    /// Subject and body joined by a space, missing parts empty, trimmed
    pub fn text(&self) -> String {
        format!(
            "{} {}",
            self.subject.as_deref().unwrap_or(""),
            self.description.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

/// Parse a spam label cell (`True`/`False`, `true`/`false`, `1`/`0`)
pub fn parse_label(value: &str) -> Option<bool> {
    match value.trim() {
        "True" | "true" | "TRUE" | "1" => Some(true),
        "False" | "false" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}

/// Format a spam label cell the way the corpus builder writes it
pub fn format_label(is_spam: bool) -> &'static str {
    if is_spam {
        "True"
    } else {
        "False"
    }
}
