//! Per-run triage counters. In-memory only, reset every invocation.

use chrono::{DateTime, Local};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TriageStats {
    pub total_processed: u64,
    pub spam_closed: u64,
    pub legitimate_kept: u64,
    pub start_time: DateTime<Local>,
}

impl Default for TriageStats {
    fn default() -> Self {
        Self {
            total_processed: 0,
            spam_closed: 0,
            legitimate_kept: 0,
            start_time: Local::now(),
        }
    }
}

impl TriageStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed tickets as a percentage of processed ones
    pub fn spam_rate(&self) -> f64 {
        if self.total_processed == 0 {
            return 0.0;
        }
        self.spam_closed as f64 / self.total_processed as f64 * 100.0
    }

    /// One-line summary printed after a cycle
    pub fn summary(&self) -> String {
        format!(
            "Stats: {} processed, {} closed, {:.1}% spam rate",
            self.total_processed,
            self.spam_closed,
            self.spam_rate()
        )
    }
}

impl std::fmt::Display for TriageStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Final Stats:")?;
        writeln!(f, "Started at: {}", self.start_time.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "Total processed: {}", self.total_processed)?;
        writeln!(f, "Spam closed: {}", self.spam_closed)?;
        write!(f, "Legitimate kept: {}", self.legitimate_kept)
    }
}
