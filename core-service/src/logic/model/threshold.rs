//! Spam Threshold Configuration
//!
//! Decides when a classification is confident enough to close a ticket.

use serde::{Deserialize, Serialize};

use super::inference::Classification;
use crate::constants;

/// Threshold Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Confidence must be strictly above this to act (0.0 - 1.0)
    pub base_threshold: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            base_threshold: constants::DEFAULT_SPAM_THRESHOLD,
        }
    }
}

impl ThresholdConfig {
    pub fn new(base: f32) -> Self {
        Self {
            base_threshold: base.clamp(0.0, 1.0),
        }
    }

    pub fn from_env() -> Self {
        Self::new(constants::get_spam_threshold())
    }

    /// Spam label AND confidence strictly above the threshold
    pub fn should_close(&self, classification: &Classification) -> bool {
        classification.is_spam() && classification.confidence > self.base_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::inference::Label;

    fn spam(confidence: f32) -> Classification {
        Classification::new(Label::Spam, confidence)
    }

    #[test]
    fn test_threshold_config() {
        let config = ThresholdConfig::default();
        assert_eq!(config.base_threshold, 0.53);
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let config = ThresholdConfig::default();
        assert!(!config.should_close(&spam(0.53)));
        assert!(config.should_close(&spam(0.5301)));
        assert!(!config.should_close(&spam(0.52)));
    }

    #[test]
    fn test_legitimate_never_closes() {
        let config = ThresholdConfig::new(0.1);
        assert!(!config.should_close(&Classification::new(Label::Legitimate, 0.99)));
        assert!(!config.should_close(&Classification::fallback()));
    }
}
