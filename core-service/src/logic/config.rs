use std::path::PathBuf;

use crate::constants;
use crate::logic::model::ThresholdConfig;

/// Settings for one triage run
#[derive(Debug, Clone)]
pub struct TriageConfig {
    pub threshold: ThresholdConfig,
    pub model_path: PathBuf,
    pub vectorizer_path: PathBuf,
    /// Classify and report without closing anything
    pub dry_run: bool,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdConfig::default(),
            model_path: PathBuf::from(constants::DEFAULT_MODEL_PATH),
            vectorizer_path: PathBuf::from(constants::DEFAULT_VECTORIZER_PATH),
            dry_run: false,
        }
    }
}

impl TriageConfig {
    pub fn from_env() -> Self {
        Self {
            threshold: ThresholdConfig::from_env(),
            model_path: PathBuf::from(constants::get_model_path()),
            vectorizer_path: PathBuf::from(constants::get_vectorizer_path()),
            dry_run: constants::is_dry_run(),
        }
    }
}
