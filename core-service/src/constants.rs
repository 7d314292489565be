//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden from the environment (or a `.env` file).

/// Default CRM login endpoint
pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";

/// Fixed CRM instance used when only a cached access token is available
pub const DEFAULT_INSTANCE_URL: &str = "https://orgfarm-dev-ed.develop.my.salesforce.com";

/// Default CRM REST/SOAP API version
pub const DEFAULT_API_VERSION: &str = "59.0";

/// HTTP timeout for CRM calls (seconds)
pub const DEFAULT_HTTP_TIMEOUT: u64 = 30;

/// Close a ticket only when spam confidence is strictly above this
pub const DEFAULT_SPAM_THRESHOLD: f32 = 0.53;

/// Seed used for the train/test split and SGD shuffling
pub const DEFAULT_TRAIN_SEED: u64 = 42;

/// Held-out fraction of the labelled corpus
pub const DEFAULT_TEST_RATIO: f32 = 0.2;

/// TF-IDF vocabulary cap
pub const DEFAULT_MAX_FEATURES: usize = 1000;

/// Upper bound of the n-gram range (lower bound is always 1)
pub const DEFAULT_MAX_NGRAM: usize = 3;

/// Number of historical tickets pulled by the corpus builder
pub const DEFAULT_MAX_TICKETS: usize = 1000;

/// Subjects starting with this prefix come from the marketing-automation system
pub const DEFAULT_KNOWN_GOOD_PREFIX: &str = "Pardot";

pub const DEFAULT_MODEL_PATH: &str = "models/spam_model.json";
pub const DEFAULT_VECTORIZER_PATH: &str = "models/tfidf_vectorizer.json";
pub const DEFAULT_TRAINING_CSV: &str = "training-data/training_data.csv";
pub const DEFAULT_BODIES_FILE: &str = "models/b2b_healthcare_emails.txt";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Spam Triage";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get CRM login URL from environment or use default
pub fn get_login_url() -> String {
    std::env::var("SF_LOGIN_URL")
        .unwrap_or_else(|_| DEFAULT_LOGIN_URL.to_string())
}

/// Get the fixed CRM instance URL from environment or use default
pub fn get_instance_url() -> String {
    std::env::var("SF_INSTANCE_URL")
        .unwrap_or_else(|_| DEFAULT_INSTANCE_URL.to_string())
}

/// Get CRM API version from environment or use default
pub fn get_api_version() -> String {
    std::env::var("SF_API_VERSION")
        .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string())
}

/// Get spam confidence threshold from environment or use default
pub fn get_spam_threshold() -> f32 {
    std::env::var("SPAM_CONFIDENCE_THRESHOLD")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SPAM_THRESHOLD)
}

/// Get training seed from environment or use default
pub fn get_train_seed() -> u64 {
    std::env::var("SPAM_TRAIN_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TRAIN_SEED)
}

/// Get TF-IDF vocabulary cap from environment or use default
pub fn get_max_features() -> usize {
    std::env::var("SPAM_MAX_FEATURES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_FEATURES)
}

/// Get model artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("SPAM_MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get vectorizer artifact path from environment or use default
pub fn get_vectorizer_path() -> String {
    std::env::var("SPAM_VECTORIZER_PATH")
        .unwrap_or_else(|_| DEFAULT_VECTORIZER_PATH.to_string())
}

/// Check if triage runs without closing tickets
pub fn is_dry_run() -> bool {
    std::env::var("SPAM_DRY_RUN")
        .map(|s| s.to_lowercase() == "true" || s == "1")
        .unwrap_or(false)
}
