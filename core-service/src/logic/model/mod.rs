//! Model Module - text classifier
//!
//! TF-IDF features, logistic regression, training, persisted artifacts and
//! the inference seam used by the triage service.

pub mod artifacts;
pub mod inference;
pub mod logistic;
pub mod metrics;
pub mod stop_words;
pub mod threshold;
pub mod train;
pub mod vectorizer;

// Re-export common types
pub use artifacts::{load_artifacts, save_artifacts, ArtifactError};
pub use inference::{ticket_text, Classification, InferenceError, Label, SpamClassifier, TrainedClassifier};
pub use threshold::ThresholdConfig;
pub use train::{TrainError, Trainer, TrainerConfig, TrainingOutcome};
pub use vectorizer::{TfidfVectorizer, VectorizerConfig};
