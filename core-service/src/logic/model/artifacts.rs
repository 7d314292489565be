//! Model artifact persistence.
//!
//! The vectorizer and the classifier are written as two JSON files. Both
//! carry the training run id, and the model records the vocabulary
//! fingerprint it was fitted against; a pair from different runs is refused.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::inference::TrainedClassifier;
use super::logistic::LogisticRegression;
use super::vectorizer::TfidfVectorizer;

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub run_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub vocabulary_fingerprint: String,
    pub model: LogisticRegression,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VectorizerArtifact {
    pub run_id: Uuid,
    pub vectorizer: TfidfVectorizer,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Model file {0} not found. Run `spam-triage train` first.")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Artifacts come from different training runs (model {model}, vectorizer {vectorizer})")]
    RunMismatch { model: Uuid, vectorizer: Uuid },
    #[error("Vocabulary fingerprint mismatch: model expects {expected}, vectorizer has {actual}")]
    FingerprintMismatch { expected: String, actual: String },
    #[error("Model expects {model} features, vectorizer produces {vectorizer}")]
    DimensionMismatch { model: usize, vectorizer: usize },
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }
    Ok(serde_json::from_slice(&fs::read(path)?)?)
}

/// Write both artifacts, overwriting previous ones
pub fn save_artifacts(
    classifier: &TrainedClassifier,
    model_path: &Path,
    vectorizer_path: &Path,
) -> Result<(), ArtifactError> {
    write_json(
        &ModelArtifact {
            run_id: classifier.run_id,
            trained_at: classifier.trained_at,
            vocabulary_fingerprint: classifier.vectorizer.fingerprint(),
            model: classifier.model.clone(),
        },
        model_path,
    )?;
    write_json(
        &VectorizerArtifact {
            run_id: classifier.run_id,
            vectorizer: classifier.vectorizer.clone(),
        },
        vectorizer_path,
    )?;

    log::info!("Model saved as {}", model_path.display());
    log::info!("Vectorizer saved as {}", vectorizer_path.display());
    Ok(())
}

/// Load and cross-check both artifacts
pub fn load_artifacts(model_path: &Path, vectorizer_path: &Path) -> Result<TrainedClassifier, ArtifactError> {
    let model: ModelArtifact = read_json(model_path)?;
    let vectorizer: VectorizerArtifact = read_json(vectorizer_path)?;

    if model.run_id != vectorizer.run_id {
        return Err(ArtifactError::RunMismatch {
            model: model.run_id,
            vectorizer: vectorizer.run_id,
        });
    }

    let actual = vectorizer.vectorizer.fingerprint();
    if actual != model.vocabulary_fingerprint {
        return Err(ArtifactError::FingerprintMismatch {
            expected: model.vocabulary_fingerprint,
            actual,
        });
    }

    if model.model.num_features() != vectorizer.vectorizer.num_features() {
        return Err(ArtifactError::DimensionMismatch {
            model: model.model.num_features(),
            vectorizer: vectorizer.vectorizer.num_features(),
        });
    }

    Ok(TrainedClassifier {
        run_id: model.run_id,
        trained_at: model.trained_at,
        vectorizer: vectorizer.vectorizer,
        model: model.model,
    })
}
