//! Inference Engine - ticket text to spam/legitimate decision
//!
//! `SpamClassifier` is the seam: anything that yields P(spam) for a text gets
//! label, confidence and reason derivation plus the fail-safe fallback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::logistic::LogisticRegression;
use super::vectorizer::TfidfVectorizer;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Two-valued class label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Legitimate,
    Spam,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Legitimate => "legitimate",
            Label::Spam => "spam",
        }
    }

    pub fn from_is_spam(is_spam: bool) -> Self {
        if is_spam {
            Label::Spam
        } else {
            Label::Legitimate
        }
    }

    /// Regression target
    pub fn target(&self) -> f32 {
        match self {
            Label::Legitimate => 0.0,
            Label::Spam => 1.0,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification output for one ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: Label,
    /// Probability of `label` itself (0.0 - 1.0)
    pub confidence: f32,
    pub reason: String,
}

impl Classification {
    pub fn new(label: Label, confidence: f32) -> Self {
        Self {
            label,
            confidence,
            reason: format!(
                "ML model prediction: {} ({:.1}% confidence)",
                label,
                confidence * 100.0
            ),
        }
    }

    /// Uncertain tickets are kept: legitimate, zero confidence
    pub fn fallback() -> Self {
        Self {
            label: Label::Legitimate,
            confidence: 0.0,
            reason: "Classification error".to_string(),
        }
    }

    /// Derive label and confidence from P(spam)
    pub fn from_spam_probability(p_spam: f32) -> Self {
        if p_spam > 0.5 {
            Self::new(Label::Spam, p_spam)
        } else {
            Self::new(Label::Legitimate, 1.0 - p_spam)
        }
    }

    pub fn is_spam(&self) -> bool {
        self.label == Label::Spam
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum InferenceError {
    #[error("feature index {index} outside model input space ({features} features)")]
    FeatureMismatch { index: u32, features: usize },
    #[error("invalid probability {0}")]
    InvalidProbability(f32),
    #[error("{0}")]
    Other(String),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

pub trait SpamClassifier {
    /// Probability that `text` is spam
    fn spam_probability(&self, text: &str) -> Result<f32, InferenceError>;

    /// Classify, absorbing any failure into `Classification::fallback()`
    fn classify(&self, text: &str) -> Classification {
        match self.spam_probability(text) {
            Ok(p) if p.is_finite() && (0.0..=1.0).contains(&p) => {
                Classification::from_spam_probability(p)
            }
            Ok(p) => {
                log::error!("Error in classification: {}", InferenceError::InvalidProbability(p));
                Classification::fallback()
            }
            Err(e) => {
                log::error!("Error in classification: {}", e);
                Classification::fallback()
            }
        }
    }
}

/// Text the classifier sees for a ticket: subject, a space, body
pub fn ticket_text(subject: Option<&str>, description: Option<&str>) -> String {
    format!("{} {}", subject.unwrap_or("No Subject"), description.unwrap_or(""))
}

// ============================================================================
// TF-IDF + LOGISTIC REGRESSION
// ============================================================================

/// Vectorizer and model from one training run
#[derive(Debug, Clone)]
pub struct TrainedClassifier {
    pub run_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub vectorizer: TfidfVectorizer,
    pub model: LogisticRegression,
}

impl TrainedClassifier {
    pub fn new(vectorizer: TfidfVectorizer, model: LogisticRegression) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            vectorizer,
            model,
        }
    }
}

impl SpamClassifier for TrainedClassifier {
    fn spam_probability(&self, text: &str) -> Result<f32, InferenceError> {
        let row = self.vectorizer.transform(text);

        if let Some((index, _)) = row.0.iter().find(|(idx, _)| *idx as usize >= self.model.num_features()) {
            return Err(InferenceError::FeatureMismatch {
                index: *index,
                features: self.model.num_features(),
            });
        }

        Ok(self.model.predict_proba(&row))
    }
}
