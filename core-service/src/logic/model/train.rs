//! Classifier Trainer
//!
//! CSV corpus -> text + label -> seeded 80/20 split -> TF-IDF + logistic
//! regression -> held-out report -> two artifacts on disk.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::path::PathBuf;

use super::artifacts::{save_artifacts, ArtifactError};
use super::inference::{Label, SpamClassifier, TrainedClassifier};
use super::logistic::{LogisticConfig, LogisticRegression};
use super::metrics::{classification_report, ClassificationReport};
use super::vectorizer::{TfidfVectorizer, VectorizerConfig};
use crate::constants;
use crate::logic::dataset::{self, DatasetError, LabeledExample};

#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    pub vectorizer_path: PathBuf,
    pub seed: u64,
    pub test_ratio: f32,
    pub vectorizer: VectorizerConfig,
    pub logistic: LogisticConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(constants::DEFAULT_TRAINING_CSV),
            model_path: PathBuf::from(constants::DEFAULT_MODEL_PATH),
            vectorizer_path: PathBuf::from(constants::DEFAULT_VECTORIZER_PATH),
            seed: constants::DEFAULT_TRAIN_SEED,
            test_ratio: constants::DEFAULT_TEST_RATIO,
            vectorizer: VectorizerConfig::default(),
            logistic: LogisticConfig::default(),
        }
    }
}

impl TrainerConfig {
    pub fn from_env() -> Self {
        let seed = constants::get_train_seed();
        Self {
            model_path: PathBuf::from(constants::get_model_path()),
            vectorizer_path: PathBuf::from(constants::get_vectorizer_path()),
            seed,
            vectorizer: VectorizerConfig {
                max_features: constants::get_max_features(),
                ..Default::default()
            },
            logistic: LogisticConfig {
                random_state: seed,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("not enough samples to split: {0}")]
    NotEnoughSamples(usize),
    #[error("training split only contains '{0}' examples")]
    SingleClass(Label),
}

/// Result of one training run
#[derive(Debug)]
pub struct TrainingOutcome {
    pub classifier: TrainedClassifier,
    pub report: ClassificationReport,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Shuffle with the seed, first `ceil(n * ratio)` indices are the test set
pub fn train_test_split(n: usize, test_ratio: f32, seed: u64) -> Result<(Vec<usize>, Vec<usize>), TrainError> {
    let n_test = ((n as f32) * test_ratio).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(TrainError::NotEnoughSamples(n));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Fit and evaluate on an in-memory corpus
    pub fn train(&self, examples: &[LabeledExample]) -> Result<TrainingOutcome, TrainError> {
        let texts: Vec<String> = examples.iter().map(LabeledExample::text).collect();
        let labels: Vec<Label> = examples.iter().map(|e| Label::from_is_spam(e.is_spam)).collect();

        let spam = labels.iter().filter(|l| **l == Label::Spam).count();
        log::info!("Training data: {} samples", examples.len());
        log::info!("Spam: {}", spam);
        log::info!("Legitimate: {}", labels.len() - spam);

        let (train_idx, test_idx) = train_test_split(examples.len(), self.config.test_ratio, self.config.seed)?;

        let train_texts: Vec<String> = train_idx.iter().map(|&i| texts[i].clone()).collect();
        let train_labels: Vec<Label> = train_idx.iter().map(|&i| labels[i]).collect();

        if let Some(first) = train_labels.first() {
            if train_labels.iter().all(|l| l == first) {
                return Err(TrainError::SingleClass(*first));
            }
        }

        log::info!("Training TF-IDF vectorizer...");
        let vectorizer = TfidfVectorizer::fit(self.config.vectorizer.clone(), &train_texts);
        let train_rows = vectorizer.transform_batch(&train_texts);

        log::info!("Training logistic regression model...");
        let targets: Vec<f32> = train_labels.iter().map(Label::target).collect();
        let mut model = LogisticRegression::new(vectorizer.num_features(), self.config.logistic.clone());
        model.fit(&train_rows, &targets);

        let classifier = TrainedClassifier::new(vectorizer, model);

        let y_true: Vec<Label> = test_idx.iter().map(|&i| labels[i]).collect();
        let y_pred: Vec<Label> = test_idx
            .iter()
            .map(|&i| classifier.classify(&texts[i]).label)
            .collect();

        Ok(TrainingOutcome {
            report: classification_report(&y_true, &y_pred),
            classifier,
            train_indices: train_idx,
            test_indices: test_idx,
        })
    }

    /// Load the CSV, train, print the report, persist artifacts
    pub fn run(&self) -> Result<TrainingOutcome, TrainError> {
        let examples = dataset::load_examples(&self.config.data_path)?;
        let outcome = self.train(&examples)?;

        println!("\nModel accuracy: {:.2}%", outcome.report.accuracy * 100.0);
        println!("\nClassification report:");
        println!("{}", outcome.report);

        save_artifacts(&outcome.classifier, &self.config.model_path, &self.config.vectorizer_path)?;
        Ok(outcome)
    }
}
