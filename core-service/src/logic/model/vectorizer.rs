//! TF-IDF Vectorizer
//!
//! Lowercased word tokens (2+ word characters), English stop words removed,
//! contiguous n-grams, vocabulary capped by corpus frequency, smooth IDF and
//! L2-normalised rows.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};

use super::stop_words::is_stop_word;
use crate::constants;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Sparse feature row: `(column, value)` pairs sorted by column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector(pub Vec<(u32, f32)>);

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.0.iter().map(|(_, v)| v * v).sum::<f32>().sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    pub max_features: usize,
    /// Inclusive `(min_n, max_n)`
    pub ngram_range: (usize, usize),
    pub lowercase: bool,
    pub remove_stop_words: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: constants::DEFAULT_MAX_FEATURES,
            ngram_range: (1, constants::DEFAULT_MAX_NGRAM),
            lowercase: true,
            remove_stop_words: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    vocabulary: BTreeMap<String, u32>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Learn vocabulary and IDF weights from the training documents
    pub fn fit(config: VectorizerConfig, documents: &[String]) -> Self {
        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let terms = analyze(&config, doc);
            let mut seen = HashMap::new();
            for term in terms {
                *seen.entry(term).or_insert(0usize) += 1;
            }
            for (term, count) in seen {
                *term_counts.entry(term.clone()).or_default() += count;
                *doc_freq.entry(term).or_default() += 1;
            }
        }

        // Most frequent first, alphabetical on ties
        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(config.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let n = documents.len() as f32;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(terms.len());
        for (idx, term) in terms.into_iter().enumerate() {
            let df = doc_freq.get(&term).copied().unwrap_or(0) as f32;
            idf.push(((1.0 + n) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term, idx as u32);
        }

        Self {
            config,
            vocabulary,
            idf,
        }
    }

    /// Vectorize one document against the learned vocabulary
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<u32, f32> = BTreeMap::new();
        for term in analyze(&self.config, document) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut row: Vec<(u32, f32)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx as usize]))
            .collect();

        let norm = row.iter().map(|(_, v)| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, v) in &mut row {
                *v /= norm;
            }
        }

        SparseVector(row)
    }

    pub fn transform_batch(&self, documents: &[String]) -> Vec<SparseVector> {
        documents.iter().map(|d| self.transform(d)).collect()
    }

    pub fn num_features(&self) -> usize {
        self.idf.len()
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, u32> {
        &self.vocabulary
    }

    /// SHA-256 over the vocabulary in column order
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (term, idx) in &self.vocabulary {
            hasher.update(idx.to_le_bytes());
            hasher.update(term.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }
}

/// Tokenize and expand into n-grams
fn analyze(config: &VectorizerConfig, document: &str) -> Vec<String> {
    let text = if config.lowercase {
        document.to_lowercase()
    } else {
        document.to_string()
    };

    let tokens: Vec<&str> = TOKEN_RE
        .find_iter(&text)
        .map(|m| m.as_str())
        .filter(|t| !(config.remove_stop_words && is_stop_word(t)))
        .collect();

    let (min_n, max_n) = config.ngram_range;
    let mut terms = Vec::new();
    for n in min_n.max(1)..=max_n {
        if tokens.len() < n {
            break;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<String> {
        vec![
            "Win a free prize now".to_string(),
            "Free prize inside, claim your free gift".to_string(),
            "Pardot bounce report for March".to_string(),
        ]
    }

    #[test]
    fn test_analyze_drops_stop_words_and_short_tokens() {
        let config = VectorizerConfig {
            ngram_range: (1, 2),
            ..Default::default()
        };
        let terms = analyze(&config, "Win a FREE prize now!");
        assert_eq!(terms, vec!["win", "free", "prize", "win free", "free prize"]);
    }

    #[test]
    fn test_trigrams_included() {
        let terms = analyze(&VectorizerConfig::default(), "claim free prize");
        assert!(terms.contains(&"claim free prize".to_string()));
    }

    #[test]
    fn test_rows_are_l2_normalised() {
        let vectorizer = TfidfVectorizer::fit(VectorizerConfig::default(), &docs());
        let row = vectorizer.transform("free prize for you");
        assert!(!row.is_empty());
        assert!((row.norm() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_text_is_empty_row() {
        let vectorizer = TfidfVectorizer::fit(VectorizerConfig::default(), &docs());
        assert!(vectorizer.transform("zzz qqq").is_empty());
        assert!(vectorizer.transform("").is_empty());
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let config = VectorizerConfig {
            max_features: 2,
            ngram_range: (1, 1),
            ..Default::default()
        };
        let vectorizer = TfidfVectorizer::fit(config, &docs());
        let vocab: Vec<&String> = vectorizer.vocabulary().keys().collect();
        assert_eq!(vocab, vec!["free", "prize"]);
        assert_eq!(vectorizer.num_features(), 2);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = TfidfVectorizer::fit(VectorizerConfig::default(), &docs());
        let b = TfidfVectorizer::fit(VectorizerConfig::default(), &docs());
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }
}
