//! Training Corpus Builder
//!
//! Pulls the most recent cases from the CRM and labels them with the
//! subject-prefix heuristic: anything not sent by the marketing-automation
//! system is treated as spam.

use std::path::PathBuf;

use crate::constants;
use crate::logic::crm::{CrmClient, CrmCredentials, CrmError, Ticket};
use crate::logic::dataset::record::LabeledExample;
use crate::logic::dataset::table::Table;
use crate::logic::dataset::DatasetError;

/// Corpus builder settings
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    pub max_tickets: usize,
    pub known_good_prefix: String,
    pub output_path: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            max_tickets: constants::DEFAULT_MAX_TICKETS,
            known_good_prefix: constants::DEFAULT_KNOWN_GOOD_PREFIX.to_string(),
            output_path: PathBuf::from(constants::DEFAULT_TRAINING_CSV),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("CRM error: {0}")]
    Crm(#[from] CrmError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Query for the newest `limit` cases
pub fn training_cases_query(limit: usize) -> String {
    format!(
        "SELECT Id, Subject, Description, CreatedDate, Status FROM Case ORDER BY CreatedDate DESC LIMIT {}",
        limit
    )
}

/// Spam unless the subject starts with the known-good prefix (case-insensitive)
pub fn is_spam_subject(subject: Option<&str>, known_good_prefix: &str) -> bool {
    match subject {
        Some(s) => !s.to_lowercase().starts_with(&known_good_prefix.to_lowercase()),
        None => true,
    }
}

pub fn label_tickets(tickets: &[Ticket], known_good_prefix: &str) -> Vec<LabeledExample> {
    tickets
        .iter()
        .map(|t| LabeledExample {
            subject: t.subject.clone(),
            description: t.description.clone(),
            is_spam: is_spam_subject(t.subject.as_deref(), known_good_prefix),
        })
        .collect()
}

pub struct CorpusBuilder {
    config: CorpusConfig,
}

impl CorpusBuilder {
    pub fn new(config: CorpusConfig) -> Self {
        Self { config }
    }

    /// Fetch the newest cases
    pub async fn fetch(&self, client: &CrmClient) -> Result<Vec<Ticket>, CrmError> {
        client
            .query_all::<Ticket>(&training_cases_query(self.config.max_tickets))
            .await
    }

    /// Label and write the corpus; returns the row count
    pub fn save(&self, tickets: &[Ticket]) -> Result<usize, DatasetError> {
        let examples = label_tickets(tickets, &self.config.known_good_prefix);
        let spam = examples.iter().filter(|e| e.is_spam).count();

        Table::from_examples(&examples).write(&self.config.output_path)?;

        log::info!(
            "Training data saved to: {} ({} spam, {} legitimate)",
            self.config.output_path.display(),
            spam,
            examples.len() - spam
        );
        Ok(examples.len())
    }

    /// Connect, fetch, label, write
    pub async fn run(&self, credentials: &CrmCredentials) -> Result<usize, CorpusError> {
        let client = CrmClient::connect(credentials).await.map_err(|e| {
            log::error!("Error loading CRM data: {}", e);
            e
        })?;

        let tickets = self.fetch(&client).await.map_err(|e| {
            log::error!("Error loading CRM data: {}", e);
            e
        })?;

        log::info!("Fetched {} cases", tickets.len());
        Ok(self.save(&tickets)?)
    }
}
