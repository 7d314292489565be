//! Ticket Triage Service
//!
//! Connect -> load model -> one poll -> classify each ticket -> close the
//! confident spam. Tickets are handled one at a time; Ctrl-C stops the cycle
//! and prints the final counters.

use std::future::Future;

use chrono::Local;

use super::stats::TriageStats;
use crate::logic::config::TriageConfig;
use crate::logic::crm::{CaseUpdate, CrmClient, CrmCredentials, CrmError, Ticket, TicketStatus, TicketStore};
use crate::logic::model::{load_artifacts, ticket_text, ArtifactError, Classification, SpamClassifier, ThresholdConfig, TrainedClassifier};

/// Lifecycle of a triage run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Uninitialized,
    Connected,
    ModelLoaded,
    Ready,
    Polling,
    Classifying,
    Acting,
    Stopped,
}

/// What happened to one ticket
#[derive(Debug, Clone, PartialEq)]
pub enum TicketOutcome {
    Closed,
    /// Dry run: would have been closed
    Flagged,
    CloseFailed(String),
    Kept,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("CRM connection failed: {0}")]
    Connection(#[from] CrmError),
    #[error("Failed to load spam classification model: {0}")]
    Model(#[from] ArtifactError),
}

/// Update applied to a ticket closed as spam
pub fn spam_closure(reason: &str) -> CaseUpdate {
    CaseUpdate {
        status: TicketStatus::Closed,
        reason: "Spam".to_string(),
        comments: format!(
            "Auto-closed by AI spam filter at {}. Reason: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            reason
        ),
    }
}

pub struct TriageService<S, C> {
    store: S,
    classifier: C,
    threshold: ThresholdConfig,
    dry_run: bool,
    stats: TriageStats,
    state: ServiceState,
    history: Vec<ServiceState>,
    /// Ticket whose close request is awaiting the CRM
    in_flight: Option<String>,
}

impl TriageService<CrmClient, TrainedClassifier> {
    /// Password login, then load both artifacts
    pub async fn initialize(credentials: &CrmCredentials, config: &TriageConfig) -> Result<Self, InitError> {
        println!("Initializing AI Spam Filter...");

        let service = Self::initialize_with(
            CrmClient::connect(credentials),
            || load_artifacts(&config.model_path, &config.vectorizer_path),
            config,
        )
        .await?;

        println!("Service initialized");
        Ok(service)
    }
}

impl<S: TicketStore, C: SpamClassifier> TriageService<S, C> {
    /// Uninitialized -> Connected -> ModelLoaded -> Ready.
    ///
    /// The model is only loaded once the connection succeeded.
    pub async fn initialize_with<F, L>(connect: F, load: L, config: &TriageConfig) -> Result<Self, InitError>
    where
        F: Future<Output = Result<S, CrmError>>,
        L: FnOnce() -> Result<C, ArtifactError>,
    {
        let mut history = vec![ServiceState::Uninitialized];

        println!("Connecting to CRM...");
        let store = connect.await.map_err(|e| {
            log::error!("CRM connection failed: {}", e);
            e
        })?;
        history.push(ServiceState::Connected);
        println!("Connected to CRM!");

        println!("Loading spam classification model...");
        let classifier = load().map_err(|e| {
            log::error!("Error loading model: {}", e);
            e
        })?;
        history.push(ServiceState::ModelLoaded);
        println!("Spam model loaded successfully!");

        Ok(Self::assemble(store, classifier, config, history))
    }

    /// Assemble a ready service from a connected store and a loaded classifier
    pub fn new(store: S, classifier: C, config: &TriageConfig) -> Self {
        let history = vec![
            ServiceState::Uninitialized,
            ServiceState::Connected,
            ServiceState::ModelLoaded,
        ];
        Self::assemble(store, classifier, config, history)
    }

    fn assemble(store: S, classifier: C, config: &TriageConfig, history: Vec<ServiceState>) -> Self {
        let mut service = Self {
            store,
            classifier,
            threshold: config.threshold.clone(),
            dry_run: config.dry_run,
            stats: TriageStats::new(),
            state: history.last().copied().unwrap_or(ServiceState::Uninitialized),
            history,
            in_flight: None,
        };
        service.transition(ServiceState::Ready);
        service
    }

    fn transition(&mut self, next: ServiceState) {
        log::debug!("Triage state {:?} -> {:?}", self.state, next);
        self.state = next;
        self.history.push(next);
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn stats(&self) -> &TriageStats {
        &self.stats
    }

    /// Every state entered so far, oldest first
    pub fn history(&self) -> &[ServiceState] {
        &self.history
    }

    /// Ticket whose close was still awaiting the CRM when the run stopped
    pub fn interrupted_ticket(&self) -> Option<&str> {
        self.in_flight.as_deref()
    }

    /// Fetch pending tickets; a failed query is an empty batch
    pub async fn poll(&mut self) -> Vec<Ticket> {
        self.transition(ServiceState::Polling);
        println!("Checking for new tickets...");

        match self.store.pending_tickets().await {
            Ok(tickets) => {
                println!("Found {} tickets to process\n", tickets.len());
                tickets
            }
            Err(e) => {
                log::error!("Error getting tickets: {}", e);
                Vec::new()
            }
        }
    }

    /// Classify one ticket and close it if it is confident spam
    pub async fn process_ticket(&mut self, ticket: &Ticket) -> TicketOutcome {
        self.transition(ServiceState::Classifying);
        let subject = ticket.subject.as_deref().unwrap_or("No Subject");
        let text = ticket_text(ticket.subject.as_deref(), ticket.description.as_deref());
        let classification = self.classifier.classify(&text);

        let outcome = if self.threshold.should_close(&classification) {
            println!("=== SPAM DETECTED ===");
            println!("  Subject: {}", subject);
            println!("  Confidence: {:.1}%\n", classification.confidence * 100.0);
            self.act(&ticket.id, &classification).await
        } else {
            log::debug!("Keeping ticket {}: {}", ticket.id, classification.reason);
            self.stats.legitimate_kept += 1;
            TicketOutcome::Kept
        };

        self.stats.total_processed += 1;
        outcome
    }

    async fn act(&mut self, ticket_id: &str, classification: &Classification) -> TicketOutcome {
        self.transition(ServiceState::Acting);

        if self.dry_run {
            log::info!("Dry run: ticket {} left open", ticket_id);
            self.stats.spam_closed += 1;
            return TicketOutcome::Flagged;
        }

        self.in_flight = Some(ticket_id.to_string());
        let result = self.store.close_ticket(ticket_id, &spam_closure(&classification.reason)).await;
        self.in_flight = None;

        match result {
            Ok(()) => {
                println!("Closed ticket {} as spam\n", ticket_id);
                self.stats.spam_closed += 1;
                TicketOutcome::Closed
            }
            Err(e) => {
                log::error!("Error closing ticket {}: {}", ticket_id, e);
                println!("  Failed to close ticket");
                TicketOutcome::CloseFailed(e.to_string())
            }
        }
    }

    /// One poll plus processing of every returned ticket
    pub async fn run_cycle(&mut self) {
        println!("\n=== Checking at {} ===", Local::now().format("%H:%M:%S"));
        let tickets = self.poll().await;

        if tickets.is_empty() {
            println!("No tickets to process");
        }
        for ticket in &tickets {
            self.process_ticket(ticket).await;
        }
        self.transition(ServiceState::Ready);

        if self.stats.total_processed > 0 {
            println!("{}", self.stats.summary());
        }
    }

    /// Run one cycle, stopping early on Ctrl-C
    pub async fn run(mut self) -> TriageStats {
        println!("\nStarting periodic ticket checking...");
        println!("Press Ctrl+C to stop");

        self.run_until(interrupt()).await;
        self.stats
    }

    /// Run one cycle unless `shutdown` resolves first. Returns true when interrupted.
    pub async fn run_until(&mut self, shutdown: impl Future<Output = ()>) -> bool {
        let interrupted = tokio::select! {
            _ = self.run_cycle() => false,
            _ = shutdown => true,
        };

        self.transition(ServiceState::Stopped);
        if interrupted {
            if let Some(ticket_id) = self.in_flight.as_deref() {
                log::warn!(
                    "Interrupted while closing ticket {}; the CRM may have closed it but it is not counted",
                    ticket_id
                );
            }
            println!("\nStopped checking tickets");
            println!("\n{}", self.stats);
        }
        interrupted
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Ctrl-C handler unavailable: {}", e);
        std::future::pending::<()>().await;
    }
}
