use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use tokio::sync::Notify;

use super::service::*;
use crate::logic::config::TriageConfig;
use crate::logic::crm::{CaseUpdate, CrmError, Ticket, TicketStatus, TicketStore};
use crate::logic::model::{ArtifactError, InferenceError, SpamClassifier};

// ============================================================================
// FAKES
// ============================================================================

#[derive(Default)]
struct FakeStore {
    tickets: Vec<Ticket>,
    fail_query: bool,
    fail_close: bool,
    /// Close of this ticket never completes
    stall_on: Option<String>,
    stalled: Arc<Notify>,
    closed: Arc<Mutex<Vec<(String, CaseUpdate)>>>,
}

impl TicketStore for FakeStore {
    async fn pending_tickets(&self) -> Result<Vec<Ticket>, CrmError> {
        if self.fail_query {
            return Err(CrmError::NetworkError("connection reset".into()));
        }
        Ok(self.tickets.clone())
    }

    async fn close_ticket(&self, ticket_id: &str, update: &CaseUpdate) -> Result<(), CrmError> {
        if self.stall_on.as_deref() == Some(ticket_id) {
            self.stalled.notify_one();
            std::future::pending::<()>().await;
        }
        if self.fail_close {
            return Err(CrmError::ServerError {
                status: 400,
                message: "ENTITY_IS_LOCKED".into(),
            });
        }
        self.closed.lock().unwrap().push((ticket_id.to_string(), update.clone()));
        Ok(())
    }
}

/// Fixed P(spam); records every text it sees
struct FixedClassifier {
    p_spam: Result<f32, InferenceError>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl FixedClassifier {
    fn new(p_spam: f32) -> Self {
        Self {
            p_spam: Ok(p_spam),
            seen: Arc::default(),
        }
    }

    fn failing() -> Self {
        Self {
            p_spam: Err(InferenceError::Other("vectorizer exploded".into())),
            seen: Arc::default(),
        }
    }
}

impl SpamClassifier for FixedClassifier {
    fn spam_probability(&self, text: &str) -> Result<f32, InferenceError> {
        self.seen.lock().unwrap().push(text.to_string());
        self.p_spam.clone()
    }
}

fn ticket(id: &str, subject: Option<&str>, description: Option<&str>) -> Ticket {
    Ticket {
        id: id.to_string(),
        subject: subject.map(str::to_string),
        description: description.map(str::to_string),
        status: TicketStatus::New,
        supplied_email: None,
        created_date: None,
    }
}

fn service(store: FakeStore, classifier: FixedClassifier) -> TriageService<FakeStore, FixedClassifier> {
    TriageService::new(store, classifier, &TriageConfig::default())
}

// ============================================================================
// TESTS
// ============================================================================

#[tokio::test]
async fn test_confident_spam_is_closed() {
    let store = FakeStore {
        tickets: vec![ticket("500A", Some("Win a free prize now!"), Some(""))],
        ..Default::default()
    };
    let closed = store.closed.clone();
    let classifier = FixedClassifier::new(0.9);
    let seen = classifier.seen.clone();
    let mut svc = service(store, classifier);

    svc.run_cycle().await;

    assert_eq!(seen.lock().unwrap().as_slice(), ["Win a free prize now! ".to_string()]);
    assert_eq!(svc.stats().spam_closed, 1);
    assert_eq!(svc.stats().total_processed, 1);
    assert_eq!(svc.stats().legitimate_kept, 0);

    let closed = closed.lock().unwrap();
    assert_eq!(closed.len(), 1);
    let (id, update) = &closed[0];
    assert_eq!(id, "500A");
    assert_eq!(update.status, TicketStatus::Closed);
    assert_eq!(update.reason, "Spam");
    assert!(update.comments.contains("Reason: ML model prediction: spam (90.0% confidence)"));
}

#[tokio::test]
async fn test_missing_subject_uses_placeholder() {
    let classifier = FixedClassifier::new(0.2);
    let seen = classifier.seen.clone();
    let mut svc = service(FakeStore::default(), classifier);

    svc.process_ticket(&ticket("500H", None, Some("hello"))).await;

    assert_eq!(seen.lock().unwrap()[0], "No Subject hello");
    assert_eq!(svc.state(), ServiceState::Classifying);
}

#[tokio::test]
async fn test_boundary_confidence_is_kept() {
    let mut svc = service(FakeStore::default(), FixedClassifier::new(0.53));

    let outcome = svc.process_ticket(&ticket("500B", Some("Limited offer"), None)).await;

    assert_eq!(outcome, TicketOutcome::Kept);
    assert_eq!(svc.stats().legitimate_kept, 1);
    assert_eq!(svc.stats().spam_closed, 0);
}

#[tokio::test]
async fn test_legitimate_is_kept() {
    let mut svc = service(FakeStore::default(), FixedClassifier::new(0.1));

    let outcome = svc.process_ticket(&ticket("500C", Some("Pardot Bounce Report"), None)).await;

    assert_eq!(outcome, TicketOutcome::Kept);
    assert_eq!(svc.stats().total_processed, 1);
}

#[tokio::test]
async fn test_close_failure_is_not_counted() {
    let store = FakeStore {
        fail_close: true,
        ..Default::default()
    };
    let mut svc = service(store, FixedClassifier::new(0.95));

    let outcome = svc.process_ticket(&ticket("500D", Some("Cheap meds"), None)).await;

    assert!(matches!(outcome, TicketOutcome::CloseFailed(_)));
    assert_eq!(svc.stats().spam_closed, 0);
    assert_eq!(svc.stats().legitimate_kept, 0);
    assert_eq!(svc.stats().total_processed, 1);
}

#[tokio::test]
async fn test_classification_error_keeps_ticket() {
    let mut svc = service(FakeStore::default(), FixedClassifier::failing());

    let outcome = svc.process_ticket(&ticket("500E", Some("anything"), None)).await;

    assert_eq!(outcome, TicketOutcome::Kept);
    assert_eq!(svc.stats().legitimate_kept, 1);
}

#[tokio::test]
async fn test_query_failure_is_empty_batch() {
    let store = FakeStore {
        fail_query: true,
        tickets: vec![ticket("500F", Some("x"), None)],
        ..Default::default()
    };
    let mut svc = service(store, FixedClassifier::new(0.9));

    assert!(svc.poll().await.is_empty());
    svc.run_cycle().await;
    assert_eq!(svc.stats().total_processed, 0);
}

#[tokio::test]
async fn test_empty_batch() {
    let mut svc = service(FakeStore::default(), FixedClassifier::new(0.9));
    assert_eq!(svc.state(), ServiceState::Ready);

    svc.run_cycle().await;

    assert_eq!(svc.stats().total_processed, 0);
    assert_eq!(svc.stats().spam_rate(), 0.0);
    assert_eq!(svc.state(), ServiceState::Ready);
}

#[tokio::test]
async fn test_dry_run_never_updates() {
    let config = TriageConfig {
        dry_run: true,
        ..Default::default()
    };
    let store = FakeStore {
        tickets: vec![ticket("500G", Some("Win a free prize now!"), None)],
        ..Default::default()
    };
    let closed = store.closed.clone();
    let mut svc = TriageService::new(store, FixedClassifier::new(0.99), &config);

    let outcome = svc.process_ticket(&ticket("500G", Some("Win a free prize now!"), None)).await;

    assert_eq!(outcome, TicketOutcome::Flagged);
    assert_eq!(svc.stats().spam_closed, 1);
    assert!(closed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_run_stops_after_one_cycle() {
    let store = FakeStore {
        tickets: vec![
            ticket("1", Some("Win a free prize now!"), Some("")),
            ticket("2", Some("Pardot Bounce Report"), None),
        ],
        ..Default::default()
    };
    let closed = store.closed.clone();
    let stats = service(store, FixedClassifier::new(0.9)).run().await;

    assert_eq!(stats.total_processed, 2);
    assert_eq!(stats.spam_closed, 2);
    assert_eq!(closed.lock().unwrap().len(), 2);
}

#[test]
fn test_spam_closure_fields() {
    let update = spam_closure("ML model prediction: spam (90.0% confidence)");

    assert_eq!(update.status, TicketStatus::Closed);
    assert_eq!(update.reason, "Spam");
    assert!(update.comments.starts_with("Auto-closed by AI spam filter at "));
    assert!(update
        .comments
        .ends_with(". Reason: ML model prediction: spam (90.0% confidence)"));

    let (timestamp, _) = update
        .comments
        .strip_prefix("Auto-closed by AI spam filter at ")
        .and_then(|rest| rest.split_once(". Reason: "))
        .unwrap();
    assert!(NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").is_ok());
}

#[tokio::test]
async fn test_initialize_walks_setup_states() {
    let store = FakeStore {
        tickets: vec![ticket("600A", Some("Win a free prize now!"), None)],
        ..Default::default()
    };
    let result = TriageService::initialize_with(
        async { Ok::<_, CrmError>(store) },
        || Ok(FixedClassifier::new(0.9)),
        &TriageConfig::default(),
    )
    .await;
    let mut svc = match result {
        Ok(svc) => svc,
        Err(e) => panic!("initialize failed: {}", e),
    };

    assert_eq!(svc.state(), ServiceState::Ready);
    assert_eq!(
        svc.history(),
        [
            ServiceState::Uninitialized,
            ServiceState::Connected,
            ServiceState::ModelLoaded,
            ServiceState::Ready,
        ]
    );

    svc.run_cycle().await;

    assert_eq!(svc.state(), ServiceState::Ready);
    assert_eq!(
        &svc.history()[4..],
        [
            ServiceState::Polling,
            ServiceState::Classifying,
            ServiceState::Acting,
            ServiceState::Ready,
        ]
    );
}

#[tokio::test]
async fn test_connection_failure_skips_model_load() {
    let loaded = Arc::new(Mutex::new(false));
    let flag = loaded.clone();

    let result = TriageService::<FakeStore, FixedClassifier>::initialize_with(
        async { Err::<FakeStore, _>(CrmError::Unauthorized) },
        move || {
            *flag.lock().unwrap() = true;
            Ok(FixedClassifier::new(0.9))
        },
        &TriageConfig::default(),
    )
    .await;

    assert!(matches!(result, Err(InitError::Connection(CrmError::Unauthorized))));
    assert!(!*loaded.lock().unwrap());
}

#[tokio::test]
async fn test_model_failure_is_reported() {
    let result = TriageService::<FakeStore, FixedClassifier>::initialize_with(
        async { Ok::<_, CrmError>(FakeStore::default()) },
        || Err(ArtifactError::NotFound("models/spam_model.json".into())),
        &TriageConfig::default(),
    )
    .await;

    assert!(matches!(result, Err(InitError::Model(_))));
}

#[tokio::test]
async fn test_interrupt_mid_batch_stops_processing() {
    let store = FakeStore {
        tickets: vec![
            ticket("700A", Some("Win a free prize now!"), None),
            ticket("700B", Some("Cheap meds"), None),
            ticket("700C", Some("Crypto giveaway"), None),
        ],
        stall_on: Some("700B".to_string()),
        ..Default::default()
    };
    let closed = store.closed.clone();
    let stalled = store.stalled.clone();
    let classifier = FixedClassifier::new(0.95);
    let seen = classifier.seen.clone();
    let mut svc = service(store, classifier);

    let interrupted = svc.run_until(async move { stalled.notified().await }).await;

    assert!(interrupted);
    assert_eq!(svc.state(), ServiceState::Stopped);
    assert_eq!(svc.stats().total_processed, 1);
    assert_eq!(svc.stats().spam_closed, 1);
    assert_eq!(svc.interrupted_ticket(), Some("700B"));
    assert_eq!(seen.lock().unwrap().len(), 2);

    let closed = closed.lock().unwrap();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].0, "700A");
}

#[tokio::test]
async fn test_uninterrupted_run_has_no_pending_close() {
    let store = FakeStore {
        tickets: vec![ticket("800A", Some("Win a free prize now!"), None)],
        ..Default::default()
    };
    let mut svc = service(store, FixedClassifier::new(0.95));

    let interrupted = svc.run_until(std::future::pending()).await;

    assert!(!interrupted);
    assert_eq!(svc.state(), ServiceState::Stopped);
    assert_eq!(svc.interrupted_ticket(), None);
    assert_eq!(svc.stats().spam_closed, 1);
}
