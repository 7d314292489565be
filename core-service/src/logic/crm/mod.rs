//! CRM Module - Ticketing system access
//!
//! - `auth` - credentials, session, password login
//! - `client` - REST query/update client
//! - `types` - Case wire types

pub mod auth;
pub mod client;
pub mod types;

pub use auth::{CrmCredentials, Session, TokenResponse};
pub use client::{CrmClient, CrmConfig, CrmError, NEW_CASES_QUERY, PENDING_CASES_QUERY};
pub use types::{CaseUpdate, Ticket, TicketStatus};

/// Read/write surface the triage loop needs from the CRM
#[allow(async_fn_in_trait)]
pub trait TicketStore {
    /// All tickets with status New or Open
    async fn pending_tickets(&self) -> Result<Vec<Ticket>, CrmError>;

    /// Apply a close update to one ticket
    async fn close_ticket(&self, ticket_id: &str, update: &CaseUpdate) -> Result<(), CrmError>;
}
