//! CRM Types
//!
//! Wire types for the Case object and the query/update surface.
//! No logic here - only data structures.

use serde::{Deserialize, Serialize};

// ============================================================================
// TICKET
// ============================================================================

/// Case status as stored in the CRM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketStatus {
    New,
    Open,
    Closed,
    /// Any other picklist value, kept verbatim
    Other(String),
}

impl TicketStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TicketStatus::New => "New",
            TicketStatus::Open => "Open",
            TicketStatus::Closed => "Closed",
            TicketStatus::Other(s) => s.as_str(),
        }
    }

    /// Statuses the triage service polls for
    pub fn is_pending(&self) -> bool {
        matches!(self, TicketStatus::New | TicketStatus::Open)
    }
}

impl From<String> for TicketStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "New" => TicketStatus::New,
            "Open" => TicketStatus::Open,
            "Closed" => TicketStatus::Closed,
            _ => TicketStatus::Other(s),
        }
    }
}

impl From<TicketStatus> for String {
    fn from(status: TicketStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Support case record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Subject", default)]
    pub subject: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Status")]
    pub status: TicketStatus,
    #[serde(rename = "SuppliedEmail", default, skip_serializing_if = "Option::is_none")]
    pub supplied_email: Option<String>,
    #[serde(rename = "CreatedDate", default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
}

// ============================================================================
// QUERY / UPDATE
// ============================================================================

/// One page of a query result
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse<T> {
    pub total_size: usize,
    pub done: bool,
    #[serde(default)]
    pub next_records_url: Option<String>,
    pub records: Vec<T>,
}

/// Field update applied to a case when it is closed as spam
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseUpdate {
    #[serde(rename = "Status")]
    pub status: TicketStatus,
    #[serde(rename = "Reason")]
    pub reason: String,
    #[serde(rename = "Comments")]
    pub comments: String,
}

/// Error body returned by the REST API
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(rename = "errorCode")]
    pub error_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_from_query_record() {
        let json = r#"{
            "attributes": {"type": "Case", "url": "/services/data/v59.0/sobjects/Case/500"},
            "Id": "500xx000001",
            "Subject": "Win a free prize now!",
            "Description": null,
            "Status": "New",
            "SuppliedEmail": "promo@example.com"
        }"#;

        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.id, "500xx000001");
        assert_eq!(ticket.subject.as_deref(), Some("Win a free prize now!"));
        assert_eq!(ticket.description, None);
        assert_eq!(ticket.status, TicketStatus::New);
        assert!(ticket.status.is_pending());
        assert_eq!(ticket.created_date, None);
    }

    #[test]
    fn test_unknown_status_round_trips() {
        let status: TicketStatus = serde_json::from_str("\"Escalated\"").unwrap();
        assert_eq!(status, TicketStatus::Other("Escalated".to_string()));
        assert!(!status.is_pending());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Escalated\"");
    }

    #[test]
    fn test_case_update_field_names() {
        let update = CaseUpdate {
            status: TicketStatus::Closed,
            reason: "Spam".to_string(),
            comments: "Auto-closed".to_string(),
        };

        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["Status"], "Closed");
        assert_eq!(value["Reason"], "Spam");
        assert_eq!(value["Comments"], "Auto-closed");
    }

    #[test]
    fn test_query_page_with_cursor() {
        let json = r#"{
            "totalSize": 3,
            "done": false,
            "nextRecordsUrl": "/services/data/v59.0/query/01g-2000",
            "records": [{"Id": "1", "Status": "Open"}]
        }"#;

        let page: QueryResponse<Ticket> = serde_json::from_str(json).unwrap();
        assert!(!page.done);
        assert_eq!(page.total_size, 3);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.next_records_url.as_deref(), Some("/services/data/v59.0/query/01g-2000"));
    }
}
