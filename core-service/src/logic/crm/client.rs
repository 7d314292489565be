//! CRM API Client
//!
//! HTTP client for the CRM REST surface: query cases, update a case.

use serde::de::DeserializeOwned;
use std::time::Duration;

use super::auth::{self, CrmCredentials, Session};
use super::types::{ApiErrorBody, CaseUpdate, QueryResponse, Ticket};
use super::TicketStore;
use crate::constants;

/// Open/new cases polled by the triage service
pub const PENDING_CASES_QUERY: &str =
    "SELECT Id, Subject, Description, Status, SuppliedEmail FROM Case WHERE Status IN ('New', 'Open')";

/// Connectivity check: list the New cases
pub const NEW_CASES_QUERY: &str =
    "SELECT Id, Subject, Description, SuppliedEmail, Status FROM Case WHERE Status = 'New'";

/// CRM client configuration
#[derive(Debug, Clone)]
pub struct CrmConfig {
    pub api_version: String,
    pub timeout_seconds: u64,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            api_version: constants::get_api_version(),
            timeout_seconds: constants::DEFAULT_HTTP_TIMEOUT,
        }
    }
}

/// CRM API client bound to one authenticated session
pub struct CrmClient {
    config: CrmConfig,
    session: Session,
    http_client: reqwest::Client,
}

impl CrmClient {
    /// Build an HTTP client with the configured timeout
    pub fn http_client(config: &CrmConfig) -> Result<reqwest::Client, CrmError> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CrmError::NetworkError(e.to_string()))
    }

    /// Wrap an existing session
    pub fn with_session(config: CrmConfig, session: Session) -> Result<Self, CrmError> {
        let http_client = Self::http_client(&config)?;
        Ok(Self {
            config,
            session,
            http_client,
        })
    }

    /// Log in with username + password + security token
    pub async fn connect(credentials: &CrmCredentials) -> Result<Self, CrmError> {
        let config = CrmConfig {
            api_version: credentials.api_version.clone(),
            ..Default::default()
        };
        let http_client = Self::http_client(&config)?;
        let session = auth::password_login(&http_client, credentials).await?;

        log::info!("Connected to CRM instance {}", session.instance_url);

        Ok(Self {
            config,
            session,
            http_client,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn data_url(&self, path: &str) -> String {
        format!(
            "{}/services/data/v{}/{}",
            self.session.instance_url, self.config.api_version, path
        )
    }

    /// Run a query and return the first page
    pub async fn query<T: DeserializeOwned>(&self, soql: &str) -> Result<QueryResponse<T>, CrmError> {
        let url = self.data_url("query");
        log::debug!("CRM query: {}", soql);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.session.access_token)
            .query(&[("q", soql)])
            .send()
            .await
            .map_err(|e| CrmError::NetworkError(e.to_string()))?;

        Self::parse_json(response).await
    }

    /// Run a query and follow pagination until every record is fetched
    pub async fn query_all<T: DeserializeOwned>(&self, soql: &str) -> Result<Vec<T>, CrmError> {
        let mut page = self.query::<T>(soql).await?;
        let mut records = std::mem::take(&mut page.records);

        while let (false, Some(next)) = (page.done, page.next_records_url.take()) {
            let url = format!("{}{}", self.session.instance_url, next);
            let response = self
                .http_client
                .get(&url)
                .bearer_auth(&self.session.access_token)
                .send()
                .await
                .map_err(|e| CrmError::NetworkError(e.to_string()))?;

            page = Self::parse_json(response).await?;
            records.append(&mut page.records);
        }

        Ok(records)
    }

    /// Run a query and return the raw JSON page (for diagnostics)
    pub async fn query_raw(&self, soql: &str) -> Result<serde_json::Value, CrmError> {
        self.query::<serde_json::Value>(soql).await.map(|page| {
            serde_json::json!({
                "totalSize": page.total_size,
                "done": page.done,
                "records": page.records,
            })
        })
    }

    /// Apply a field update to one case
    pub async fn update_case(&self, case_id: &str, update: &CaseUpdate) -> Result<(), CrmError> {
        let url = self.data_url(&format!("sobjects/Case/{}", case_id));

        let response = self
            .http_client
            .patch(&url)
            .bearer_auth(&self.session.access_token)
            .json(update)
            .send()
            .await
            .map_err(|e| CrmError::NetworkError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CrmError> {
        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| CrmError::ParseError(e.to_string()))
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn api_error(response: reqwest::Response) -> CrmError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();

        if status == 401 {
            return CrmError::Unauthorized;
        }

        let message = serde_json::from_str::<Vec<ApiErrorBody>>(&text)
            .ok()
            .and_then(|errors| errors.into_iter().next())
            .map(|e| format!("{}: {}", e.error_code, e.message))
            .unwrap_or(text);

        CrmError::ServerError { status, message }
    }
}

impl TicketStore for CrmClient {
    async fn pending_tickets(&self) -> Result<Vec<Ticket>, CrmError> {
        self.query_all(PENDING_CASES_QUERY).await
    }

    async fn close_ticket(&self, ticket_id: &str, update: &CaseUpdate) -> Result<(), CrmError> {
        self.update_case(ticket_id, update).await
    }
}

/// CRM client errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum CrmError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("Missing credential: set {0}")]
    MissingCredential(String),
    #[error("Unauthorized (session expired or invalid)")]
    Unauthorized,
}
