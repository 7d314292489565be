//! Error handling

use spam_triage_core::logic::crm::CrmError;

pub type ProbeResult<T> = Result<T, ProbeError>;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Required settings absent; the probe is skipped
    #[error("not configured: {0} not set")]
    NotConfigured(String),

    #[error(transparent)]
    Crm(#[from] CrmError),

    #[error("no callback received within {0} seconds")]
    Timeout(u64),

    #[error("callback listener error: {0}")]
    Callback(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("token request failed: {0}")]
    Token(String),

    #[error("JWT signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    pub fn is_not_configured(&self) -> bool {
        matches!(
            self,
            ProbeError::NotConfigured(_) | ProbeError::Crm(CrmError::MissingCredential(_))
        )
    }
}
