//! OAuth2 token endpoint

use spam_triage_core::logic::crm::auth::TokenErrorResponse;
use spam_triage_core::logic::crm::{CrmError, Session, TokenResponse};

use crate::error::{ProbeError, ProbeResult};

pub fn token_url(login_url: &str) -> String {
    format!("{}/services/oauth2/token", login_url.trim_end_matches('/'))
}

/// POST a form grant and turn the reply into a session
pub async fn request_token(
    http: &reqwest::Client,
    login_url: &str,
    form: &[(&str, &str)],
) -> ProbeResult<Session> {
    let response = http
        .post(token_url(login_url))
        .form(form)
        .send()
        .await
        .map_err(|e| CrmError::NetworkError(e.to_string()))?;

    let success = response.status().is_success();
    let body = response
        .text()
        .await
        .map_err(|e| CrmError::NetworkError(e.to_string()))?;

    parse_token_response(success, &body)
}

pub fn parse_token_response(success: bool, body: &str) -> ProbeResult<Session> {
    if success {
        return serde_json::from_str::<TokenResponse>(body)
            .map(Session::from)
            .map_err(|e| ProbeError::Token(format!("unexpected response: {}", e)));
    }

    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(err) => Err(ProbeError::Token(match err.error_description {
            Some(description) => format!("{}: {}", err.error, description),
            None => err.error,
        })),
        Err(_) => Err(ProbeError::Token(body.to_string())),
    }
}
