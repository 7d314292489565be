//! JWT bearer probe: RS256 assertion signed with the connected app's key

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use spam_triage_core::logic::crm::{CrmCredentials, Session};

use super::{required, token};
use crate::error::ProbeResult;

pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion lifetime
const ASSERTION_TTL_MINUTES: i64 = 3;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BearerClaims {
    pub iss: String, // Consumer key
    pub sub: String, // Username
    pub aud: String, // Login URL
    pub exp: usize,
}

impl BearerClaims {
    pub fn new(consumer_key: &str, username: &str, login_url: &str, now: DateTime<Utc>) -> Self {
        Self {
            iss: consumer_key.to_string(),
            sub: username.to_string(),
            aud: login_url.trim_end_matches('/').to_string(),
            exp: (now + Duration::minutes(ASSERTION_TTL_MINUTES)).timestamp() as usize,
        }
    }
}

pub fn sign_assertion(claims: &BearerClaims, private_key_pem: &[u8]) -> ProbeResult<String> {
    let key = EncodingKey::from_rsa_pem(private_key_pem)?;
    Ok(encode(&Header::new(Algorithm::RS256), claims, &key)?)
}

pub async fn login(credentials: &CrmCredentials, http: &reqwest::Client) -> ProbeResult<Session> {
    let consumer_key = required(&credentials.consumer_key, "SF_CONSUMER_KEY")?;
    let username = required(&credentials.username, "SF_USERNAME")?;
    let key_file = required(&credentials.private_key_file, "SF_PRIVATE_KEY_FILE")?;

    let pem = tokio::fs::read(key_file).await?;
    let claims = BearerClaims::new(consumer_key, username, &credentials.login_url, Utc::now());
    let assertion = sign_assertion(&claims, &pem)?;

    token::request_token(
        http,
        &credentials.login_url,
        &[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())],
    )
    .await
}
