//! Connection probes
//!
//! Tried in a fixed order until one yields a session that can run a query.
//! A probe without its settings is skipped; a failing probe is logged and the
//! next one runs.

pub mod jwt;
pub mod oauth;
pub mod token;

use spam_triage_core::logic::crm::{CrmClient, CrmConfig, CrmCredentials, Session, NEW_CASES_QUERY};
use std::future::Future;

use crate::config::Config;
use crate::error::{ProbeError, ProbeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Password,
    OAuthCode,
    JwtBearer,
    CachedToken,
}

impl Probe {
    /// Fallback order
    pub const ORDER: [Probe; 4] = [
        Probe::Password,
        Probe::OAuthCode,
        Probe::JwtBearer,
        Probe::CachedToken,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Probe::Password => "username + password + security token",
            Probe::OAuthCode => "OAuth authorization code",
            Probe::JwtBearer => "JWT bearer",
            Probe::CachedToken => "cached access token",
        }
    }
}

impl std::fmt::Display for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Everything a probe may need
pub struct ProbeContext {
    pub config: Config,
    pub credentials: CrmCredentials,
    pub http: reqwest::Client,
}

impl ProbeContext {
    pub fn new(config: Config, credentials: CrmCredentials) -> ProbeResult<Self> {
        let crm_config = CrmConfig {
            api_version: credentials.api_version.clone(),
            timeout_seconds: config.http_timeout_secs,
        };
        let http = CrmClient::http_client(&crm_config)?;

        Ok(Self {
            config,
            credentials,
            http,
        })
    }

    fn crm_config(&self) -> CrmConfig {
        CrmConfig {
            api_version: self.credentials.api_version.clone(),
            timeout_seconds: self.config.http_timeout_secs,
        }
    }
}

/// Required setting, or `NotConfigured` naming the variable
pub fn required<'a>(value: &'a Option<String>, var: &str) -> ProbeResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| ProbeError::NotConfigured(var.to_string()))
}

/// Stored token against the fixed instance URL
pub fn cached_session(credentials: &CrmCredentials) -> ProbeResult<Session> {
    let token = required(&credentials.access_token, "SF_ACCESS_TOKEN")?;
    Ok(Session::new(credentials.instance_url.as_str(), token))
}

/// Obtain a client with one strategy
pub async fn connect(probe: Probe, ctx: &ProbeContext) -> ProbeResult<CrmClient> {
    let session = match probe {
        Probe::Password => return Ok(CrmClient::connect(&ctx.credentials).await?),
        Probe::OAuthCode => oauth::login(&ctx.config, &ctx.credentials, &ctx.http).await?,
        Probe::JwtBearer => jwt::login(&ctx.credentials, &ctx.http).await?,
        Probe::CachedToken => cached_session(&ctx.credentials)?,
    };
    Ok(CrmClient::with_session(ctx.crm_config(), session)?)
}

/// Connect and run the New-cases query
pub async fn connect_and_verify(probe: Probe, ctx: &ProbeContext) -> ProbeResult<serde_json::Value> {
    let client = connect(probe, ctx).await?;
    tracing::info!("Session established via {} ({})", probe, client.session().instance_url);
    Ok(client.query_raw(NEW_CASES_QUERY).await?)
}

/// Try each probe in order; the first success wins
pub async fn first_success<T, F, Fut>(order: &[Probe], mut attempt: F) -> Option<(Probe, T)>
where
    F: FnMut(Probe) -> Fut,
    Fut: Future<Output = ProbeResult<T>>,
{
    for &probe in order {
        tracing::info!("Trying {}...", probe);
        match attempt(probe).await {
            Ok(value) => return Some((probe, value)),
            Err(e) if e.is_not_configured() => tracing::info!("Skipping {}: {}", probe, e),
            Err(e) => tracing::warn!("{} failed: {}", probe, e),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use spam_triage_core::logic::crm::CrmError;

    #[test]
    fn test_fixed_order() {
        assert_eq!(
            Probe::ORDER,
            [Probe::Password, Probe::OAuthCode, Probe::JwtBearer, Probe::CachedToken]
        );
    }

    #[test]
    fn test_falls_through_to_first_success() {
        let mut tried = Vec::new();
        let result = tokio_test::block_on(first_success(&Probe::ORDER, |probe| {
            tried.push(probe);
            async move {
                match probe {
                    Probe::Password => Err(ProbeError::Crm(CrmError::AuthenticationFailed("INVALID_LOGIN".into()))),
                    Probe::OAuthCode => Err(ProbeError::NotConfigured("SF_CONSUMER_KEY".into())),
                    Probe::JwtBearer => Ok("jwt session"),
                    Probe::CachedToken => Ok("cached session"),
                }
            }
        }));

        assert_eq!(result, Some((Probe::JwtBearer, "jwt session")));
        assert_eq!(tried, vec![Probe::Password, Probe::OAuthCode, Probe::JwtBearer]);
    }

    #[test]
    fn test_all_failed_is_none() {
        let result: Option<(Probe, ())> = tokio_test::block_on(first_success(&Probe::ORDER, |_| async {
            Err(ProbeError::Timeout(120))
        }));
        assert!(result.is_none());
    }

    #[test]
    fn test_cached_session_uses_fixed_instance() {
        let credentials = CrmCredentials {
            access_token: Some("00Dxx!token".into()),
            instance_url: "https://orgfarm-dev-ed.develop.my.salesforce.com".into(),
            ..Default::default()
        };
        let session = cached_session(&credentials).unwrap();
        assert_eq!(session.instance_url, "https://orgfarm-dev-ed.develop.my.salesforce.com");
        assert_eq!(session.access_token, "00Dxx!token");

        assert!(cached_session(&CrmCredentials::default()).unwrap_err().is_not_configured());
    }
}
