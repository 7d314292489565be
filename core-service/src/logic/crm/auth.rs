//! CRM Authentication
//!
//! Credentials from the environment, the authenticated `Session`, and the
//! username + password + security-token login. OAuth flows live in the
//! connect-probe binary and feed their token responses back into `Session`.

use quick_xml::escape::{escape, resolve_predefined_entity};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use super::client::CrmError;
use crate::constants;

// ============================================================================
// CREDENTIALS
// ============================================================================

/// Everything the different login strategies may need
#[derive(Debug, Clone, Default)]
pub struct CrmCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub security_token: Option<String>,
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub private_key_file: Option<String>,
    pub access_token: Option<String>,
    pub login_url: String,
    pub instance_url: String,
    pub api_version: String,
}

impl CrmCredentials {
    /// Load credentials from environment variables
    pub fn from_env() -> Self {
        Self {
            username: non_empty_var("SF_USERNAME"),
            password: non_empty_var("SF_PASSWORD"),
            security_token: non_empty_var("SF_SECURITY_TOKEN"),
            consumer_key: non_empty_var("SF_CONSUMER_KEY"),
            consumer_secret: non_empty_var("SF_CONSUMER_SECRET"),
            private_key_file: non_empty_var("SF_PRIVATE_KEY_FILE"),
            access_token: non_empty_var("SF_ACCESS_TOKEN"),
            login_url: constants::get_login_url(),
            instance_url: constants::get_instance_url(),
            api_version: constants::get_api_version(),
        }
    }

    /// Fetch a required field or report which variable is missing
    pub fn require<'a>(&self, value: &'a Option<String>, var: &str) -> Result<&'a str, CrmError> {
        value
            .as_deref()
            .ok_or_else(|| CrmError::MissingCredential(var.to_string()))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// ============================================================================
// SESSION
// ============================================================================

/// Authenticated session usable against one CRM instance
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub instance_url: String,
    pub access_token: String,
}

impl Session {
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }
}

/// Successful response from the OAuth2 token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub instance_url: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub issued_at: Option<String>,
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        Session::new(token.instance_url, token.access_token)
    }
}

/// Error body from the OAuth2 token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

// ============================================================================
// PASSWORD + SECURITY TOKEN LOGIN (SOAP)
// ============================================================================

/// Log in with username, password and security token
pub async fn password_login(
    http: &reqwest::Client,
    credentials: &CrmCredentials,
) -> Result<Session, CrmError> {
    let username = credentials.require(&credentials.username, "SF_USERNAME")?;
    let password = credentials.require(&credentials.password, "SF_PASSWORD")?;
    let token = credentials.security_token.as_deref().unwrap_or("");

    let url = format!(
        "{}/services/Soap/u/{}",
        credentials.login_url.trim_end_matches('/'),
        credentials.api_version
    );

    log::info!("Logging in to CRM as {} via {}", username, credentials.login_url);

    let response = http
        .post(&url)
        .header("Content-Type", "text/xml; charset=UTF-8")
        .header("SOAPAction", "login")
        .body(login_envelope(username, &format!("{}{}", password, token)))
        .send()
        .await
        .map_err(|e| CrmError::NetworkError(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| CrmError::NetworkError(e.to_string()))?;

    if !status.is_success() {
        let fault = read_login_fields(&body)
            .ok()
            .and_then(|fields| fields.fault)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        return Err(CrmError::AuthenticationFailed(fault));
    }

    parse_login_response(&body)
}

/// Extract the session from a SOAP login response body
pub fn parse_login_response(body: &str) -> Result<Session, CrmError> {
    let fields = read_login_fields(body)?;

    if let Some(fault) = fields.fault {
        return Err(CrmError::AuthenticationFailed(fault));
    }

    let session_id = fields
        .session_id
        .ok_or_else(|| CrmError::ParseError("login response has no sessionId".to_string()))?;

    let server_url = fields
        .server_url
        .ok_or_else(|| CrmError::ParseError("login response has no serverUrl".to_string()))?;

    let parsed = reqwest::Url::parse(&server_url)
        .map_err(|e| CrmError::ParseError(format!("bad serverUrl {}: {}", server_url, e)))?;

    Ok(Session::new(parsed.origin().ascii_serialization(), session_id))
}

#[derive(Debug, Default)]
struct LoginFields {
    session_id: Option<String>,
    server_url: Option<String>,
    fault: Option<String>,
}

/// Walk the SOAP body and collect the text of `sessionId`, `serverUrl` and `faultstring`
fn read_login_fields(body: &str) -> Result<LoginFields, CrmError> {
    let mut reader = Reader::from_str(body);
    let mut fields = LoginFields::default();
    let mut current: Option<(Vec<u8>, String)> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => {
                let name = e.local_name();
                if matches!(name.as_ref(), b"sessionId" | b"serverUrl" | b"faultstring") {
                    current = Some((name.as_ref().to_vec(), String::new()));
                }
            }
            Event::Text(e) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&e.xml_content().map_err(xml_error)?);
                }
            }
            Event::CData(e) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(std::str::from_utf8(e.as_ref()).map_err(xml_error)?);
                }
            }
            Event::GeneralRef(entity) => {
                if let Some((_, text)) = current.as_mut() {
                    let name = std::str::from_utf8(entity.as_ref()).map_err(xml_error)?;
                    if let Some(value) = resolve_predefined_entity(name) {
                        text.push_str(value);
                    } else if let Some(c) = entity.resolve_char_ref().map_err(xml_error)? {
                        text.push(c);
                    } else {
                        return Err(xml_error(format!("unknown entity &{};", name)));
                    }
                }
            }
            Event::End(e) => {
                if let Some((name, text)) = current.take() {
                    if e.local_name().as_ref() != name.as_slice() {
                        current = Some((name, text));
                        continue;
                    }
                    let slot = match name.as_slice() {
                        b"sessionId" => &mut fields.session_id,
                        b"serverUrl" => &mut fields.server_url,
                        _ => &mut fields.fault,
                    };
                    slot.get_or_insert(text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(fields)
}

fn xml_error(e: impl std::fmt::Display) -> CrmError {
    CrmError::ParseError(format!("invalid login response: {}", e))
}

fn login_envelope(username: &str, password: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8" ?>
<env:Envelope xmlns:xsd="http://www.w3.org/2001/XMLSchema"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xmlns:env="http://schemas.xmlsoap.org/soap/envelope/">
  <env:Body>
    <n1:login xmlns:n1="urn:partner.soap.sforce.com">
      <n1:username>{}</n1:username>
      <n1:password>{}</n1:password>
    </n1:login>
  </env:Body>
</env:Envelope>"#,
        escape(username),
        escape(password)
    )
}
