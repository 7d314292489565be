//! OAuth redirect handler

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};

const SUCCESS_PAGE: &str = "<html><body><h1>Authorization successful!</h1>\
<p>You can close this window and return to the terminal.</p></body></html>";

/// Holds the single-use sender for the authorization code
#[derive(Clone)]
pub struct CallbackState {
    sender: Arc<Mutex<Option<oneshot::Sender<String>>>>,
}

impl CallbackState {
    pub fn new(sender: oneshot::Sender<String>) -> Self {
        Self {
            sender: Arc::new(Mutex::new(Some(sender))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// GET /callback?code=...
pub async fn receive(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<&'static str>) {
    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        tracing::warn!("Callback without code (error: {:?})", params.error);
        return (StatusCode::BAD_REQUEST, Html("<html><body><h1>Missing authorization code</h1></body></html>"));
    };

    match state.sender.lock().await.take() {
        Some(sender) => {
            if sender.send(code).is_err() {
                tracing::warn!("Authorization code arrived after the probe gave up");
            }
        }
        None => tracing::debug!("Duplicate callback ignored"),
    }

    (StatusCode::OK, Html(SUCCESS_PAGE))
}
