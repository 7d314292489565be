//! Interactive OAuth authorization-code probe
//!
//! The browser redirects to a local listener; the code comes back over a
//! oneshot channel and is awaited with a timeout. The listener is shut down
//! either way.

use spam_triage_core::logic::crm::{CrmCredentials, Session};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::{required, token};
use crate::config::Config;
use crate::error::{ProbeError, ProbeResult};
use crate::handlers::{callback::CallbackState, create_router};

/// Browser URL that starts the authorization-code grant
pub fn authorize_url(login_url: &str, client_id: &str, redirect_uri: &str) -> ProbeResult<String> {
    let base = format!("{}/services/oauth2/authorize", login_url.trim_end_matches('/'));
    reqwest::Url::parse_with_params(
        &base,
        &[
            ("response_type", "code"),
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
        ],
    )
    .map(String::from)
    .map_err(|e| ProbeError::InvalidUrl(format!("{}: {}", base, e)))
}

/// Local redirect listener waiting for a single authorization code
pub struct CallbackServer {
    addr: SocketAddr,
    code: oneshot::Receiver<String>,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl CallbackServer {
    /// Bind 127.0.0.1:{port} and start serving /callback
    pub async fn start(port: u16) -> ProbeResult<Self> {
        let (code_tx, code_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], port))).await?;
        let addr = listener.local_addr()?;
        let app = create_router(CallbackState::new(code_tx));

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        tracing::info!("Callback listener on http://{}/callback", addr);
        Ok(Self {
            addr,
            code: code_rx,
            shutdown: shutdown_tx,
            handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the code, then stop the listener
    pub async fn wait_for_code(self, timeout: Duration) -> ProbeResult<String> {
        let received = tokio::time::timeout(timeout, self.code).await;

        let _ = self.shutdown.send(());
        match self.handle.await {
            Ok(Ok(())) => tracing::debug!("Callback listener stopped"),
            Ok(Err(e)) => tracing::warn!("Callback listener error: {}", e),
            Err(e) => tracing::warn!("Callback listener task failed: {}", e),
        }

        match received {
            Ok(Ok(code)) => Ok(code),
            Ok(Err(_)) => Err(ProbeError::Callback("listener closed before a code arrived".into())),
            Err(_) => Err(ProbeError::Timeout(timeout.as_secs())),
        }
    }
}

pub async fn login(config: &Config, credentials: &CrmCredentials, http: &reqwest::Client) -> ProbeResult<Session> {
    let client_id = required(&credentials.consumer_key, "SF_CONSUMER_KEY")?;
    let client_secret = required(&credentials.consumer_secret, "SF_CONSUMER_SECRET")?;
    let redirect_uri = config.redirect_uri();

    let url = authorize_url(&credentials.login_url, client_id, &redirect_uri)?;
    let server = CallbackServer::start(config.callback_port).await?;

    println!("Open this URL in your browser to authorize:\n{}\n", url);
    println!("Waiting for authorization callback on http://{}/callback...", server.local_addr());

    let code = server
        .wait_for_code(Duration::from_secs(config.callback_timeout_secs))
        .await?;
    tracing::info!("Authorization code received");

    token::request_token(
        http,
        &credentials.login_url,
        &[
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri.as_str()),
        ],
    )
    .await
}
