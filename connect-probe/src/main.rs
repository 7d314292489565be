//! CRM Connection Probe
//!
//! Standalone diagnostic: tries each login strategy in a fixed order and
//! prints the New cases from the first session that works.
//!
//! ```text
//! password -> OAuth authorization code -> JWT bearer -> cached token
//!                      |
//!                      v
//!           127.0.0.1:{port}/callback (axum, oneshot + timeout)
//! ```

mod config;
mod error;
mod handlers;
mod probes;

use spam_triage_core::logic::crm::CrmCredentials;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use probes::{Probe, ProbeContext};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "crm_connect_probe=debug,spam_triage_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();
    let credentials = CrmCredentials::from_env();

    tracing::info!("CRM connection probe starting...");
    tracing::info!("Login URL: {}", credentials.login_url);

    let ctx = match ProbeContext::new(config, credentials) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("Failed to set up HTTP client: {}", e);
            return;
        }
    };

    match probes::first_success(&Probe::ORDER, |probe| probes::connect_and_verify(probe, &ctx)).await {
        Some((probe, cases)) => {
            println!("Connected via {}", probe);
            match serde_json::to_string_pretty(&cases) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::error!("Could not render query result: {}", e),
            }
        }
        None => {
            tracing::error!("All connection methods failed");
            println!("All connection methods failed");
        }
    }
}
