//! Branding editor against an in-memory tenant.
//!
//! Run with: cargo run -p branding-editor-demo -- tenant.example.com
//!
//! Set `BRANDING_EDITOR_CONFIG` to a JSON file to override the session
//! settings. Press Ctrl+C to end the session.

use std::sync::Arc;

use anyhow::Context;
use branding_bridge_core::EditorConfig;
use branding_bridge_sync::gateway::{CdnTextBundle, MemoryGateway};
use branding_bridge_transport::EditorSession;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match std::env::var_os("BRANDING_EDITOR_CONFIG") {
        Some(path) => EditorConfig::load(&path).context("loading editor config")?,
        None => EditorConfig::default(),
    };
    let tenant_domain = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tenant.example.com".to_string());

    let gateway = MemoryGateway::new()
        .with_custom_domain(&format!("login.{tenant_domain}"), "ready")
        .with_tenant("Demo tenant", &["en"]);
    let bundles = CdnTextBundle::from_settings(&config.text);
    let session = EditorSession::new(config, Arc::new(gateway), Arc::new(bundles));

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, shutting down");
            on_signal.cancel();
        }
    });

    session
        .customize(&tenant_domain, &cancel)
        .await
        .context("branding session failed")?;
    Ok(())
}
