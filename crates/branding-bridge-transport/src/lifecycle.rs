//! Session lifecycle: bind, serve, launch the UI, wait, tear down.

use std::{io, sync::Arc, time::Duration};

use branding_bridge_core::{
    CompositeDocument, EditorConfig, Gateway, Notice, SessionObserver, TextBundleSource,
    TracingObserver,
};
use branding_bridge_sync::{AggregateError, Aggregator, Persister};
use thiserror::Error;
use tokio::{
    net::TcpListener,
    task::{JoinError, JoinHandle},
};
use tokio_util::sync::CancellationToken;

use crate::{
    launcher::{BrowserLauncher, UiLauncher},
    protocol::ChannelError,
    websocket::{ChannelState, create_channel_router},
};

/// Session error.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to bind the channel listener: {0}")]
    Bind(#[source] io::Error),
    #[error("channel server failed: {0}")]
    Serve(#[source] io::Error),
    #[error("failed to open the editor UI at {url}: {source}")]
    Launch {
        url: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

type ServeOutcome = Result<io::Result<()>, JoinError>;

/// One branding editing session against a tenant.
pub struct EditorSession {
    config: EditorConfig,
    gateway: Arc<dyn Gateway>,
    bundles: Arc<dyn TextBundleSource>,
    observer: Arc<dyn SessionObserver>,
    launcher: Arc<dyn UiLauncher>,
}

impl EditorSession {
    #[must_use]
    pub fn new(
        config: EditorConfig,
        gateway: Arc<dyn Gateway>,
        bundles: Arc<dyn TextBundleSource>,
    ) -> Self {
        Self {
            config,
            gateway,
            bundles,
            observer: Arc::new(TracingObserver),
            launcher: Arc::new(BrowserLauncher),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    pub fn with_launcher(mut self, launcher: Arc<dyn UiLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    /// Gather the tenant's branding and run an editing session on it.
    ///
    /// # Errors
    /// Returns error if aggregation fails, or see [`Self::run`].
    pub async fn customize(
        &self,
        tenant_domain: &str,
        cancel: &CancellationToken,
    ) -> Result<(), SessionError> {
        self.observer.notify(Notice::GatheringData);
        let document = Aggregator::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.bundles),
            self.config.text.clone(),
        )
        .aggregate(cancel, tenant_domain)
        .await?;

        self.run(document, cancel).await
    }

    /// Serve `document` to the UI until the session ends.
    ///
    /// The session ends on a UI disconnect, on a channel or persistence
    /// failure, or when `cancel` fires. Cancellation is a clean shutdown.
    ///
    /// # Errors
    /// Returns error if the listener cannot be bound, the UI cannot be
    /// opened, the server fails, or the channel ends with an error.
    pub async fn run(
        &self,
        document: CompositeDocument,
        cancel: &CancellationToken,
    ) -> Result<(), SessionError> {
        let session = cancel.child_token();
        let grace = self.config.shutdown_grace();

        let listener = TcpListener::bind((self.config.bind_host, 0))
            .await
            .map_err(SessionError::Bind)?;
        let port = listener.local_addr().map_err(SessionError::Bind)?.port();

        let state = ChannelState::new(
            document,
            Persister::new(Arc::clone(&self.gateway), self.config.text.locale.clone()),
            Arc::clone(&self.observer),
            session.clone(),
            &self.config,
        );
        let app = create_channel_router(state.clone());

        let shutdown = session.clone();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
        });
        tracing::info!(port, session_id = %state.session_id(), "channel listening");

        let url = self.config.ui_launch_url(port);
        if let Err(source) = self.launcher.open(&url) {
            session.cancel();
            settle(drain(server, grace).await)?;
            return Err(SessionError::Launch { url, source });
        }
        self.observer.notify(Notice::PerformChanges);

        let served = tokio::select! {
            joined = &mut server => Some(joined),
            () = session.cancelled() => None,
        };
        session.cancel();
        let served = match served {
            Some(joined) => Some(joined),
            None => drain(server, grace).await,
        };

        if tokio::time::timeout(grace, state.closed()).await.is_err() {
            tracing::warn!(?grace, "UI channel did not close in time");
        }

        settle(served)?;
        match state.take_error() {
            Some(e) => Err(e.into()),
            None => {
                tracing::info!("session finished");
                Ok(())
            }
        }
    }
}

/// Wait for the server to finish, aborting it after `grace`.
async fn drain(mut server: JoinHandle<io::Result<()>>, grace: Duration) -> Option<ServeOutcome> {
    if let Ok(joined) = tokio::time::timeout(grace, &mut server).await {
        Some(joined)
    } else {
        tracing::warn!(?grace, "channel server did not stop in time, aborting");
        server.abort();
        None
    }
}

fn settle(served: Option<ServeOutcome>) -> Result<(), SessionError> {
    match served {
        None | Some(Ok(Ok(()))) => Ok(()),
        Some(Ok(Err(e))) => Err(SessionError::Serve(e)),
        Some(Err(e)) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Some(Err(e)) => {
            tracing::debug!(error = %e, "channel server task cancelled");
            Ok(())
        }
    }
}
