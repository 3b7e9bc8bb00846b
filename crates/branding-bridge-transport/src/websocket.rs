//! WebSocket channel server for the editor UI.

use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use axum::{
    Router,
    extract::{Request, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use branding_bridge_core::{CompositeDocument, EditorConfig, Notice, SessionObserver};
use branding_bridge_sync::Persister;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::protocol::{
    ChannelError, Inbound, check_origin, decode_frame, disconnect_frame, encode_document,
};

/// Channel handler state.
///
/// Holds the document sent at session start and the session token. Serves
/// exactly one UI connection; later upgrade attempts are refused.
#[derive(Clone)]
pub struct ChannelState {
    inner: Arc<Inner>,
}

struct Inner {
    session_id: Uuid,
    document: CompositeDocument,
    persister: Persister,
    observer: Arc<dyn SessionObserver>,
    session: CancellationToken,
    closed: CancellationToken,
    expected_origin: String,
    max_message_bytes: usize,
    idle_timeout: Option<Duration>,
    claimed: AtomicBool,
    failure: Mutex<Option<ChannelError>>,
}

impl ChannelState {
    /// Create channel state for one session.
    ///
    /// `session` is cancelled when the channel ends, for any reason.
    #[must_use]
    pub fn new(
        document: CompositeDocument,
        persister: Persister,
        observer: Arc<dyn SessionObserver>,
        session: CancellationToken,
        config: &EditorConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                session_id: Uuid::new_v4(),
                document,
                persister,
                observer,
                session,
                closed: CancellationToken::new(),
                expected_origin: config.ui_origin.clone(),
                max_message_bytes: config.max_message_bytes,
                idle_timeout: config.idle_timeout(),
                claimed: AtomicBool::new(false),
                failure: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    /// Whether a UI connection has been accepted.
    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.inner.claimed.load(Ordering::SeqCst)
    }

    /// Wait until the accepted connection has finished. Returns at once if
    /// no connection was ever accepted.
    pub async fn closed(&self) {
        if self.is_claimed() {
            self.inner.closed.cancelled().await;
        }
    }

    /// Take the error that ended the channel, if it ended with one.
    #[must_use]
    pub fn take_error(&self) -> Option<ChannelError> {
        self.inner
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn claim(&self) -> bool {
        !self.inner.claimed.swap(true, Ordering::SeqCst)
    }

    fn finish(&self, outcome: Result<(), ChannelError>) {
        match outcome {
            Ok(()) => tracing::info!("UI channel closed"),
            Err(e) => {
                tracing::error!(error = %e, "UI channel failed");
                *self
                    .inner
                    .failure
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(e);
            }
        }
        self.inner.session.cancel();
        self.inner.closed.cancel();
    }

    async fn serve(self, socket: WebSocket) {
        let span = tracing::info_span!("ui_channel", session_id = %self.inner.session_id);
        let outcome = self.stream(socket).instrument(span.clone()).await;
        span.in_scope(|| self.finish(outcome));
    }

    async fn stream(&self, mut socket: WebSocket) -> Result<(), ChannelError> {
        let inner = &self.inner;
        socket
            .send(encode_document(&inner.document)?)
            .await
            .map_err(ChannelError::Send)?;
        tracing::debug!("initial document sent");

        let mut edits = 0_usize;
        loop {
            let next = tokio::select! {
                () = inner.session.cancelled() => return Ok(()),
                next = receive(&mut socket, inner.idle_timeout) => next?,
            };

            let message = match next {
                None => return Err(ChannelError::ClosedByPeer),
                Some(Err(e)) => return Err(ChannelError::Receive(e)),
                Some(Ok(message)) => message,
            };

            let document = match decode_frame(&message)? {
                Inbound::Document(document) => *document,
                Inbound::Ignored => continue,
                Inbound::Closed => return Err(ChannelError::ClosedByPeer),
            };

            if document.is_disconnect() {
                inner.observer.notify(Notice::Disconnected);
                if let Err(e) = socket.send(disconnect_frame()).await {
                    tracing::debug!(error = %e, "close frame not delivered");
                }
                return Ok(());
            }

            edits += 1;
            tracing::debug!(edits, "edit received");
            inner.observer.notify(Notice::PersistingData);
            inner.persister.persist(&inner.session, document).await?;
            inner.observer.notify(Notice::Updated);
        }
    }
}

/// Next frame from the UI, bounded by `idle` when set.
async fn receive(
    socket: &mut WebSocket,
    idle: Option<Duration>,
) -> Result<Option<Result<Message, axum::Error>>, ChannelError> {
    match idle {
        Some(limit) => tokio::time::timeout(limit, socket.recv())
            .await
            .map_err(|_| ChannelError::IdleTimeout(limit)),
        None => Ok(socket.recv().await),
    }
}

/// WebSocket upgrade handler.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ChannelState>) -> Response {
    if !state.claim() {
        tracing::warn!("refusing a second UI connection");
        return (StatusCode::CONFLICT, "a UI session is already connected").into_response();
    }

    let failed = state.clone();
    ws.max_message_size(state.inner.max_message_bytes)
        .max_frame_size(state.inner.max_message_bytes)
        .on_failed_upgrade(move |e| failed.finish(Err(ChannelError::Upgrade(e))))
        .on_upgrade(move |socket| state.serve(socket))
}

/// Refuse upgrades from any origin other than the UI's.
async fn require_origin(
    State(state): State<ChannelState>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(rejection) = check_origin(request.headers(), &state.inner.expected_origin) {
        tracing::warn!(%rejection, "rejected WebSocket upgrade");
        return (StatusCode::FORBIDDEN, rejection.to_string()).into_response();
    }
    next.run(request).await
}

/// Create the channel router.
///
/// # Example
/// ```ignore
/// let app = create_channel_router(state);
/// axum::serve(listener, app).await?;
/// ```
#[must_use]
pub fn create_channel_router(state: ChannelState) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
