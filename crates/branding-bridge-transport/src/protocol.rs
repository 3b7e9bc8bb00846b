//! Wire protocol between the editor UI and the channel server.
//!
//! The server sends one text frame holding the composite document right
//! after the upgrade. The UI then sends zero or more documents of the same
//! shape; one with `"connected": false` ends the session.

use std::time::Duration;

use axum::{
    extract::ws::{CloseFrame, Message, Utf8Bytes, close_code},
    http::{HeaderMap, header::ORIGIN},
};
use branding_bridge_core::CompositeDocument;
use branding_bridge_sync::PersistError;
use thiserror::Error;

/// Channel error. Any of these ends the session.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("WebSocket upgrade failed: {0}")]
    Upgrade(#[source] axum::Error),
    #[error("failed to encode the document: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to send to the UI: {0}")]
    Send(#[source] axum::Error),
    #[error("failed to receive from the UI: {0}")]
    Receive(#[source] axum::Error),
    #[error("invalid document from the UI: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("the UI closed the connection without disconnecting")]
    ClosedByPeer,
    #[error("no message from the UI within {0:?}")]
    IdleTimeout(Duration),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Reason an upgrade request was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OriginRejected {
    #[error("origin {0} is not allowed")]
    Mismatch(String),
    #[error("origin header is not valid UTF-8")]
    Unreadable,
}

/// Accept requests without an `Origin` header, or with exactly `expected`.
///
/// # Errors
/// Returns the rejection reason for any other origin.
pub fn check_origin(headers: &HeaderMap, expected: &str) -> Result<(), OriginRejected> {
    let Some(origin) = headers.get(ORIGIN) else {
        return Ok(());
    };
    let origin = origin.to_str().map_err(|_| OriginRejected::Unreadable)?;
    if origin == expected {
        Ok(())
    } else {
        Err(OriginRejected::Mismatch(origin.to_string()))
    }
}

/// Frame received from the UI.
#[derive(Debug)]
pub enum Inbound {
    Document(Box<CompositeDocument>),
    /// Control frame with no content for us.
    Ignored,
    Closed,
}

/// Decode one frame. Binary frames carrying JSON are accepted like text.
///
/// # Errors
/// Returns error if a data frame does not hold a composite document.
pub fn decode_frame(message: &Message) -> Result<Inbound, ChannelError> {
    let document: CompositeDocument = match message {
        Message::Text(text) => serde_json::from_str(text.as_str()),
        Message::Binary(data) => serde_json::from_slice(data),
        Message::Ping(_) | Message::Pong(_) => return Ok(Inbound::Ignored),
        Message::Close(_) => return Ok(Inbound::Closed),
    }
    .map_err(ChannelError::Decode)?;
    Ok(Inbound::Document(Box::new(document)))
}

/// Encode the document as a text frame.
///
/// # Errors
/// Returns error if the document cannot be serialized.
pub fn encode_document(document: &CompositeDocument) -> Result<Message, ChannelError> {
    let json = serde_json::to_string(document).map_err(ChannelError::Encode)?;
    Ok(Message::Text(json.into()))
}

/// Close frame acknowledging a disconnect request.
#[must_use]
pub fn disconnect_frame() -> Message {
    Message::Close(Some(CloseFrame {
        code: close_code::NORMAL,
        reason: Utf8Bytes::from_static("disconnected"),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    const UI: &str = "http://localhost:5173";

    fn with_origin(origin: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_static(origin));
        headers
    }

    #[test]
    fn test_missing_origin_is_allowed() {
        assert_eq!(check_origin(&HeaderMap::new(), UI), Ok(()));
    }

    #[test]
    fn test_exact_origin_is_allowed() {
        assert_eq!(check_origin(&with_origin("http://localhost:5173"), UI), Ok(()));
    }

    #[test]
    fn test_other_origins_are_rejected() {
        for origin in [
            "http://evil.example",
            "http://localhost:5174",
            "https://localhost:5173",
            "http://localhost:5173.evil.example",
        ] {
            assert_eq!(
                check_origin(&with_origin(origin), UI),
                Err(OriginRejected::Mismatch(origin.to_string()))
            );
        }
    }

    #[test]
    fn test_unreadable_origin_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_bytes(b"http://\xfflocal").unwrap());
        assert_eq!(check_origin(&headers, UI), Err(OriginRejected::Unreadable));
    }

    #[test]
    fn test_text_and_binary_documents_decode() {
        let text = Message::Text(r#"{"connected": true}"#.into());
        assert!(matches!(decode_frame(&text), Ok(Inbound::Document(d)) if d.connected));

        let binary = Message::Binary(br#"{"connected": false}"#.to_vec().into());
        assert!(matches!(decode_frame(&binary), Ok(Inbound::Document(d)) if d.is_disconnect()));
    }

    #[test]
    fn test_control_frames() {
        assert!(matches!(
            decode_frame(&Message::Ping(Vec::new().into())),
            Ok(Inbound::Ignored)
        ));
        assert!(matches!(decode_frame(&Message::Close(None)), Ok(Inbound::Closed)));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let junk = Message::Text("not json".into());
        assert!(matches!(decode_frame(&junk), Err(ChannelError::Decode(_))));
    }

    #[test]
    fn test_encoded_document_is_text() {
        let document = CompositeDocument {
            connected: true,
            ..CompositeDocument::default()
        };
        let Message::Text(json) = encode_document(&document).unwrap() else {
            panic!("expected a text frame");
        };
        assert!(json.as_str().contains(r#""connected":true"#));
    }
}
