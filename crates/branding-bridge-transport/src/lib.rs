//! Transport layer between the branding editor UI and the tenant.
//!
//! Provides:
//! - Channel protocol (origin check, frame decoding)
//! - WebSocket channel server, one UI connection per listener
//! - UI launcher
//! - Session lifecycle: bind, serve, launch, wait, tear down

pub mod launcher;
pub mod lifecycle;
pub mod protocol;
pub mod websocket;

pub use launcher::{BrowserLauncher, UiLauncher};
pub use lifecycle::{EditorSession, SessionError};
pub use protocol::{ChannelError, OriginRejected};
pub use websocket::{ChannelState, create_channel_router};
