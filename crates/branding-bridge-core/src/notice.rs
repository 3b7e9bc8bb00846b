//! User-facing progress notices.

use std::fmt;

/// Event the host renders to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Aggregation has started.
    GatheringData,
    /// The UI has been launched and is waiting for edits.
    PerformChanges,
    /// An edit was received and is being written back.
    PersistingData,
    /// An edit was written back.
    Updated,
    /// The UI ended the session.
    Disconnected,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::GatheringData => "Gathering branding data. This will take a while",
            Self::PerformChanges => "Perform your changes within the UI",
            Self::PersistingData => "Persisting branding data. This will take a while",
            Self::Updated => "Branding for the Universal Login updated",
            Self::Disconnected => {
                "Disconnected from the UI. Test the Universal Login by running: 'auth0 test login'"
            }
        };
        f.write_str(text)
    }
}

/// Receives notices as the session progresses.
///
/// Implement this trait to render notices in your terminal UI.
pub trait SessionObserver: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Observer that logs notices through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn notify(&self, notice: Notice) {
        tracing::info!("{notice}");
    }
}
