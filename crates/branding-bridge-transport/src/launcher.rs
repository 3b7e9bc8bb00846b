//! Opening the editor UI.

use std::io;

/// Opens the editor UI at a URL.
pub trait UiLauncher: Send + Sync {
    /// Open `url`.
    ///
    /// # Errors
    /// Returns error if the UI could not be opened.
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Opens the UI in the user's default web browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserLauncher;

impl UiLauncher for BrowserLauncher {
    fn open(&self, url: &str) -> io::Result<()> {
        tracing::info!(%url, "opening the branding editor in the browser");
        webbrowser::open(url)
    }
}
