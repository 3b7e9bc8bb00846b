//! Session configuration.

use std::{
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Origin of the local editor UI.
pub const DEFAULT_UI_ORIGIN: &str = "http://localhost:5173";

/// Cap on one inbound document (1 MB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1_000_000;

/// Location of the stock prompt texts. `{locale}` is substituted.
pub const DEFAULT_BUNDLE_URL: &str =
    "https://cdn.auth0.com/ulp/react-components/development/languages/{locale}/prompts.json";

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Editor session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Origin the UI is served from. Also the only accepted `Origin` header.
    pub ui_origin: String,
    /// Address the channel listener binds to. The port is always OS-assigned.
    pub bind_host: IpAddr,
    pub max_message_bytes: usize,
    /// Longest wait for the next inbound frame. `None` waits indefinitely.
    pub idle_timeout_secs: Option<u64>,
    /// Time the server gets to drain after cancellation.
    pub shutdown_grace_secs: u64,
    pub text: TextSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            ui_origin: DEFAULT_UI_ORIGIN.to_string(),
            bind_host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            idle_timeout_secs: None,
            shutdown_grace_secs: 5,
            text: TextSettings::default(),
        }
    }
}

impl EditorConfig {
    /// Load from a JSON file. Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// URL that opens the UI pointed at the channel on `port`.
    #[must_use]
    pub fn ui_launch_url(&self, port: u16) -> String {
        format!("{}?ws_port={port}", self.ui_origin)
    }

    #[must_use]
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Which prompt texts are edited, and in which locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    /// Enabled prompt areas.
    pub prompts: Vec<String>,
    pub locale: String,
    pub bundle_url: String,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            prompts: vec!["login".to_string()],
            locale: "en".to_string(),
            bundle_url: DEFAULT_BUNDLE_URL.to_string(),
        }
    }
}

impl TextSettings {
    /// Replace the enabled prompt areas.
    #[must_use]
    pub fn with_prompts<I>(mut self, prompts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.prompts = prompts.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `prompt` is one of the enabled areas.
    #[must_use]
    pub fn is_enabled(&self, prompt: &str) -> bool {
        self.prompts.iter().any(|p| p == prompt)
    }

    /// Bundle URL for the configured locale.
    #[must_use]
    pub fn bundle_url_for_locale(&self) -> String {
        self.bundle_url.replace("{locale}", &self.locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_local_ui() {
        let config = EditorConfig::default();
        assert_eq!(config.ui_launch_url(4321), "http://localhost:5173?ws_port=4321");
        assert_eq!(config.max_message_bytes, 1_000_000);
        assert_eq!(config.text.prompts, vec!["login"]);
        assert!(config.bind_host.is_loopback());
    }

    #[test]
    fn test_idle_timeout_is_opt_in() {
        assert_eq!(EditorConfig::default().idle_timeout(), None);

        let config: EditorConfig = serde_json::from_str(r#"{"idle_timeout_secs": 30}"#).unwrap();
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"text": {"prompts": ["login", "signup"]}}"#).unwrap();
        assert_eq!(config.ui_origin, DEFAULT_UI_ORIGIN);
        assert!(config.text.is_enabled("signup"));
        assert_eq!(config.text.locale, "en");
    }

    #[test]
    fn test_bundle_url_substitutes_locale() {
        let text = TextSettings {
            locale: "fr".into(),
            ..TextSettings::default()
        };
        assert!(text.bundle_url_for_locale().ends_with("/languages/fr/prompts.json"));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = EditorConfig::load("/nonexistent/branding-bridge.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
