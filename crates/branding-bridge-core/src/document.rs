//! The composite branding document exchanged with the editor UI.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::theme::ThemeDescriptor;

/// Nested key/value tree of localized strings.
pub type TextTree = Map<String, Value>;

/// Prompt-area name to its localized text tree.
pub type CustomTextMap = Map<String, Value>;

/// Primary color applied when the tenant has no branding colors yet.
pub const DEFAULT_PRIMARY_COLOR: &str = "#0059d6";

/// Page background applied when the tenant has no branding colors yet.
pub const DEFAULT_PAGE_BACKGROUND: &str = "#000000";

/// Full branding snapshot sent to the UI and received back on every edit.
///
/// Every field except `connected` defaults when absent so that a bare
/// `{"connected": false}` decodes as a disconnect request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeDocument {
    /// True while a session is live. False from the UI means "disconnect".
    pub connected: bool,
    pub authentication_profile: AuthenticationProfile,
    pub branding: BrandingSettings,
    pub templates: UniversalLoginTemplate,
    pub themes: ThemeDescriptor,
    pub tenant: TenantInfo,
    pub custom_text: CustomTextMap,
}

impl CompositeDocument {
    /// Document the UI sends to end the session.
    #[must_use]
    pub fn disconnect() -> Self {
        Self::default()
    }

    /// Whether this document is a disconnect request rather than an edit.
    #[must_use]
    pub const fn is_disconnect(&self) -> bool {
        !self.connected
    }
}

/// Login flow settings of the tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub universal_login_experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_first: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webauthn_platform_first_factor: Option<bool>,
}

/// Tenant-wide branding settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<BrandingColors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    /// Managed by the remote service; cleared before every write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<BrandingFont>,
}

impl BrandingSettings {
    /// Fill in the default colors when none are configured.
    #[must_use]
    pub fn with_default_colors(mut self) -> Self {
        if self.colors.is_none() {
            self.colors = Some(BrandingColors {
                primary: Some(DEFAULT_PRIMARY_COLOR.to_string()),
                page_background: Some(DEFAULT_PAGE_BACKGROUND.to_string()),
            });
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingColors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_background: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingFont {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Universal login page template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversalLoginTemplate {
    /// Raw markup of the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Read-only tenant facts shown in the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantInfo {
    pub friendly_name: String,
    pub enabled_locales: Vec<String>,
    pub domain: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_disconnect_decodes() {
        let doc: CompositeDocument = serde_json::from_str(r#"{"connected": false}"#).unwrap();
        assert!(doc.is_disconnect());
        assert!(doc.custom_text.is_empty());
        assert_eq!(doc, CompositeDocument::disconnect());
    }

    #[test]
    fn test_wire_field_names() {
        let doc = CompositeDocument {
            connected: true,
            ..CompositeDocument::default()
        };
        let json = serde_json::to_value(&doc).unwrap();
        for key in [
            "connected",
            "authentication_profile",
            "branding",
            "templates",
            "themes",
            "tenant",
            "custom_text",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_default_colors_only_fill_gaps() {
        let filled = BrandingSettings::default().with_default_colors();
        let colors = filled.colors.unwrap();
        assert_eq!(colors.primary.as_deref(), Some(DEFAULT_PRIMARY_COLOR));
        assert_eq!(colors.page_background.as_deref(), Some(DEFAULT_PAGE_BACKGROUND));

        let custom = BrandingSettings {
            colors: Some(BrandingColors {
                primary: Some("#ff0000".into()),
                page_background: None,
            }),
            ..BrandingSettings::default()
        }
        .with_default_colors();
        assert_eq!(custom.colors.unwrap().primary.as_deref(), Some("#ff0000"));
    }
}
