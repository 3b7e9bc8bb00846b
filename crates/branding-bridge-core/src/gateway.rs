//! Remote resource traits.
//!
//! The management API client itself lives outside this workspace; hosts
//! adapt it to [`Gateway`]. The default text bundle comes from a separate
//! static source behind [`TextBundleSource`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    document::{AuthenticationProfile, BrandingSettings, TextTree, UniversalLoginTemplate},
    theme::ThemeDescriptor,
};

/// Status the remote service reports for a verified custom domain.
pub const DOMAIN_STATUS_READY: &str = "ready";

/// Gateway error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Whether the remote service refused the call for lack of permission.
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::Rejected { status: 403, .. })
    }
}

/// Custom domain registered on the tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomDomain {
    pub domain: String,
    pub status: String,
}

impl CustomDomain {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == DOMAIN_STATUS_READY
    }
}

/// Tenant settings as the remote service returns them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSettings {
    pub friendly_name: String,
    pub enabled_locales: Vec<String>,
}

/// Typed read/write operations on the tenant's branding sub-resources.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// List the tenant's custom domains.
    async fn list_custom_domains(&self) -> Result<Vec<CustomDomain>, GatewayError>;

    async fn read_authentication_profile(&self) -> Result<AuthenticationProfile, GatewayError>;

    /// Replace the authentication profile.
    async fn update_authentication_profile(
        &self,
        profile: &AuthenticationProfile,
    ) -> Result<(), GatewayError>;

    async fn read_branding(&self) -> Result<BrandingSettings, GatewayError>;

    async fn update_branding(&self, branding: &BrandingSettings) -> Result<(), GatewayError>;

    async fn read_template(&self) -> Result<UniversalLoginTemplate, GatewayError>;

    async fn update_template(&self, template: &UniversalLoginTemplate) -> Result<(), GatewayError>;

    /// Read the tenant's default theme. `None` when no theme exists yet.
    async fn read_default_theme(&self) -> Result<Option<ThemeDescriptor>, GatewayError>;

    /// Create a theme. The returned descriptor carries the assigned id.
    async fn create_theme(&self, theme: &ThemeDescriptor) -> Result<ThemeDescriptor, GatewayError>;

    async fn update_theme(
        &self,
        theme_id: &str,
        theme: &ThemeDescriptor,
    ) -> Result<ThemeDescriptor, GatewayError>;

    async fn read_tenant(&self) -> Result<TenantSettings, GatewayError>;

    /// Read the custom text of one prompt area in one locale.
    async fn read_custom_text(&self, prompt: &str, locale: &str) -> Result<TextTree, GatewayError>;

    /// Replace the custom text of one prompt area in one locale.
    async fn update_custom_text(
        &self,
        prompt: &str,
        locale: &str,
        text: &TextTree,
    ) -> Result<(), GatewayError>;
}

/// Source of the stock prompt texts for a locale.
#[async_trait]
pub trait TextBundleSource: Send + Sync {
    /// Fetch the bundle: a list of objects mapping prompt area to text tree.
    async fn fetch_bundle(&self, locale: &str) -> Result<Vec<TextTree>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_detection() {
        let forbidden = GatewayError::Rejected {
            status: 403,
            message: "nope".into(),
        };
        assert!(forbidden.is_forbidden());
        assert!(!GatewayError::NotFound("theme".into()).is_forbidden());
    }

    #[test]
    fn test_domain_readiness() {
        let ready = CustomDomain {
            domain: "login.example.com".into(),
            status: "ready".into(),
        };
        let pending = CustomDomain {
            status: "pending_verification".into(),
            ..ready.clone()
        };
        assert!(ready.is_ready());
        assert!(!pending.is_ready());
    }
}
