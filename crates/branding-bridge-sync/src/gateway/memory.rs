//! In-memory gateway.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use branding_bridge_core::{
    AuthenticationProfile, BrandingSettings, CustomDomain, Gateway, GatewayError, TenantSettings,
    TextBundleSource, TextTree, ThemeDescriptor, UniversalLoginTemplate,
};

/// Gateway operation, used for failure injection and the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListCustomDomains,
    ReadProfile,
    UpdateProfile,
    ReadBranding,
    UpdateBranding,
    ReadTemplate,
    UpdateTemplate,
    ReadTheme,
    CreateTheme,
    UpdateTheme,
    ReadTenant,
    ReadCustomText,
    UpdateCustomText,
}

impl Operation {
    /// Whether the operation changes remote state.
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(
            self,
            Self::UpdateProfile
                | Self::UpdateBranding
                | Self::UpdateTemplate
                | Self::CreateTheme
                | Self::UpdateTheme
                | Self::UpdateCustomText
        )
    }
}

#[derive(Default)]
struct Tenant {
    domains: Vec<CustomDomain>,
    profile: AuthenticationProfile,
    branding: Option<BrandingSettings>,
    template: Option<UniversalLoginTemplate>,
    theme: Option<ThemeDescriptor>,
    settings: TenantSettings,
    custom_text: HashMap<(String, String), TextTree>,
    themes_created: usize,
}

/// In-memory gateway implementation.
///
/// Useful for development, demos and tests. Every operation can be made to
/// fail on demand. Served reads and applied writes are logged in order.
#[derive(Default)]
pub struct MemoryGateway {
    tenant: RwLock<Tenant>,
    failures: RwLock<HashMap<Operation, GatewayError>>,
    log: RwLock<Vec<Operation>>,
}

impl MemoryGateway {
    /// Create an empty tenant: no domains, no branding, no theme.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom domain with the given status.
    #[must_use]
    pub fn with_custom_domain(mut self, domain: &str, status: &str) -> Self {
        self.tenant_mut().domains.push(CustomDomain {
            domain: domain.to_string(),
            status: status.to_string(),
        });
        self
    }

    #[must_use]
    pub fn with_profile(mut self, profile: AuthenticationProfile) -> Self {
        self.tenant_mut().profile = profile;
        self
    }

    #[must_use]
    pub fn with_branding(mut self, branding: BrandingSettings) -> Self {
        self.tenant_mut().branding = Some(branding);
        self
    }

    #[must_use]
    pub fn with_template(mut self, body: &str) -> Self {
        self.tenant_mut().template = Some(UniversalLoginTemplate {
            body: Some(body.to_string()),
        });
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: ThemeDescriptor) -> Self {
        self.tenant_mut().theme = Some(theme);
        self
    }

    #[must_use]
    pub fn with_tenant(mut self, friendly_name: &str, enabled_locales: &[&str]) -> Self {
        self.tenant_mut().settings = TenantSettings {
            friendly_name: friendly_name.to_string(),
            enabled_locales: enabled_locales.iter().map(ToString::to_string).collect(),
        };
        self
    }

    #[must_use]
    pub fn with_custom_text(mut self, prompt: &str, locale: &str, text: TextTree) -> Self {
        self.tenant_mut()
            .custom_text
            .insert((prompt.to_string(), locale.to_string()), text);
        self
    }

    /// Make every later call of `operation` fail with `error`.
    pub fn fail(&self, operation: Operation, error: GatewayError) {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(operation, error);
    }

    /// Every served read and applied write, in order.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applied writes, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<Operation> {
        self.operations()
            .into_iter()
            .filter(|op| op.is_write())
            .collect()
    }

    #[must_use]
    pub fn profile(&self) -> AuthenticationProfile {
        self.snapshot(|t| t.profile.clone())
    }

    #[must_use]
    pub fn branding(&self) -> Option<BrandingSettings> {
        self.snapshot(|t| t.branding.clone())
    }

    #[must_use]
    pub fn template(&self) -> Option<UniversalLoginTemplate> {
        self.snapshot(|t| t.template.clone())
    }

    #[must_use]
    pub fn theme(&self) -> Option<ThemeDescriptor> {
        self.snapshot(|t| t.theme.clone())
    }

    #[must_use]
    pub fn custom_text(&self, prompt: &str, locale: &str) -> Option<TextTree> {
        self.snapshot(|t| {
            t.custom_text
                .get(&(prompt.to_string(), locale.to_string()))
                .cloned()
        })
    }

    fn tenant_mut(&mut self) -> &mut Tenant {
        self.tenant.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot<T>(&self, f: impl FnOnce(&Tenant) -> T) -> T {
        f(&self.tenant.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn check(&self, operation: Operation) -> Result<(), GatewayError> {
        let failures = self
            .failures
            .read()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        failures.get(&operation).map_or(Ok(()), |err| Err(err.clone()))
    }

    fn read(&self, operation: Operation) -> Result<RwLockReadGuard<'_, Tenant>, GatewayError> {
        self.check(operation)?;
        let tenant = self
            .tenant
            .read()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        self.record(operation);
        Ok(tenant)
    }

    fn write(&self, operation: Operation) -> Result<RwLockWriteGuard<'_, Tenant>, GatewayError> {
        self.check(operation)?;
        self.tenant
            .write()
            .map_err(|e| GatewayError::Transport(e.to_string()))
    }

    fn record(&self, operation: Operation) {
        self.log
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(operation);
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn list_custom_domains(&self) -> Result<Vec<CustomDomain>, GatewayError> {
        Ok(self.read(Operation::ListCustomDomains)?.domains.clone())
    }

    async fn read_authentication_profile(&self) -> Result<AuthenticationProfile, GatewayError> {
        Ok(self.read(Operation::ReadProfile)?.profile.clone())
    }

    async fn update_authentication_profile(
        &self,
        profile: &AuthenticationProfile,
    ) -> Result<(), GatewayError> {
        self.write(Operation::UpdateProfile)?.profile = profile.clone();
        self.record(Operation::UpdateProfile);
        Ok(())
    }

    async fn read_branding(&self) -> Result<BrandingSettings, GatewayError> {
        self.read(Operation::ReadBranding)?
            .branding
            .clone()
            .ok_or_else(|| GatewayError::NotFound("branding settings".into()))
    }

    async fn update_branding(&self, branding: &BrandingSettings) -> Result<(), GatewayError> {
        self.write(Operation::UpdateBranding)?.branding = Some(branding.clone());
        self.record(Operation::UpdateBranding);
        Ok(())
    }

    async fn read_template(&self) -> Result<UniversalLoginTemplate, GatewayError> {
        self.read(Operation::ReadTemplate)?
            .template
            .clone()
            .ok_or_else(|| GatewayError::NotFound("universal login template".into()))
    }

    async fn update_template(&self, template: &UniversalLoginTemplate) -> Result<(), GatewayError> {
        self.write(Operation::UpdateTemplate)?.template = Some(template.clone());
        self.record(Operation::UpdateTemplate);
        Ok(())
    }

    async fn read_default_theme(&self) -> Result<Option<ThemeDescriptor>, GatewayError> {
        Ok(self.read(Operation::ReadTheme)?.theme.clone())
    }

    async fn create_theme(&self, theme: &ThemeDescriptor) -> Result<ThemeDescriptor, GatewayError> {
        let created = {
            let mut tenant = self.write(Operation::CreateTheme)?;
            tenant.themes_created += 1;
            let mut created = theme.clone();
            created.theme_id = Some(format!("theme-{}", tenant.themes_created));
            tenant.theme = Some(created.clone());
            created
        };
        self.record(Operation::CreateTheme);
        Ok(created)
    }

    async fn update_theme(
        &self,
        theme_id: &str,
        theme: &ThemeDescriptor,
    ) -> Result<ThemeDescriptor, GatewayError> {
        let updated = {
            let mut tenant = self.write(Operation::UpdateTheme)?;
            let exists = tenant
                .theme
                .as_ref()
                .is_some_and(|t| t.theme_id.as_deref() == Some(theme_id));
            if !exists {
                return Err(GatewayError::NotFound(format!("theme {theme_id}")));
            }
            let mut updated = theme.clone();
            updated.theme_id = Some(theme_id.to_string());
            tenant.theme = Some(updated.clone());
            updated
        };
        self.record(Operation::UpdateTheme);
        Ok(updated)
    }

    async fn read_tenant(&self) -> Result<TenantSettings, GatewayError> {
        Ok(self.read(Operation::ReadTenant)?.settings.clone())
    }

    async fn read_custom_text(&self, prompt: &str, locale: &str) -> Result<TextTree, GatewayError> {
        Ok(self
            .read(Operation::ReadCustomText)?
            .custom_text
            .get(&(prompt.to_string(), locale.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn update_custom_text(
        &self,
        prompt: &str,
        locale: &str,
        text: &TextTree,
    ) -> Result<(), GatewayError> {
        self.write(Operation::UpdateCustomText)?
            .custom_text
            .insert((prompt.to_string(), locale.to_string()), text.clone());
        self.record(Operation::UpdateCustomText);
        Ok(())
    }
}

/// Text bundle with a fixed outcome.
pub struct StaticBundle {
    outcome: Result<Vec<TextTree>, GatewayError>,
}

impl StaticBundle {
    #[must_use]
    pub const fn new(entries: Vec<TextTree>) -> Self {
        Self {
            outcome: Ok(entries),
        }
    }

    /// Bundle whose every fetch fails with `error`.
    #[must_use]
    pub const fn failing(error: GatewayError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

#[async_trait]
impl TextBundleSource for StaticBundle {
    async fn fetch_bundle(&self, _locale: &str) -> Result<Vec<TextTree>, GatewayError> {
        self.outcome.clone()
    }
}
