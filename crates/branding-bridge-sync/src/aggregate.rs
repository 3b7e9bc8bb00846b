//! Composite document aggregation.

use std::{future::Future, sync::Arc};

use branding_bridge_core::{
    AuthenticationProfile, BrandingSettings, CompositeDocument, CustomTextMap, DEFAULT_THEME,
    Gateway, GatewayError, TaskGroup, TenantInfo, TenantSettings, TextBundleSource, TextSettings,
    ThemeDescriptor, UniversalLoginTemplate,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::custom_text::assemble_custom_text;

/// Aggregation error.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error(
        "this feature requires at least one custom domain to be set and verified for the tenant"
    )]
    CustomDomainRequired,
    #[error("this feature is not allowed on the tenant's current plan")]
    FeatureNotAllowed,
    #[error("failed to read {resource}: {source}")]
    Read {
        resource: String,
        #[source]
        source: GatewayError,
    },
    #[error("aggregation cancelled")]
    Cancelled,
}

impl AggregateError {
    pub(crate) fn read(resource: impl Into<String>, source: GatewayError) -> Self {
        Self::Read {
            resource: resource.into(),
            source,
        }
    }
}

/// Await `fut` unless `token` is cancelled first.
pub(crate) async fn until_cancelled<F: Future>(
    token: &CancellationToken,
    fut: F,
) -> Result<F::Output, AggregateError> {
    tokio::select! {
        biased;
        () = token.cancelled() => Err(AggregateError::Cancelled),
        output = fut => Ok(output),
    }
}

/// One successfully gathered sub-resource.
enum Piece {
    Precondition,
    Profile(AuthenticationProfile),
    Branding(BrandingSettings),
    Template(UniversalLoginTemplate),
    Theme(ThemeDescriptor),
    Tenant(TenantSettings),
    CustomText(CustomTextMap),
}

/// Builds the composite document from parallel gateway reads.
pub struct Aggregator {
    gateway: Arc<dyn Gateway>,
    bundles: Arc<dyn TextBundleSource>,
    text: TextSettings,
}

impl Aggregator {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn Gateway>,
        bundles: Arc<dyn TextBundleSource>,
        text: TextSettings,
    ) -> Self {
        Self {
            gateway,
            bundles,
            text,
        }
    }

    /// Gather every sub-resource of the tenant into one document.
    ///
    /// Branding, template and theme fall back to defaults when unreadable.
    /// The custom-domain check, profile, tenant and custom text are required.
    ///
    /// # Errors
    /// Returns the first required read that failed. No partial document is produced.
    pub async fn aggregate(
        &self,
        ctx: &CancellationToken,
        tenant_domain: &str,
    ) -> Result<CompositeDocument, AggregateError> {
        let mut group = TaskGroup::new(ctx);

        let gateway = Arc::clone(&self.gateway);
        group.spawn(move |token| ensure_custom_domain(token, gateway));

        let gateway = Arc::clone(&self.gateway);
        group.spawn(move |token| read_profile(token, gateway));

        let gateway = Arc::clone(&self.gateway);
        group.spawn(move |token| read_branding_or_default(token, gateway));

        let gateway = Arc::clone(&self.gateway);
        group.spawn(move |token| read_template_or_empty(token, gateway));

        let gateway = Arc::clone(&self.gateway);
        group.spawn(move |token| read_theme_or_default(token, gateway));

        let gateway = Arc::clone(&self.gateway);
        group.spawn(move |token| read_tenant(token, gateway));

        let gateway = Arc::clone(&self.gateway);
        let bundles = Arc::clone(&self.bundles);
        let text = self.text.clone();
        group.spawn(move |token| async move {
            assemble_custom_text(&token, gateway, bundles, &text)
                .await
                .map(Piece::CustomText)
        });

        let pieces = group.wait().await?;
        Ok(assemble(pieces, tenant_domain))
    }
}

fn assemble(pieces: Vec<Piece>, tenant_domain: &str) -> CompositeDocument {
    let mut document = CompositeDocument {
        connected: true,
        themes: DEFAULT_THEME,
        ..CompositeDocument::default()
    };
    document.tenant.domain = tenant_domain.to_string();

    for piece in pieces {
        match piece {
            Piece::Precondition => {}
            Piece::Profile(profile) => document.authentication_profile = profile,
            Piece::Branding(branding) => document.branding = branding,
            Piece::Template(template) => document.templates = template,
            Piece::Theme(theme) => document.themes = theme,
            Piece::Tenant(settings) => {
                document.tenant = TenantInfo {
                    friendly_name: settings.friendly_name,
                    enabled_locales: settings.enabled_locales,
                    domain: tenant_domain.to_string(),
                };
            }
            Piece::CustomText(text) => document.custom_text = text,
        }
    }

    document
}

async fn ensure_custom_domain(
    token: CancellationToken,
    gateway: Arc<dyn Gateway>,
) -> Result<Piece, AggregateError> {
    let domains = match until_cancelled(&token, gateway.list_custom_domains()).await? {
        Ok(domains) => domains,
        Err(e) if e.is_forbidden() => return Err(AggregateError::FeatureNotAllowed),
        Err(e) => return Err(AggregateError::read("custom domains", e)),
    };

    if domains.iter().any(|d| d.is_ready()) {
        Ok(Piece::Precondition)
    } else {
        Err(AggregateError::CustomDomainRequired)
    }
}

async fn read_profile(
    token: CancellationToken,
    gateway: Arc<dyn Gateway>,
) -> Result<Piece, AggregateError> {
    until_cancelled(&token, gateway.read_authentication_profile())
        .await?
        .map(Piece::Profile)
        .map_err(|e| AggregateError::read("authentication profile", e))
}

async fn read_branding_or_default(
    token: CancellationToken,
    gateway: Arc<dyn Gateway>,
) -> Result<Piece, AggregateError> {
    let branding = until_cancelled(&token, gateway.read_branding())
        .await?
        .unwrap_or_else(|e| {
            tracing::debug!(error = %e, "branding settings unavailable, using defaults");
            BrandingSettings::default()
        });
    Ok(Piece::Branding(branding.with_default_colors()))
}

async fn read_template_or_empty(
    token: CancellationToken,
    gateway: Arc<dyn Gateway>,
) -> Result<Piece, AggregateError> {
    let template = until_cancelled(&token, gateway.read_template())
        .await?
        .unwrap_or_else(|e| {
            tracing::debug!(error = %e, "universal login template unavailable, starting empty");
            UniversalLoginTemplate::default()
        });
    Ok(Piece::Template(template))
}

async fn read_theme_or_default(
    token: CancellationToken,
    gateway: Arc<dyn Gateway>,
) -> Result<Piece, AggregateError> {
    let theme = match until_cancelled(&token, gateway.read_default_theme()).await? {
        Ok(Some(theme)) => theme,
        Ok(None) => DEFAULT_THEME,
        Err(e) => {
            tracing::debug!(error = %e, "theme unavailable, using the default theme");
            DEFAULT_THEME
        }
    };
    Ok(Piece::Theme(theme))
}

async fn read_tenant(
    token: CancellationToken,
    gateway: Arc<dyn Gateway>,
) -> Result<Piece, AggregateError> {
    until_cancelled(&token, gateway.read_tenant())
        .await?
        .map(Piece::Tenant)
        .map_err(|e| AggregateError::read("tenant settings", e))
}

#[cfg(test)]
mod tests {
    use branding_bridge_core::{BrandingColors, TextTree, document::DEFAULT_PRIMARY_COLOR};
    use serde_json::{Value, json};
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::gateway::{MemoryGateway, Operation, StaticBundle};

    const DOMAIN: &str = "tenant.example.com";

    fn ready_tenant() -> MemoryGateway {
        MemoryGateway::new()
            .with_custom_domain("login.example.com", "ready")
            .with_tenant("Example", &["en", "fr"])
            .with_profile(AuthenticationProfile {
                universal_login_experience: Some("new".into()),
                ..AuthenticationProfile::default()
            })
    }

    fn aggregator(gateway: MemoryGateway) -> Aggregator {
        Aggregator::new(
            Arc::new(gateway),
            Arc::new(StaticBundle::new(Vec::<TextTree>::new())),
            TextSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_first_time_tenant_gets_defaults() {
        let doc = assert_ok!(
            aggregator(ready_tenant())
                .aggregate(&CancellationToken::new(), DOMAIN)
                .await
        );

        assert!(doc.connected);
        assert_eq!(doc.themes, DEFAULT_THEME);
        assert!(doc.templates.body.is_none());
        assert_eq!(
            doc.branding.colors.and_then(|c| c.primary).as_deref(),
            Some(DEFAULT_PRIMARY_COLOR)
        );
        assert_eq!(doc.tenant.friendly_name, "Example");
        assert_eq!(doc.tenant.enabled_locales, vec!["en", "fr"]);
        assert_eq!(doc.tenant.domain, DOMAIN);
        assert_eq!(
            doc.authentication_profile.universal_login_experience.as_deref(),
            Some("new")
        );
        assert_eq!(Value::Object(doc.custom_text), json!({"login": {}}));
    }

    #[tokio::test]
    async fn test_configured_resources_are_used() {
        let mut theme = DEFAULT_THEME;
        theme.theme_id = Some("theme-9".into());
        theme.colors.primary_button = "#abcdef".into();
        let gateway = ready_tenant()
            .with_template("<html>{%- auth0:widget -%}</html>")
            .with_theme(theme.clone())
            .with_branding(BrandingSettings {
                colors: Some(BrandingColors {
                    primary: Some("#ff0000".into()),
                    page_background: None,
                }),
                ..BrandingSettings::default()
            });

        let doc = assert_ok!(
            aggregator(gateway)
                .aggregate(&CancellationToken::new(), DOMAIN)
                .await
        );
        assert_eq!(doc.themes, theme);
        assert_eq!(
            doc.templates.body.as_deref(),
            Some("<html>{%- auth0:widget -%}</html>")
        );
        assert_eq!(
            doc.branding.colors.and_then(|c| c.primary).as_deref(),
            Some("#ff0000")
        );
    }

    #[tokio::test]
    async fn test_theme_read_failure_falls_back() {
        let gateway = ready_tenant().with_theme(ThemeDescriptor::default());
        gateway.fail(
            Operation::ReadTheme,
            GatewayError::Transport("timeout".into()),
        );
        gateway.fail(
            Operation::ReadBranding,
            GatewayError::Transport("timeout".into()),
        );

        let doc = assert_ok!(
            aggregator(gateway)
                .aggregate(&CancellationToken::new(), DOMAIN)
                .await
        );
        assert_eq!(doc.themes, DEFAULT_THEME);
        assert!(doc.branding.colors.is_some());
    }

    #[tokio::test]
    async fn test_missing_custom_domain_aborts() {
        let gateway = MemoryGateway::new()
            .with_custom_domain("login.example.com", "pending_verification")
            .with_tenant("Example", &["en"]);

        let err = assert_err!(
            aggregator(gateway)
                .aggregate(&CancellationToken::new(), DOMAIN)
                .await
        );
        assert!(matches!(err, AggregateError::CustomDomainRequired));
    }

    #[tokio::test]
    async fn test_forbidden_domain_listing_means_not_allowed() {
        let gateway = ready_tenant();
        gateway.fail(
            Operation::ListCustomDomains,
            GatewayError::Rejected {
                status: 403,
                message: "Insufficient scope".into(),
            },
        );

        let err = assert_err!(
            aggregator(gateway)
                .aggregate(&CancellationToken::new(), DOMAIN)
                .await
        );
        assert!(matches!(err, AggregateError::FeatureNotAllowed));
    }

    #[tokio::test]
    async fn test_required_reads_abort() {
        for operation in [Operation::ReadProfile, Operation::ReadTenant] {
            let gateway = ready_tenant();
            gateway.fail(operation, GatewayError::Transport("reset".into()));

            let err = assert_err!(
                aggregator(gateway)
                    .aggregate(&CancellationToken::new(), DOMAIN)
                    .await
            );
            assert!(
                matches!(err, AggregateError::Read { .. }),
                "{operation:?}: {err}"
            );
        }
    }

    #[tokio::test]
    async fn test_cancelled_context_aborts() {
        let ctx = CancellationToken::new();
        ctx.cancel();

        let err = assert_err!(aggregator(ready_tenant()).aggregate(&ctx, DOMAIN).await);
        assert!(matches!(err, AggregateError::Cancelled));
    }
}
