//! Write-back of edited documents.

use std::sync::Arc;

use branding_bridge_core::{
    AuthenticationProfile, BrandingSettings, CompositeDocument, Gateway, GatewayError, TaskGroup,
    TextTree, ThemeDescriptor, UniversalLoginTemplate,
};
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Serialized form of a prompt entry that carries no text.
const EMPTY_OBJECT: &[u8] = b"{}";

/// Persistence error.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to write {resource}: {source}")]
    Write {
        resource: String,
        #[source]
        source: GatewayError,
    },
    #[error("failed to look up the current theme: {0}")]
    ThemeLookup(#[source] GatewayError),
    #[error("custom text for prompt '{prompt}' is not a JSON object: {source}")]
    InvalidText {
        prompt: String,
        #[source]
        source: serde_json::Error,
    },
}

fn write_error(resource: impl Into<String>) -> impl FnOnce(GatewayError) -> PersistError {
    let resource = resource.into();
    move |source| PersistError::Write { resource, source }
}

/// Writes every sub-resource of an edited document back in parallel.
///
/// Writes are independent. When one fails the others still run, and the
/// ones that succeeded stay applied: there is no rollback.
#[derive(Clone)]
pub struct Persister {
    gateway: Arc<dyn Gateway>,
    locale: String,
}

impl Persister {
    #[must_use]
    pub fn new(gateway: Arc<dyn Gateway>, locale: impl Into<String>) -> Self {
        Self {
            gateway,
            locale: locale.into(),
        }
    }

    /// Persist `document`.
    ///
    /// # Errors
    /// Returns the first failed write once every write has finished.
    pub async fn persist(
        &self,
        ctx: &CancellationToken,
        document: CompositeDocument,
    ) -> Result<(), PersistError> {
        let CompositeDocument {
            authentication_profile,
            branding,
            templates,
            themes,
            custom_text,
            ..
        } = document;

        let mut group = TaskGroup::new(ctx);

        let gateway = Arc::clone(&self.gateway);
        group.spawn(move |_| write_template(gateway, templates));

        let gateway = Arc::clone(&self.gateway);
        group.spawn(move |_| write_theme(gateway, themes.without_id()));

        let gateway = Arc::clone(&self.gateway);
        group.spawn(move |_| write_profile(gateway, authentication_profile));

        let gateway = Arc::clone(&self.gateway);
        group.spawn(move |_| write_branding(gateway, branding));

        for (prompt, text) in custom_text {
            let gateway = Arc::clone(&self.gateway);
            let locale = self.locale.clone();
            group.spawn(move |_| write_custom_text(gateway, prompt, locale, text));
        }

        group.wait().await.map(drop)
    }
}

async fn write_template(
    gateway: Arc<dyn Gateway>,
    template: UniversalLoginTemplate,
) -> Result<(), PersistError> {
    let template = UniversalLoginTemplate {
        body: template.body,
    };
    gateway
        .update_template(&template)
        .await
        .map_err(write_error("universal login template"))
}

async fn write_theme(
    gateway: Arc<dyn Gateway>,
    theme: ThemeDescriptor,
) -> Result<(), PersistError> {
    let existing = gateway
        .read_default_theme()
        .await
        .map_err(PersistError::ThemeLookup)?;

    match existing.and_then(|t| t.theme_id) {
        Some(theme_id) => gateway
            .update_theme(&theme_id, &theme)
            .await
            .map_err(write_error(format!("theme {theme_id}")))?,
        None => gateway
            .create_theme(&theme)
            .await
            .map_err(write_error("theme"))?,
    };
    Ok(())
}

async fn write_profile(
    gateway: Arc<dyn Gateway>,
    profile: AuthenticationProfile,
) -> Result<(), PersistError> {
    gateway
        .update_authentication_profile(&profile)
        .await
        .map_err(write_error("authentication profile"))
}

async fn write_branding(
    gateway: Arc<dyn Gateway>,
    mut branding: BrandingSettings,
) -> Result<(), PersistError> {
    branding.logo_url = None;
    gateway
        .update_branding(&branding)
        .await
        .map_err(write_error("branding settings"))
}

async fn write_custom_text(
    gateway: Arc<dyn Gateway>,
    prompt: String,
    locale: String,
    text: Value,
) -> Result<(), PersistError> {
    let Some(payload) = text_payload(&prompt, &text)? else {
        tracing::debug!(%prompt, "skipping empty custom text");
        return Ok(());
    };

    gateway
        .update_custom_text(&prompt, &locale, &payload)
        .await
        .map_err(write_error(format!("custom text for '{prompt}'")))
}

/// Re-encode a prompt entry. `None` when there is nothing to write.
fn text_payload(prompt: &str, text: &Value) -> Result<Option<TextTree>, PersistError> {
    let invalid = |source| PersistError::InvalidText {
        prompt: prompt.to_string(),
        source,
    };

    let encoded = serde_json::to_vec(text).map_err(invalid)?;
    if encoded == EMPTY_OBJECT {
        return Ok(None);
    }

    let payload: TextTree = serde_json::from_slice(&encoded).map_err(invalid)?;
    Ok((!payload.is_empty()).then_some(payload))
}

#[cfg(test)]
mod tests {
    use branding_bridge_core::{DEFAULT_THEME, TenantInfo};
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::gateway::{MemoryGateway, Operation};

    fn edited_document() -> CompositeDocument {
        let mut themes = DEFAULT_THEME;
        themes.theme_id = Some("stale-id".into());
        let mut custom_text = serde_json::Map::new();
        custom_text.insert("login".into(), json!({"login": {"title": "Hello"}}));
        custom_text.insert("signup".into(), json!({}));

        CompositeDocument {
            connected: true,
            authentication_profile: AuthenticationProfile {
                identifier_first: Some(true),
                ..AuthenticationProfile::default()
            },
            branding: BrandingSettings {
                logo_url: Some("https://cdn.example.com/logo.png".into()),
                favicon_url: Some("https://cdn.example.com/favicon.ico".into()),
                ..BrandingSettings::default()
            },
            templates: UniversalLoginTemplate {
                body: Some("<html>edited</html>".into()),
            },
            themes,
            tenant: TenantInfo::default(),
            custom_text,
        }
    }

    #[tokio::test]
    async fn test_writes_every_sub_resource() {
        let gateway = Arc::new(MemoryGateway::new());
        let persister = Persister::new(gateway.clone(), "en");

        assert_ok!(
            persister
                .persist(&CancellationToken::new(), edited_document())
                .await
        );

        assert_eq!(
            gateway.template().unwrap().body.as_deref(),
            Some("<html>edited</html>")
        );
        assert_eq!(gateway.profile().identifier_first, Some(true));
        let branding = gateway.branding().unwrap();
        assert!(branding.logo_url.is_none());
        assert!(branding.favicon_url.is_some());
        assert_eq!(
            Value::Object(gateway.custom_text("login", "en").unwrap()),
            json!({"login": {"title": "Hello"}})
        );
        assert!(gateway.custom_text("signup", "en").is_none());

        let writes = gateway.writes();
        assert_eq!(writes.len(), 5);
        assert_eq!(
            writes
                .iter()
                .filter(|op| **op == Operation::UpdateCustomText)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_theme_is_created_without_stale_identity() {
        let gateway = Arc::new(MemoryGateway::new());
        let persister = Persister::new(gateway.clone(), "en");

        assert_ok!(
            persister
                .persist(&CancellationToken::new(), edited_document())
                .await
        );

        let theme = gateway.theme().unwrap();
        assert_eq!(theme.theme_id.as_deref(), Some("theme-1"));
        assert!(gateway.writes().contains(&Operation::CreateTheme));
    }

    #[tokio::test]
    async fn test_existing_theme_is_updated_by_its_own_identity() {
        let mut stored = DEFAULT_THEME;
        stored.theme_id = Some("theme-42".into());
        let gateway = Arc::new(MemoryGateway::new().with_theme(stored));
        let persister = Persister::new(gateway.clone(), "en");

        let mut document = edited_document();
        document.themes.colors.primary_button = "#000001".into();
        assert_ok!(persister.persist(&CancellationToken::new(), document).await);

        let theme = gateway.theme().unwrap();
        assert_eq!(theme.theme_id.as_deref(), Some("theme-42"));
        assert_eq!(theme.colors.primary_button, "#000001");
        assert!(gateway.writes().contains(&Operation::UpdateTheme));
        assert!(!gateway.writes().contains(&Operation::CreateTheme));
    }

    #[tokio::test]
    async fn test_failed_write_does_not_roll_back_siblings() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway.fail(
            Operation::UpdateTemplate,
            GatewayError::Rejected {
                status: 400,
                message: "invalid template".into(),
            },
        );
        let persister = Persister::new(gateway.clone(), "en");

        let err = assert_err!(
            persister
                .persist(&CancellationToken::new(), edited_document())
                .await
        );
        assert!(
            matches!(&err, PersistError::Write { resource, .. } if resource == "universal login template")
        );

        assert!(gateway.template().is_none());
        assert!(gateway.theme().is_some());
        assert!(gateway.writes().contains(&Operation::CreateTheme));
        assert!(gateway.writes().contains(&Operation::UpdateBranding));
    }

    #[tokio::test]
    async fn test_empty_custom_text_is_skipped() {
        let gateway = Arc::new(MemoryGateway::new());
        let persister = Persister::new(gateway.clone(), "en");

        let mut document = edited_document();
        document.custom_text.clear();
        assert_ok!(persister.persist(&CancellationToken::new(), document).await);

        assert!(!gateway.writes().contains(&Operation::UpdateCustomText));
    }

    #[test]
    fn test_text_payload_rules() {
        assert!(text_payload("login", &json!({})).unwrap().is_none());
        assert_eq!(
            Value::Object(text_payload("login", &json!({"a": "b"})).unwrap().unwrap()),
            json!({"a": "b"})
        );
        assert!(matches!(
            text_payload("login", &json!("flat")),
            Err(PersistError::InvalidText { .. })
        ));
    }
}
