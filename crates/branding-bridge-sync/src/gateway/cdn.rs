//! Stock prompt texts fetched over HTTP.

use async_trait::async_trait;
use branding_bridge_core::{GatewayError, TextBundleSource, TextSettings, TextTree};

/// Text bundle served from a static CDN location.
#[derive(Debug, Clone)]
pub struct CdnTextBundle {
    client: reqwest::Client,
    url_template: String,
}

impl CdnTextBundle {
    /// Create a bundle source. `{locale}` in `url_template` is substituted per fetch.
    #[must_use]
    pub fn new(url_template: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url_template)
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }

    /// Bundle source for the configured bundle URL.
    #[must_use]
    pub fn from_settings(settings: &TextSettings) -> Self {
        Self::new(settings.bundle_url.clone())
    }

    fn url(&self, locale: &str) -> String {
        self.url_template.replace("{locale}", locale)
    }
}

#[async_trait]
impl TextBundleSource for CdnTextBundle {
    async fn fetch_bundle(&self, locale: &str) -> Result<Vec<TextTree>, GatewayError> {
        let url = self.url(locale);
        tracing::debug!(%url, "fetching default prompt texts");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: format!("GET {url}"),
            });
        }

        response
            .json::<Vec<TextTree>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::StatusCode, routing::get};
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_fetches_bundle_for_locale() {
        let app = Router::new().route(
            "/languages/de/prompts.json",
            get(|| async { Json(json!([{"login": {"title": "Anmelden"}}, {"signup": {}}])) }),
        );
        let base = serve(app).await;

        let bundle = CdnTextBundle::new(format!("{base}/languages/{{locale}}/prompts.json"));
        let entries = assert_ok!(bundle.fetch_bundle("de").await);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["login"]["title"], "Anmelden");
    }

    #[tokio::test]
    async fn test_error_status_is_rejected() {
        let app = Router::new().route(
            "/languages/en/prompts.json",
            get(|| async { StatusCode::NOT_FOUND }),
        );
        let base = serve(app).await;

        let bundle = CdnTextBundle::new(format!("{base}/languages/{{locale}}/prompts.json"));
        let err = assert_err!(bundle.fetch_bundle("en").await);
        assert!(matches!(err, GatewayError::Rejected { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_non_array_body_is_decode_error() {
        let app = Router::new().route(
            "/languages/en/prompts.json",
            get(|| async { Json(json!({"login": {}})) }),
        );
        let base = serve(app).await;

        let bundle = CdnTextBundle::new(format!("{base}/languages/{{locale}}/prompts.json"));
        assert!(matches!(
            bundle.fetch_bundle("en").await,
            Err(GatewayError::Decode(_))
        ));
    }
}
