//! Custom prompt text: the tenant's current text merged over stock defaults.

use std::sync::Arc;

use branding_bridge_core::{
    CustomTextMap, Gateway, TaskGroup, TextBundleSource, TextSettings, TextTree, merge,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::aggregate::{AggregateError, until_cancelled};

/// Read the current text of every enabled prompt area and merge it over the
/// stock texts of the configured locale.
///
/// The stock bundle is a convenience: when it cannot be fetched or decoded
/// the current text is returned unmerged.
///
/// # Errors
/// Returns error if the current text of any enabled prompt area cannot be read.
pub async fn assemble_custom_text(
    ctx: &CancellationToken,
    gateway: Arc<dyn Gateway>,
    bundles: Arc<dyn TextBundleSource>,
    settings: &TextSettings,
) -> Result<CustomTextMap, AggregateError> {
    let mut reads = TaskGroup::new(ctx);
    for prompt in &settings.prompts {
        let gateway = Arc::clone(&gateway);
        let prompt = prompt.clone();
        let locale = settings.locale.clone();
        reads.spawn(move |token| read_current_text(token, gateway, prompt, locale));
    }

    let (current, bundle) = tokio::join!(reads.wait(), bundles.fetch_bundle(&settings.locale));

    let current: CustomTextMap = current?
        .into_iter()
        .map(|(prompt, text)| (prompt, Value::Object(text)))
        .collect();

    match bundle {
        Ok(bundle) => {
            let defaults = stock_text_for_enabled(bundle, settings);
            Ok(merge(&defaults, &current))
        }
        Err(e) => {
            tracing::warn!(error = %e, locale = %settings.locale, "default prompt texts unavailable, using current text only");
            Ok(current)
        }
    }
}

async fn read_current_text(
    token: CancellationToken,
    gateway: Arc<dyn Gateway>,
    prompt: String,
    locale: String,
) -> Result<(String, TextTree), AggregateError> {
    let text = until_cancelled(&token, gateway.read_custom_text(&prompt, &locale))
        .await?
        .map_err(|source| AggregateError::read(format!("custom text for '{prompt}'"), source))?;
    Ok((prompt, text))
}

/// Keep only the bundle entries of enabled prompt areas. Later entries win.
fn stock_text_for_enabled(bundle: Vec<TextTree>, settings: &TextSettings) -> TextTree {
    let mut defaults = TextTree::new();
    for entry in bundle {
        for (prompt, text) in entry {
            if settings.is_enabled(&prompt) {
                defaults.insert(prompt, text);
            }
        }
    }
    defaults
}
