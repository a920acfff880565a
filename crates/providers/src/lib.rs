//! LLM provider implementations for Covey.
//!
//! The workflow core only sees the [`covey_core::Provider`] trait; this crate
//! supplies an OpenAI-compatible HTTP implementation and an ordered fallback
//! chain assembled from configuration.

pub mod fallback;
pub mod openai_compat;

pub use fallback::FallbackProvider;
pub use openai_compat::OpenAiCompatProvider;

use covey_config::AppConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Build a single provider by name, consulting the config's provider table
/// first and falling back to the well-known endpoints.
pub fn build_provider(config: &AppConfig, name: &str) -> Arc<dyn covey_core::Provider> {
    let key_for = |explicit: &Option<String>| {
        explicit
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default()
    };

    if let Some(pc) = config.providers.get(name) {
        return Arc::new(OpenAiCompatProvider::new(
            name,
            pc.base_url.clone(),
            key_for(&pc.api_key),
        ));
    }

    let key = config.api_key.clone().unwrap_or_default();
    match name {
        "openai" => Arc::new(OpenAiCompatProvider::openai(key)),
        "groq" => Arc::new(OpenAiCompatProvider::groq(key)),
        "ollama" => Arc::new(OpenAiCompatProvider::ollama(None)),
        _ => Arc::new(OpenAiCompatProvider::openrouter(key)),
    }
}

/// Assemble the configured provider chain: a single provider when the order
/// has one entry, an ordered [`FallbackProvider`] otherwise.
pub fn from_config(config: &AppConfig) -> Arc<dyn covey_core::Provider> {
    let order = config.effective_provider_order();
    debug!(chain = ?order, "Assembling provider chain");

    if order.len() == 1 {
        return build_provider(config, &order[0]);
    }

    let mut chain = FallbackProvider::new("chain");
    for name in &order {
        let timeout = config
            .providers
            .get(name)
            .map(|pc| Duration::from_secs(pc.timeout_secs))
            .unwrap_or(Duration::from_secs(120));
        chain = chain.add(build_provider(config, name), timeout);
    }
    Arc::new(chain)
}
