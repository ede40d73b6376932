//! LLM integration.
//!
//! The wizard talks to an `LlmProvider`; the only shipped backend is
//! OpenRouter's OpenAI-compatible chat-completions endpoint.

mod openrouter;
pub mod provider;

pub use openrouter::OpenRouterProvider;
pub use provider::*;

use std::sync::Arc;
use std::time::Duration;

use crate::error::LlmError;

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: secrecy::SecretString,
    pub model: String,
    pub base_url: String,
    /// Sent as `HTTP-Referer` for OpenRouter attribution.
    pub referer: String,
    /// Sent as `X-Title`.
    pub app_title: String,
    /// Transport timeout. `None` leaves the call unbounded.
    pub timeout: Option<Duration>,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider = OpenRouterProvider::new(config)?;
    tracing::info!("Using OpenRouter (model: {})", config.model);
    Ok(Arc::new(provider))
}
