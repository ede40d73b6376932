//! Generation client — sends the synthesized request to the LLM.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, FinishReason, LlmProvider};

/// Fixed sampling settings for website generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4000,
        }
    }
}

/// Single-attempt adapter between the wizard and an `LlmProvider`.
pub struct GenerationClient {
    llm: Arc<dyn LlmProvider>,
    settings: GenerationSettings,
}

impl GenerationClient {
    pub fn new(llm: Arc<dyn LlmProvider>, settings: GenerationSettings) -> Self {
        Self { llm, settings }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Generate the website document for `prompt`.
    ///
    /// One request, no retry. An empty completion counts as a failure.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = CompletionRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);

        info!(
            model = self.llm.model_name(),
            prompt_chars = prompt.len(),
            "Requesting website generation"
        );
        let response = self.llm.complete(request).await?;

        if response.content.trim().is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.llm.model_name().to_string(),
                reason: "Empty completion".to_string(),
            });
        }
        if response.finish_reason == FinishReason::Length {
            warn!(
                max_tokens = self.settings.max_tokens,
                "Generation hit the token limit; document may be truncated"
            );
        }
        Ok(response.content)
    }
}
