//! LLM integration for persona generation.
//!
//! Only the OpenAI Chat Completions wire format is supported; any compatible
//! endpoint can be targeted through `LLM_BASE_URL`.

mod openai_compatible;
mod provider;

pub use openai_compatible::OpenAiCompatibleProvider;
pub use provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role,
};

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::LlmError;

/// Create the LLM provider used for persona generation.
pub fn create_llm_provider(
    config: &LlmConfig,
    model: &str,
) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider = OpenAiCompatibleProvider::new(config, model)?;
    tracing::info!(base_url = %config.base_url, model, "Using OpenAI-compatible API");
    Ok(Arc::new(provider))
}
