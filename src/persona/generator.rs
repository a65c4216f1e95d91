//! Persona summary generation through the chat-completion provider.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::persona::attributes::VisitorAttributes;

const SYSTEM_INSTRUCTION: &str = "You generate evaluatable visitor persona summaries.";

const PROMPT_PREAMBLE: &str = "\
You are an academic visitor profiling assistant.

Generate a concise but informative visitor persona summary (1-2 paragraphs)
based ONLY on the following attributes.

Rules:
- Academic neutral tone
- No recommendations
- No storytelling
- Identify visitor type and behavior
";

/// Produces a free-text persona summary for a set of attributes.
#[async_trait]
pub trait PersonaGenerator: Send + Sync {
    async fn generate(&self, attrs: &VisitorAttributes) -> Result<String, GenerationError>;
}

/// Generator backed by an [`LlmProvider`].
pub struct LlmPersonaGenerator {
    provider: Arc<dyn LlmProvider>,
    temperature: f32,
}

impl LlmPersonaGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, temperature: f32) -> Self {
        Self {
            provider,
            temperature,
        }
    }
}

#[async_trait]
impl PersonaGenerator for LlmPersonaGenerator {
    async fn generate(&self, attrs: &VisitorAttributes) -> Result<String, GenerationError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(SYSTEM_INSTRUCTION),
            ChatMessage::user(build_prompt(attrs)),
        ])
        .with_temperature(self.temperature);

        let response = self.provider.complete(request).await?;
        tracing::debug!(
            model = self.provider.model_name(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = ?response.finish_reason,
            "Persona summary generated"
        );

        if response.content.trim().is_empty() {
            return Err(GenerationError::EmptyResponse {
                model: self.provider.model_name().to_string(),
            });
        }
        Ok(response.content)
    }
}

/// Render the user prompt. Field order is fixed.
pub fn build_prompt(attrs: &VisitorAttributes) -> String {
    let time_budget = attrs
        .time_budget
        .map(|m| format!("{m} minutes"))
        .unwrap_or_else(|| "Not specified".to_string());
    let fields = [
        ("Age Group", attrs.age_group.clone()),
        ("Time Budget", time_budget),
        ("Visit Purpose", attrs.visit_purpose.to_string()),
        ("Language Level", attrs.language_level.to_string()),
        ("Architecture Interest", attrs.interest_architecture.as_str().to_string()),
        ("History Interest", attrs.interest_history.as_str().to_string()),
        ("Spirituality Interest", attrs.interest_spirituality.as_str().to_string()),
        ("Art Interest", attrs.interest_art.as_str().to_string()),
        (
            "Visited Before",
            if attrs.visited_before { "Yes" } else { "No" }.to_string(),
        ),
        ("Explanation Preference", attrs.explanation_type.to_string()),
        ("Timeline Direction", attrs.timeline_direction.to_string()),
        (
            "Buddhist History Knowledge",
            attrs.buddhist_history_knowledge.as_str().to_string(),
        ),
    ];

    let mut prompt = String::from(PROMPT_PREAMBLE);
    prompt.push_str("\nVisitor Data:\n");
    for (label, value) in fields {
        let _ = writeln!(prompt, "{label}: {value}");
    }
    prompt
}
