use std::time::Duration;

use secrecy::SecretString;

use crate::config::helpers::{optional_env, parse_optional_env};
use crate::error::ConfigError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for the OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: SecretString,
    /// Transport-level timeout for a single HTTP request.
    pub request_timeout: Duration,
}

impl LlmConfig {
    pub fn resolve() -> Result<Self, ConfigError> {
        let base_url =
            optional_env("LLM_BASE_URL")?.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url).map_err(|e| ConfigError::InvalidValue {
            key: "LLM_BASE_URL".to_string(),
            message: format!("not a valid URL: {e}"),
        })?;

        let api_key = optional_env("OPENAI_API_KEY")?
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingRequired {
                key: "OPENAI_API_KEY".to_string(),
                hint: "Set OPENAI_API_KEY in the environment or in .env".to_string(),
            })?;

        let timeout_secs: u64 = parse_optional_env("LLM_REQUEST_TIMEOUT_SECS", 120)?;

        Ok(Self {
            base_url,
            api_key,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
