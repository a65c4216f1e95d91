use std::time::Duration;

use crate::config::helpers::{optional_env, parse_optional_env};
use crate::error::ConfigError;

/// Tuning for the persona generate-validate-retry pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaConfig {
    /// Chat model used to write persona summaries.
    pub model: String,
    pub temperature: f32,
    /// Upper bound on generate-validate cycles per run.
    pub max_attempts: u32,
    /// Minimum confidence for a summary to be accepted.
    pub confidence_threshold: f64,
    /// Deadline for a single generation call.
    pub attempt_timeout: Duration,
    /// Base delay before re-generating after a failed validation.
    /// `Duration::ZERO` disables the pause.
    pub retry_backoff: Duration,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_attempts: 3,
            confidence_threshold: 0.7,
            attempt_timeout: Duration::from_secs(60),
            retry_backoff: Duration::from_millis(250),
        }
    }
}

impl PersonaConfig {
    pub fn resolve() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_attempts: u32 = parse_optional_env("PERSONA_MAX_ATTEMPTS", defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "PERSONA_MAX_ATTEMPTS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let confidence_threshold: f64 = parse_optional_env(
            "PERSONA_CONFIDENCE_THRESHOLD",
            defaults.confidence_threshold,
        )?;
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(ConfigError::InvalidValue {
                key: "PERSONA_CONFIDENCE_THRESHOLD".to_string(),
                message: format!("must be between 0 and 1, got {confidence_threshold}"),
            });
        }

        let temperature: f32 = parse_optional_env("PERSONA_TEMPERATURE", defaults.temperature)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue {
                key: "PERSONA_TEMPERATURE".to_string(),
                message: format!("must be between 0 and 2, got {temperature}"),
            });
        }

        let attempt_timeout_secs: u64 = parse_optional_env(
            "PERSONA_ATTEMPT_TIMEOUT_SECS",
            defaults.attempt_timeout.as_secs(),
        )?;
        if attempt_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "PERSONA_ATTEMPT_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        let retry_backoff_ms: u64 = parse_optional_env(
            "PERSONA_RETRY_BACKOFF_MS",
            defaults.retry_backoff.as_millis() as u64,
        )?;

        Ok(Self {
            model: optional_env("PERSONA_MODEL")?.unwrap_or(defaults.model),
            temperature,
            max_attempts,
            confidence_threshold,
            attempt_timeout: Duration::from_secs(attempt_timeout_secs),
            retry_backoff: Duration::from_millis(retry_backoff_ms),
        })
    }
}
