use std::time::Duration;

use crate::config::helpers::parse_optional_env;
use crate::error::ConfigError;

/// Lifetimes of the short-lived QR and feedback tokens.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub temp_visitor_ttl: Duration,
    pub feedback_ttl: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            temp_visitor_ttl: Duration::from_secs(30 * 60),
            feedback_ttl: Duration::from_secs(15 * 60),
        }
    }
}

impl TokenConfig {
    pub fn resolve() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let temp_secs: u64 =
            parse_optional_env("TEMP_VISITOR_TTL_SECS", defaults.temp_visitor_ttl.as_secs())?;
        let feedback_secs: u64 =
            parse_optional_env("FEEDBACK_TOKEN_TTL_SECS", defaults.feedback_ttl.as_secs())?;

        Ok(Self {
            temp_visitor_ttl: Duration::from_secs(temp_secs),
            feedback_ttl: Duration::from_secs(feedback_secs),
        })
    }
}
