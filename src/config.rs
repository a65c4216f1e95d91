//! Configuration for HeritXr.
//!
//! Everything is read from the environment; a `.env` file in the working
//! directory is loaded first when present.

mod database;
pub(crate) mod helpers;
mod llm;
mod persona;
mod server;
mod tokens;

pub use database::{DatabaseConfig, default_libsql_path};
pub use llm::LlmConfig;
pub use persona::PersonaConfig;
pub use server::ServerConfig;
pub use tokens::TokenConfig;

use crate::error::ConfigError;

/// Main configuration for the service.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub persona: PersonaConfig,
    pub tokens: TokenConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        Ok(Self {
            server: ServerConfig::resolve()?,
            database: DatabaseConfig::resolve()?,
            llm: LlmConfig::resolve()?,
            persona: PersonaConfig::resolve()?,
            tokens: TokenConfig::resolve()?,
        })
    }
}

/// Load `.env` if present (ignore errors if not found).
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}
