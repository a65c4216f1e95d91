use std::net::SocketAddr;

use crate::config::helpers::{optional_env, parse_optional_env};
use crate::error::ConfigError;

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally reachable base URL, used when logging QR/feedback links.
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_base_url: "http://localhost:3000".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn resolve() -> Result<Self, ConfigError> {
        let host = optional_env("HERITXR_HOST")?.unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_optional_env("PORT", 3000)?;
        let public_base_url = optional_env("PUBLIC_BASE_URL")?
            .unwrap_or_else(|| format!("http://localhost:{port}"));

        Ok(Self {
            host,
            port,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                key: "HERITXR_HOST".to_string(),
                message: format!("cannot bind '{}:{}': {e}", self.host, self.port),
            })
    }

    /// Public URL for a path under the service.
    pub fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path.trim_start_matches('/'))
    }
}
