use std::path::PathBuf;

use secrecy::SecretString;

use crate::config::helpers::optional_env;
use crate::error::ConfigError;

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the local libSQL database file (default: ./heritxr.db).
    pub libsql_path: PathBuf,
    /// Turso cloud URL for remote sync (optional).
    pub libsql_url: Option<String>,
    /// Turso auth token (required when libsql_url is set).
    pub libsql_auth_token: Option<SecretString>,
}

impl DatabaseConfig {
    pub fn resolve() -> Result<Self, ConfigError> {
        let libsql_path = optional_env("LIBSQL_PATH")?
            .map(PathBuf::from)
            .unwrap_or_else(default_libsql_path);

        let libsql_url = optional_env("LIBSQL_URL")?;
        let libsql_auth_token = optional_env("LIBSQL_AUTH_TOKEN")?.map(SecretString::from);

        if libsql_url.is_some() && libsql_auth_token.is_none() {
            return Err(ConfigError::MissingRequired {
                key: "LIBSQL_AUTH_TOKEN".to_string(),
                hint: "LIBSQL_AUTH_TOKEN is required when LIBSQL_URL is set".to_string(),
            });
        }

        Ok(Self {
            libsql_path,
            libsql_url,
            libsql_auth_token,
        })
    }
}

/// Default libSQL database path, relative to the working directory.
pub fn default_libsql_path() -> PathBuf {
    PathBuf::from("heritxr.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::helpers::ENV_LOCK;

    #[test]
    fn remote_url_without_token_is_rejected() {
        let _lock = ENV_LOCK.lock();
        unsafe {
            std::env::set_var("LIBSQL_URL", "libsql://visitors.turso.io");
            std::env::remove_var("LIBSQL_AUTH_TOKEN");
        }
        let result = DatabaseConfig::resolve();
        unsafe { std::env::remove_var("LIBSQL_URL") };
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired { ref key, .. }) if key == "LIBSQL_AUTH_TOKEN"
        ));
    }

    #[test]
    fn local_path_defaults_when_unset() {
        let _lock = ENV_LOCK.lock();
        unsafe {
            std::env::remove_var("LIBSQL_PATH");
            std::env::remove_var("LIBSQL_URL");
        }
        let config = DatabaseConfig::resolve().unwrap();
        assert_eq!(config.libsql_path, default_libsql_path());
        assert!(config.libsql_url.is_none());
    }
}
