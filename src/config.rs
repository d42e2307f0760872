//! Runtime configuration
//!
//! Read once from the environment at startup.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::auth::{AuthError, FirebaseIdentityVerifier, IdentityVerifier, StaticIdentityVerifier};

pub const DATABASE_PATH_VAR: &str = "NUTRITRACK_DATABASE_PATH";
pub const ENVIRONMENT_VAR: &str = "NUTRITRACK_ENVIRONMENT";
pub const API_KEY_VAR: &str = "FIREBASE_API_KEY";
pub const IDENTITY_ENDPOINT_VAR: &str = "NUTRITRACK_IDENTITY_ENDPOINT";
pub const DEV_TOKENS_VAR: &str = "NUTRITRACK_DEV_TOKENS";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No identity provider configured: set FIREBASE_API_KEY (or NUTRITRACK_DEV_TOKENS outside production)")]
    NoIdentityProvider,

    #[error("Identity provider setup failed: {0}")]
    IdentityProvider(#[from] AuthError),
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub environment: Environment,
    pub api_key: Option<String>,
    pub identity_endpoint: Option<String>,
    pub dev_tokens: Option<String>,
}

/// `<project>/data/nutritrack.db`, resolved from the executable location
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path.push("data");
    path.push("nutritrack.db");
    path
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            database_path: get(DATABASE_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_database_path),
            environment: get(ENVIRONMENT_VAR)
                .map(|e| Environment::parse(&e))
                .unwrap_or(Environment::Development),
            api_key: get(API_KEY_VAR),
            identity_endpoint: get(IDENTITY_ENDPOINT_VAR),
            dev_tokens: get(DEV_TOKENS_VAR),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Pick the identity verifier.
    ///
    /// The provider API key wins. Static development tokens are honoured only
    /// outside production.
    pub fn identity_verifier(&self) -> Result<Arc<dyn IdentityVerifier>, ConfigError> {
        if let Some(ref api_key) = self.api_key {
            let verifier = FirebaseIdentityVerifier::new(api_key.clone(), self.identity_endpoint.clone())?;
            tracing::info!("Using Firebase identity verification");
            return Ok(Arc::new(verifier));
        }

        match self.dev_tokens {
            Some(ref tokens) if !self.is_production() => {
                let verifier = StaticIdentityVerifier::parse(tokens);
                tracing::warn!(tokens = verifier.len(), "Using static development tokens");
                Ok(Arc::new(verifier))
            }
            Some(_) => {
                tracing::warn!("Ignoring {} in production", DEV_TOKENS_VAR);
                Err(ConfigError::NoIdentityProvider)
            }
            None => Err(ConfigError::NoIdentityProvider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert!(cfg.database_path.ends_with("data/nutritrack.db"));
        assert_eq!(cfg.environment, Environment::Development);
        assert_eq!(cfg.api_key, None);
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            (DATABASE_PATH_VAR, "/tmp/nt.db"),
            (ENVIRONMENT_VAR, "Production"),
            (API_KEY_VAR, "key"),
            (IDENTITY_ENDPOINT_VAR, "   "),
        ]);
        assert_eq!(cfg.database_path, PathBuf::from("/tmp/nt.db"));
        assert!(cfg.is_production());
        assert_eq!(cfg.api_key.as_deref(), Some("key"));
        assert_eq!(cfg.identity_endpoint, None);
    }

    #[tokio::test]
    async fn test_dev_tokens_outside_production() {
        let cfg = config(&[(DEV_TOKENS_VAR, "tok-1:uid-1")]);
        let verifier = cfg.identity_verifier().unwrap();
        assert_eq!(verifier.verify("tok-1").await.unwrap(), "uid-1");
    }

    #[test]
    fn test_dev_tokens_ignored_in_production() {
        let cfg = config(&[(DEV_TOKENS_VAR, "tok-1:uid-1"), (ENVIRONMENT_VAR, "production")]);
        assert!(matches!(cfg.identity_verifier(), Err(ConfigError::NoIdentityProvider)));
    }

    #[test]
    fn test_no_provider() {
        assert!(matches!(config(&[]).identity_verifier(), Err(ConfigError::NoIdentityProvider)));
    }

    #[test]
    fn test_api_key_selects_firebase() {
        let cfg = config(&[(API_KEY_VAR, "key"), (DEV_TOKENS_VAR, "tok-1:uid-1")]);
        assert!(cfg.identity_verifier().is_ok());
    }
}
