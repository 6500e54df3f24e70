//! Secure credential handling for LLM providers.
//!
//! Credentials are wrapped in [`ApiCredential`] as soon as they are loaded:
//!
//! - **No accidental logging**: Credentials cannot appear in Debug/Display output
//! - **Memory safety**: Credentials are zeroed on drop
//! - **Explicit exposure**: the raw value is only reachable through `.expose()`
//!
//! ## Usage
//!
//! ```ignore
//! use crate::providers::secrets::ApiCredential;
//!
//! // Config first, then each environment variable in order
//! let cred = ApiCredential::from_config_or_env(
//!     &config,
//!     "api_key",
//!     &["LLM_API_KEY", "OPENAI_API_KEY"],
//!     "LLM API key",
//! )?;
//!
//! // Use in HTTP header (explicit exposure)
//! request.bearer_auth(cred.expose());
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

use super::ProviderError;

/// Where a credential was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from configuration file/JSON
    Config,
    /// Loaded from environment variable
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Config => write!(f, "config"),
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A securely-stored API credential.
///
/// Debug and Display show `[REDACTED]`; the value itself is only available
/// via [`ApiCredential::expose`].
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Create a new credential from a string value.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load credential from JSON config, falling back to environment variables.
    ///
    /// 1. `config[config_key]`, if it is a non-empty string
    /// 2. the first of `env_vars` that is set and non-empty
    /// 3. otherwise `ProviderError::NotConfigured`
    pub fn from_config_or_env(
        config: &JsonValue,
        config_key: &str,
        env_vars: &[&str],
        name: &'static str,
    ) -> Result<Self, ProviderError> {
        if let Some(value) = config[config_key].as_str().filter(|v| !v.is_empty()) {
            return Ok(Self::new(value, CredentialSource::Config, name));
        }

        for env_var in env_vars {
            if let Some(value) = read_env(env_var) {
                return Ok(Self::new(value, CredentialSource::Environment, name));
            }
        }

        Err(ProviderError::NotConfigured(format!(
            "{} required: set '{}' in config or one of {} environment variables",
            name,
            config_key,
            env_vars.join(", ")
        )))
    }

    /// Check if a credential is available (without loading it).
    pub fn is_available(config: &JsonValue, config_key: &str, env_vars: &[&str]) -> bool {
        config[config_key].as_str().is_some_and(|v| !v.is_empty())
            || env_vars.iter().any(|var| read_env(var).is_some())
    }

    /// Expose the credential value for use in API calls.
    ///
    /// Only call this where the value is actually sent; never store the result.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Check if the credential is empty.
    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    /// Get the source of this credential.
    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// Get the human-readable name of this credential.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

fn read_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_redacted_in_debug() {
        let secret = "sk-super-secret-key-12345";
        let cred = ApiCredential::new(secret, CredentialSource::Programmatic, "Test API key");

        let debug = format!("{:?}", cred);
        assert!(!debug.contains(secret), "Secret exposed in Debug!");
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_credential_redacted_in_display() {
        let secret = "sk-super-secret-key-12345";
        let cred = ApiCredential::new(secret, CredentialSource::Config, "Test API key");

        let display = format!("{}", cred);
        assert!(!display.contains(secret), "Secret exposed in Display!");
        assert!(display.contains("Test API key"));
        assert!(display.contains("config"));
    }

    #[test]
    fn test_credential_expose() {
        let cred = ApiCredential::new("sk-abc", CredentialSource::Programmatic, "Test API key");
        assert_eq!(cred.expose(), "sk-abc");
        assert!(!cred.is_empty());
    }

    #[test]
    fn test_from_config_prefers_config() {
        let config = serde_json::json!({ "api_key": "config-key" });

        std::env::set_var("MEDIASCORE_TEST_KEY_PRIORITY", "env-key");
        let cred = ApiCredential::from_config_or_env(
            &config,
            "api_key",
            &["MEDIASCORE_TEST_KEY_PRIORITY"],
            "Test key",
        )
        .unwrap();

        assert_eq!(cred.expose(), "config-key");
        assert_eq!(cred.source(), CredentialSource::Config);

        std::env::remove_var("MEDIASCORE_TEST_KEY_PRIORITY");
    }

    #[test]
    fn test_env_fallback_uses_first_set_variable() {
        let config = serde_json::json!({ "api_key": "" });

        std::env::set_var("MEDIASCORE_TEST_KEY_SECOND", "second");
        let cred = ApiCredential::from_config_or_env(
            &config,
            "api_key",
            &["MEDIASCORE_TEST_KEY_UNSET_1", "MEDIASCORE_TEST_KEY_SECOND"],
            "Test key",
        )
        .unwrap();

        assert_eq!(cred.expose(), "second");
        assert_eq!(cred.source(), CredentialSource::Environment);

        std::env::remove_var("MEDIASCORE_TEST_KEY_SECOND");
    }

    #[test]
    fn test_error_when_missing() {
        let result = ApiCredential::from_config_or_env(
            &serde_json::json!({}),
            "api_key",
            &["MEDIASCORE_TEST_KEY_UNSET_2"],
            "Test key",
        );

        let err = result.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
        assert!(err.to_string().contains("MEDIASCORE_TEST_KEY_UNSET_2"));
    }

    #[test]
    fn test_is_available() {
        let config = serde_json::json!({ "api_key": "value" });
        assert!(ApiCredential::is_available(&config, "api_key", &[]));
        assert!(!ApiCredential::is_available(
            &serde_json::json!({}),
            "api_key",
            &["MEDIASCORE_TEST_KEY_UNSET_3"]
        ));
    }
}
