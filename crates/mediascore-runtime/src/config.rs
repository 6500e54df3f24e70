//! Runtime configuration.
//!
//! Loaded from YAML. Durations are human-readable strings (`"1500ms"`,
//! `"3s"`). Missing fields take their defaults.
//!
//! ```yaml
//! provider:
//!   type: openai
//!   model: gpt-4o-mini
//!   base_url: https://api.openai.com/v1
//! vision:
//!   timeout: 1500ms
//!   retries: 0
//! text:
//!   timeout: 3s
//!   retries: 1
//! size_target:
//!   width: 1024
//!   height: 1024
//! evaluation_deadline: 5s
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use mediascore_core::SizeTarget;

use crate::providers::CompletionConfig;

/// Upper bound on per-step retries.
pub const MAX_RETRIES: usize = 1;

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Provider selection plus provider-specific options.
///
/// Everything besides `type` and `model` is handed to the provider factory
/// as JSON (`base_url`, `api_key`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(rename = "type")]
    pub provider_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(flatten)]
    pub options: Map<String, JsonValue>,
}

impl ProviderSettings {
    /// Default OpenAI-compatible provider settings.
    pub fn openai() -> Self {
        Self {
            provider_type: "openai".to_string(),
            model: None,
            options: Map::new(),
        }
    }

    /// Options as the JSON object passed to provider factories.
    pub fn factory_config(&self) -> JsonValue {
        JsonValue::Object(self.options.clone())
    }
}

/// Limits for one model step of the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    /// Run this step at all
    pub enabled: bool,

    #[serde(with = "duration_str")]
    pub timeout: Duration,

    /// Extra attempts after a transport failure
    pub retries: usize,
}

impl StepConfig {
    pub fn new(timeout: Duration, retries: usize) -> Self {
        Self {
            enabled: true,
            timeout,
            retries,
        }
    }

    /// Defaults for the vision step: short, no retry.
    pub fn vision() -> Self {
        Self::new(Duration::from_millis(1500), 0)
    }

    /// Defaults for the text step: longer, one retry.
    pub fn text() -> Self {
        Self::new(Duration::from_secs(3), 1)
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::vision()
        }
    }
}

impl Default for StepConfig {
    fn default() -> Self {
        Self::vision()
    }
}

/// Configuration for the scoring orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Model provider; `None` runs heuristics only
    pub provider: Option<ProviderSettings>,

    /// Maximum tokens per scoring reply
    pub max_tokens: u32,

    /// Vision step limits
    pub vision: StepConfig,

    /// Text step limits
    pub text: StepConfig,

    /// Target dimensions for size compliance
    pub size_target: SizeTarget,

    /// Bound on the whole evaluation, across all cascade steps
    #[serde(default, with = "duration_str::option")]
    pub evaluation_deadline: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            provider: None,
            max_tokens: 200,
            vision: StepConfig::vision(),
            text: StepConfig::text(),
            size_target: SizeTarget::default(),
            evaluation_deadline: None,
        }
    }
}

impl RuntimeConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from a YAML (or JSON) file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Use an explicit provider.
    pub fn with_provider(mut self, provider: ProviderSettings) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Apply `LLM_MODEL` / `LLM_BASE_URL` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply environment-style overrides from any lookup.
    ///
    /// With no provider block, a provider is enabled when an API key
    /// variable is present so that environment-only setups work.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.provider.is_none()
            && (lookup("LLM_API_KEY").is_some() || lookup("OPENAI_API_KEY").is_some())
        {
            tracing::debug!("API key found in environment, enabling openai provider");
            self.provider = Some(ProviderSettings::openai());
        }

        let Some(provider) = self.provider.as_mut() else {
            return;
        };

        if let Some(model) = lookup("LLM_MODEL") {
            provider.model = Some(model);
        }
        if let Some(base_url) = lookup("LLM_BASE_URL") {
            provider
                .options
                .insert("base_url".to_string(), JsonValue::String(base_url));
        }
    }

    /// Check limits that would make the cascade meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, step) in [("vision", &self.vision), ("text", &self.text)] {
            if step.timeout.is_zero() {
                return Err(ConfigError::Invalid(format!(
                    "{} timeout must be greater than zero",
                    name
                )));
            }
            if step.retries > MAX_RETRIES {
                return Err(ConfigError::Invalid(format!(
                    "{} retries must be at most {}, got {}",
                    name, MAX_RETRIES, step.retries
                )));
            }
        }

        if self.size_target.width == 0 || self.size_target.height == 0 {
            return Err(ConfigError::Invalid(
                "size_target width and height must be positive".to_string(),
            ));
        }

        if self.evaluation_deadline.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::Invalid(
                "evaluation_deadline must be greater than zero".to_string(),
            ));
        }

        if let Some(provider) = &self.provider {
            if provider.provider_type.trim().is_empty() {
                return Err(ConfigError::Invalid("provider type is empty".to_string()));
            }
        }

        Ok(())
    }

    /// Completion settings for the scoring client.
    pub fn completion_config(&self) -> CompletionConfig {
        let defaults = CompletionConfig::default();
        CompletionConfig {
            model: self
                .provider
                .as_ref()
                .and_then(|p| p.model.clone())
                .unwrap_or(defaults.model),
            max_tokens: self.max_tokens,
            ..defaults
        }
    }
}

/// Serde adapters for humantime duration strings.
mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| humantime::parse_duration(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
