//! Runtime configuration: optional TOML file, then `LIT_*` environment
//! overrides.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::recommendation_service::RecommendationConfig;
use crate::retry::RetryPolicy;

pub const ENV_DB_URL: &str = "LIT_DB_URL";
pub const ENV_AI_API_KEY: &str = "LIT_AI_API_KEY";
pub const ENV_AI_BASE_URL: &str = "LIT_AI_BASE_URL";
pub const ENV_AI_MODEL: &str = "LIT_AI_MODEL";
pub const ENV_CACHE_PATH: &str = "LIT_CACHE_PATH";
pub const ENV_PROGRESS_RETRIES: &str = "LIT_PROGRESS_RETRIES";

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o".into(),
        }
    }
}

// Keeps the key out of logs.
impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LitConfig {
    pub database_url: String,
    /// Local reader cache file. `None` keeps the cache in memory.
    pub cache_path: Option<PathBuf>,
    pub progress_retries: u32,
    pub retry_delay_ms: u64,
    pub ai: AiConfig,
}

impl Default for LitConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:lit.sqlite3".into(),
            cache_path: None,
            progress_retries: 2,
            retry_delay_ms: 200,
            ai: AiConfig::default(),
        }
    }
}

impl LitConfig {
    /// Load the file at `path` (defaults when `None`), then apply the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed, or an
    /// override does not validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Read` or `ConfigError::Parse`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// # Errors
    ///
    /// Returns the TOML error for malformed input.
    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Override fields from `LIT_*` variables looked up through `lookup`.
    /// Blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a non-numeric retry count.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_DB_URL) {
            self.database_url = url;
        }
        if let Some(key) = get(ENV_AI_API_KEY) {
            self.ai.api_key = Some(key);
        }
        if let Some(base) = get(ENV_AI_BASE_URL) {
            self.ai.base_url = base;
        }
        if let Some(model) = get(ENV_AI_MODEL) {
            self.ai.model = model;
        }
        if let Some(path) = get(ENV_CACHE_PATH) {
            self.cache_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = get(ENV_PROGRESS_RETRIES) {
            self.progress_retries =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        name: ENV_PROGRESS_RETRIES,
                        value: raw.clone(),
                    })?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the recommendation base URL is not an
    /// http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.ai.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                name: "ai.base_url",
                value: self.ai.base_url.clone(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.progress_retries,
            Duration::from_millis(self.retry_delay_ms),
        )
    }

    /// Recommendation client settings; `None` without an API key.
    #[must_use]
    pub fn recommendation(&self) -> Option<RecommendationConfig> {
        let api_key = self.ai.api_key.as_ref().filter(|k| !k.trim().is_empty())?;
        Some(RecommendationConfig {
            base_url: self.ai.base_url.clone(),
            api_key: api_key.clone(),
            model: self.ai.model.clone(),
        })
    }
}
