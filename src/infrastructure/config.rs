//! Axiom connection settings.
//!
//! Loaded from the process environment by default:
//! - `AXIOM_TOKEN` (required): ingest token
//! - `AXIOM_DATASET` (optional, default `local`): target dataset
//! - `AXIOM_URL` (optional, default `https://api.axiom.co`): API base URL

use crate::error::ConfigError;
use std::fmt;
use std::time::Duration;

/// Environment variable holding the ingest token.
pub const TOKEN_VAR: &str = "AXIOM_TOKEN";
/// Environment variable holding the dataset name.
pub const DATASET_VAR: &str = "AXIOM_DATASET";
/// Environment variable overriding the API base URL.
pub const URL_VAR: &str = "AXIOM_URL";

/// Dataset used when `AXIOM_DATASET` is unset.
pub const DEFAULT_DATASET: &str = "local";
/// API base URL used when `AXIOM_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://api.axiom.co";
/// Request timeout for a single ingest call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the Axiom ingest API.
#[derive(Clone, PartialEq, Eq)]
pub struct AxiomConfig {
    /// Ingest token, sent as a bearer token
    pub token: String,
    /// Target dataset
    pub dataset: String,
    /// API base URL without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl AxiomConfig {
    /// Create a configuration with the default base URL and timeout.
    pub fn new(token: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            dataset: dataset.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load from the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingToken` if `AXIOM_TOKEN` is unset or blank,
    /// and `ConfigError::InvalidValue` if `AXIOM_URL` is not an http(s) URL or
    /// `AXIOM_DATASET` is not a valid dataset name.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    ///
    /// # Examples
    ///
    /// ```
    /// use workflow_logger::AxiomConfig;
    ///
    /// let config = AxiomConfig::from_lookup(|name| match name {
    ///     "AXIOM_TOKEN" => Some("xaat-123".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.dataset, "local");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let token = non_blank(TOKEN_VAR).ok_or(ConfigError::MissingToken(TOKEN_VAR))?;
        let dataset = non_blank(DATASET_VAR).unwrap_or_else(|| DEFAULT_DATASET.to_string());

        let mut config = Self::new(token, dataset);
        config.validate()?;
        if let Some(url) = non_blank(URL_VAR) {
            config = config.with_base_url(url)?;
        }
        Ok(config)
    }

    /// Check that the dataset name is safe to place in the ingest URL path.
    ///
    /// Dataset names are ASCII letters, digits, `-`, `_` and `.`.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` naming `AXIOM_DATASET` otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid = !self.dataset.is_empty()
            && self.dataset != "."
            && self.dataset != ".."
            && self
                .dataset
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidValue {
                name: DATASET_VAR,
                value: self.dataset.clone(),
            })
        }
    }

    /// Override the API base URL.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if the URL is not http(s).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                name: URL_VAR,
                value: url,
            });
        }
        self.base_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint that receives ingest batches for the dataset.
    pub fn ingest_url(&self) -> String {
        format!("{}/v1/datasets/{}/ingest", self.base_url, self.dataset)
    }
}

impl fmt::Debug for AxiomConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxiomConfig")
            .field("token", &"***")
            .field("dataset", &self.dataset)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
