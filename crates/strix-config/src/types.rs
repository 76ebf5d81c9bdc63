//! `Config::from_env`: a single pass over the environment (§10.3), in
//! place of the teacher's 9-step layered TOML merge — Strix's
//! configuration surface is flat and entirely env-var driven (§6
//! **Environment**), so there is no file layering left to do.

use std::collections::HashMap;
use std::time::Duration;

use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::secret::Secret;

/// Default `LLM_TIMEOUT`, in seconds (§6).
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 300;
/// Default `STRIX_SANDBOX_EXECUTION_TIMEOUT`, in seconds (§6).
pub const DEFAULT_SANDBOX_EXECUTION_TIMEOUT_SECS: u64 = 500;
/// Default `STRIX_IMAGE`.
pub const DEFAULT_SANDBOX_IMAGE: &str = "strixsec/strix-sandbox:latest";

/// Resolved configuration for one CLI invocation, validated at load time.
#[derive(Clone)]
pub struct Config {
    /// `STRIX_LLM`: the model identifier the LLM Gateway targets.
    pub llm_model: String,
    /// `LLM_API_KEY`.
    pub llm_api_key: Secret,
    /// `LLM_API_BASE`, if the provider isn't reached at its default
    /// endpoint.
    pub llm_api_base: Option<String>,
    /// `LLM_TIMEOUT`, defaulting to [`DEFAULT_LLM_TIMEOUT_SECS`].
    pub llm_timeout: Duration,
    /// `LLM_RATE_LIMIT_DELAY`, the inter-request pacing the gateway
    /// applies.
    pub llm_rate_limit_delay: Option<Duration>,
    /// `LLM_RATE_LIMIT_CONCURRENT`, the gateway's concurrency semaphore
    /// size.
    pub llm_rate_limit_concurrent: Option<usize>,
    /// `PERPLEXITY_API_KEY`, for prompt modules that use web search.
    pub perplexity_api_key: Option<Secret>,
    /// `STRIX_DISABLE_BROWSER`.
    pub disable_browser: bool,
    /// `STRIX_IMAGE`, defaulting to [`DEFAULT_SANDBOX_IMAGE`].
    pub sandbox_image: String,
    /// `STRIX_SANDBOX_EXECUTION_TIMEOUT`, defaulting to
    /// [`DEFAULT_SANDBOX_EXECUTION_TIMEOUT_SECS`].
    pub sandbox_execution_timeout: Duration,
    /// `DOCKER_HOST`, if Docker isn't reached at its platform default.
    pub docker_host: Option<String>,
}

impl Config {
    /// Resolve configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a
    /// numeric variable fails to parse.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_map(&collect_env_vars())
    }

    /// Resolve configuration from an explicit variable map, so the
    /// resolution logic is testable without mutating the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a
    /// numeric variable fails to parse.
    pub fn from_map(vars: &HashMap<String, String>) -> ConfigResult<Self> {
        let llm_model = required(vars, "STRIX_LLM")?;
        let llm_api_key = Secret::new(required(vars, "LLM_API_KEY")?);

        let llm_timeout = duration_secs(vars, "LLM_TIMEOUT", DEFAULT_LLM_TIMEOUT_SECS)?;
        let sandbox_execution_timeout = duration_secs(
            vars,
            "STRIX_SANDBOX_EXECUTION_TIMEOUT",
            DEFAULT_SANDBOX_EXECUTION_TIMEOUT_SECS,
        )?;

        let llm_rate_limit_delay = optional_number::<u64>(vars, "LLM_RATE_LIMIT_DELAY")?.map(Duration::from_secs);
        let llm_rate_limit_concurrent = optional_number::<usize>(vars, "LLM_RATE_LIMIT_CONCURRENT")?;

        let config = Self {
            llm_model,
            llm_api_key,
            llm_api_base: vars.get("LLM_API_BASE").cloned(),
            llm_timeout,
            llm_rate_limit_delay,
            llm_rate_limit_concurrent,
            perplexity_api_key: vars.get("PERPLEXITY_API_KEY").cloned().map(Secret::new),
            disable_browser: optional_bool(vars, "STRIX_DISABLE_BROWSER")?.unwrap_or(false),
            sandbox_image: vars
                .get("STRIX_IMAGE")
                .cloned()
                .unwrap_or_else(|| DEFAULT_SANDBOX_IMAGE.to_string()),
            sandbox_execution_timeout,
            docker_host: vars.get("DOCKER_HOST").cloned(),
        };

        info!(
            llm_model = %config.llm_model,
            llm_timeout_secs = config.llm_timeout.as_secs(),
            sandbox_image = %config.sandbox_image,
            "resolved configuration"
        );

        Ok(config)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("llm_model", &self.llm_model)
            .field("llm_api_key", &self.llm_api_key)
            .field("llm_api_base", &self.llm_api_base)
            .field("llm_timeout", &self.llm_timeout)
            .field("llm_rate_limit_delay", &self.llm_rate_limit_delay)
            .field("llm_rate_limit_concurrent", &self.llm_rate_limit_concurrent)
            .field("perplexity_api_key", &self.perplexity_api_key)
            .field("disable_browser", &self.disable_browser)
            .field("sandbox_image", &self.sandbox_image)
            .field("sandbox_execution_timeout", &self.sandbox_execution_timeout)
            .field("docker_host", &self.docker_host)
            .finish()
    }
}

/// Snapshot the process environment into a plain map, the way the
/// teacher's loader collects once up front rather than querying
/// `std::env` at every field.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

fn required(vars: &HashMap<String, String>, key: &'static str) -> ConfigResult<String> {
    vars.get(key).cloned().ok_or(ConfigError::MissingRequired(key))
}

fn optional_number<T: std::str::FromStr>(vars: &HashMap<String, String>, key: &'static str) -> ConfigResult<Option<T>> {
    match vars.get(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber {
                var: key,
                value: raw.clone(),
            }),
    }
}

fn duration_secs(vars: &HashMap<String, String>, key: &'static str, default_secs: u64) -> ConfigResult<Duration> {
    Ok(Duration::from_secs(optional_number(vars, key)?.unwrap_or(default_secs)))
}

fn optional_bool(vars: &HashMap<String, String>, key: &'static str) -> ConfigResult<Option<bool>> {
    match vars.get(key) {
        None => Ok(None),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" => Ok(Some(true)),
            "0" | "false" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidBool {
                var: key,
                value: raw.clone(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn missing_required_var_is_an_error() {
        let err = Config::from_map(&map(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingRequired("STRIX_LLM"));
    }

    #[test]
    fn minimal_env_resolves_with_defaults() {
        let config = Config::from_map(&map(&[("STRIX_LLM", "claude-sonnet"), ("LLM_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.llm_model, "claude-sonnet");
        assert_eq!(config.llm_timeout, Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS));
        assert_eq!(config.sandbox_image, DEFAULT_SANDBOX_IMAGE);
        assert!(!config.disable_browser);
        assert!(config.llm_api_base.is_none());
    }

    #[test]
    fn malformed_timeout_is_a_typed_error() {
        let err = Config::from_map(&map(&[
            ("STRIX_LLM", "claude-sonnet"),
            ("LLM_API_KEY", "sk-test"),
            ("LLM_TIMEOUT", "not-a-number"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                var: "LLM_TIMEOUT",
                value: "not-a-number".to_string(),
            }
        );
    }

    #[test]
    fn overrides_take_effect() {
        let config = Config::from_map(&map(&[
            ("STRIX_LLM", "claude-sonnet"),
            ("LLM_API_KEY", "sk-test"),
            ("STRIX_DISABLE_BROWSER", "true"),
            ("STRIX_SANDBOX_EXECUTION_TIMEOUT", "60"),
            ("LLM_RATE_LIMIT_CONCURRENT", "4"),
        ]))
        .unwrap();
        assert!(config.disable_browser);
        assert_eq!(config.sandbox_execution_timeout, Duration::from_secs(60));
        assert_eq!(config.llm_rate_limit_concurrent, Some(4));
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = Config::from_map(&map(&[
            ("STRIX_LLM", "claude-sonnet"),
            ("LLM_API_KEY", "sk-should-not-appear"),
        ]))
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-should-not-appear"));
    }
}
