//! Application configuration management
//!
//! Settings come from three places: command-line flags, an optional TOML
//! file and built-in defaults, in that order of precedence. The API
//! credential is only ever read from the environment. Everything is
//! validated once at startup.

use crate::core::args::Invocation;
use crate::core::constants::{
    API_KEY_ENV, DEFAULT_FFUF_PATH, DEFAULT_MAX_EXTENSIONS, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE, HEADER_TIMEOUT_SECS, MAX_EXTENSIONS, MIN_EXTENSIONS, PERPLEXITY_URL,
    REQUEST_TIMEOUT_SECS, RUN_TIMEOUT_SECS,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file picked up from the working directory when none is named
pub const DEFAULT_CONFIG_FILE: &str = "ffufai.toml";

/// Environment variable naming a config file
pub const CONFIG_PATH_ENV: &str = "FFUFAI_CONFIG";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("max-extensions must be between 1 and 10, got {0}")]
    MaxExtensionsOutOfRange(u8),

    #[error("{0} timeout must be greater than zero")]
    InvalidTimeout(&'static str),

    #[error("temperature must be between 0.0 and 2.0, got {0}")]
    InvalidTemperature(f32),

    #[error("max_tokens must be greater than zero")]
    InvalidMaxTokens,

    #[error("PERPLEXITY_API_KEY environment variable not set")]
    MissingApiKey,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FfufSection {
    #[serde(default = "default_ffuf_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionsSection {
    #[serde(default = "default_max_extensions")]
    pub max_extensions: u8,
    #[serde(default = "default_model")]
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_api_url")]
    pub url: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Timeouts in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutsSection {
    #[serde(default = "default_header_timeout")]
    pub header: u64,
    #[serde(default = "default_request_timeout")]
    pub request: u64,
    #[serde(default = "default_run_timeout")]
    pub run: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_ffuf_path() -> String {
    DEFAULT_FFUF_PATH.to_string()
}

fn default_max_extensions() -> u8 {
    DEFAULT_MAX_EXTENSIONS
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_url() -> String {
    PERPLEXITY_URL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_header_timeout() -> u64 {
    HEADER_TIMEOUT_SECS
}

fn default_request_timeout() -> u64 {
    REQUEST_TIMEOUT_SECS
}

fn default_run_timeout() -> u64 {
    RUN_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FfufSection {
    fn default() -> Self {
        Self {
            path: default_ffuf_path(),
        }
    }
}

impl Default for SuggestionsSection {
    fn default() -> Self {
        Self {
            max_extensions: default_max_extensions(),
            model: default_model(),
        }
    }
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl Default for TimeoutsSection {
    fn default() -> Self {
        Self {
            header: default_header_timeout(),
            request: default_request_timeout(),
            run: default_run_timeout(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Contents of the optional TOML config file
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub ffuf: FfufSection,
    #[serde(default)]
    pub suggestions: SuggestionsSection,
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub timeouts: TimeoutsSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl FileConfig {
    /// Load a config file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML configuration {}", path.display()))
    }

    /// Load the named file, or `ffufai.toml` from the working directory if
    /// it exists, or fall back to defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        Self::discover_in(explicit, Path::new("."))
    }

    /// Like `discover`, looking for `ffufai.toml` in `dir`
    pub fn discover_in(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = dir.join(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(&fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Config file named by `--config`, else by `FFUFAI_CONFIG`
pub fn explicit_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    select_config_path(cli_path, std::env::var_os(CONFIG_PATH_ENV))
}

/// `cli_path` wins over a non-empty `env_path`
fn select_config_path(cli_path: Option<&Path>, env_path: Option<OsString>) -> Option<PathBuf> {
    cli_path
        .map(Path::to_path_buf)
        .or_else(|| env_path.filter(|p| !p.is_empty()).map(PathBuf::from))
}

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Target URL containing the fuzzing marker
    pub url: String,

    /// ffuf executable
    pub ffuf_path: String,

    /// Arguments forwarded to ffuf
    pub ffuf_args: Vec<String>,

    /// Cap on the number of suggested extensions
    pub max_extensions: usize,

    pub model: String,
    pub verbose: bool,
    pub dry_run: bool,

    /// Chat completion endpoint
    pub api_url: String,
    pub max_tokens: u32,
    pub temperature: f32,

    /// Timeouts in seconds
    pub header_timeout: u64,
    pub request_timeout: u64,
    pub run_timeout: u64,

    pub log_level: String,
}

impl Config {
    /// Merge command-line flags over the file config and validate the result
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a merged value is out of range.
    pub fn resolve(invocation: Invocation, file: FileConfig) -> Result<Self, ConfigError> {
        let Invocation {
            cli,
            url,
            ffuf_args,
        } = invocation;

        let max_extensions = cli
            .max_extensions
            .unwrap_or(file.suggestions.max_extensions);
        if !(MIN_EXTENSIONS..=MAX_EXTENSIONS).contains(&max_extensions) {
            return Err(ConfigError::MaxExtensionsOutOfRange(max_extensions));
        }

        let timeouts = file.timeouts;
        for (name, value) in [
            ("header", timeouts.header),
            ("request", timeouts.request),
            ("run", timeouts.run),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidTimeout(name));
            }
        }

        if !(0.0..=2.0).contains(&file.api.temperature) {
            return Err(ConfigError::InvalidTemperature(file.api.temperature));
        }
        if file.api.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens);
        }

        Ok(Config {
            url,
            ffuf_path: cli.ffuf_path.unwrap_or(file.ffuf.path),
            ffuf_args,
            max_extensions: usize::from(max_extensions),
            model: cli.model.unwrap_or(file.suggestions.model),
            verbose: cli.verbose,
            dry_run: cli.dry_run,
            api_url: file.api.url,
            max_tokens: file.api.max_tokens,
            temperature: file.api.temperature,
            header_timeout: timeouts.header,
            request_timeout: timeouts.request,
            run_timeout: timeouts.run,
            log_level: file.logging.log_level,
        })
    }
}

/// Validate an API key value read from the environment
pub fn read_api_key(value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(ConfigError::MissingApiKey),
    }
}

/// Read the API key from `PERPLEXITY_API_KEY`
pub fn api_key_from_env() -> Result<String, ConfigError> {
    read_api_key(std::env::var(API_KEY_ENV).ok())
}
