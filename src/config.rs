//! Configuration for evalview.
//!
//! Supports YAML configuration with precedence: CLI > ENV > file > defaults.

use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::api::search::{ResultWindow, DEFAULT_MAX_RESULT_WINDOW};
use crate::error::{Error, Result};

/// Environment variable overriding [`ApiConfig::base_url`].
pub const ENV_API_URL: &str = "EVALVIEW_API_URL";
/// Environment variable overriding [`ApiConfig::proxy_url`].
pub const ENV_PROXY_URL: &str = "EVALVIEW_PROXY_URL";

/// REST API access settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the JSON REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Same-origin proxy used for file downloads (`<proxy>?url=<file>`).
    #[serde(default)]
    pub proxy_url: Option<String>,

    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Read timeout in milliseconds.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Largest response body accepted, in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

fn default_base_url() -> String {
    "https://www.openml.org/api/v1/json".to_string()
}
fn default_connect_timeout_ms() -> u64 {
    10_000
}
fn default_read_timeout_ms() -> u64 {
    30_000
}
fn default_max_response_bytes() -> usize {
    256 * 1024 * 1024
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            proxy_url: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

/// Entity-name cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached names.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

fn default_cache_capacity() -> usize {
    512
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: default_cache_capacity() }
    }
}

/// Terminal and image rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Emit ANSI 24-bit color codes.
    #[serde(default = "default_ansi")]
    pub ansi: bool,

    /// Minimum width of a terminal matrix cell, in characters.
    #[serde(default = "default_cell_width")]
    pub cell_width: usize,

    /// Edge length of a heatmap cell in PNG output, in pixels.
    #[serde(default = "default_cell_pixels")]
    pub cell_pixels: u32,
}

fn default_ansi() -> bool {
    true
}
fn default_cell_width() -> usize {
    6
}
fn default_cell_pixels() -> u32 {
    48
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ansi: default_ansi(),
            cell_width: default_cell_width(),
            cell_pixels: default_cell_pixels(),
        }
    }
}

/// Search index settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// The index's `max_result_window`.
    #[serde(default = "default_max_result_window")]
    pub max_result_window: u64,
}

fn default_max_result_window() -> u64 {
    DEFAULT_MAX_RESULT_WINDOW
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_result_window: default_max_result_window() }
    }
}

impl SearchConfig {
    /// Paging limits for the configured index.
    #[must_use]
    pub const fn result_window(&self) -> ResultWindow {
        ResultWindow::new(self.max_result_window)
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// REST API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Name cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Rendering settings.
    #[serde(default)]
    pub render: RenderConfig,

    /// Search index settings.
    #[serde(default)]
    pub search: SearchConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            render: RenderConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location (`<config_dir>/evalview/config.yaml`).
    #[cfg(feature = "cli")]
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("evalview").join("config.yaml"))
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            Error::ConfigParse { line, message: e.to_string() }
        })
    }

    /// Loads configuration with fallback to defaults.
    ///
    /// A missing file is silent; a malformed one is logged and ignored.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(Error::ConfigNotFound(_)) => Self::default(),
            Err(err) => {
                tracing::warn!(%err, "ignoring invalid configuration");
                Self::default()
            }
        }
    }

    /// Applies overrides from the process environment.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api.base_url = url;
        }
        if let Some(proxy) = lookup(ENV_PROXY_URL) {
            self.api.proxy_url = (!proxy.is_empty()).then_some(proxy);
        }
        self
    }
}
