//! Typed application configuration.
//!
//! Configuration is a plain data structure loaded from a JSON file, with
//! an optional credentials overlay merged recursively over the base (a
//! missing overlay file is not an error). Everything the framework itself
//! consumes is typed; component-specific settings go into the free-form
//! [`AppConfig::custom`] map and are resolved with
//! [`crate::App::config_value`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid JSON or has the wrong shape.
    #[error("cannot parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Security-related settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Optional Content-Security-Policy header value.
    pub csp: Option<String>,
}

/// Fallback target for a status code the router could not resolve.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackSpec {
    /// Controller id to instantiate.
    pub controller: String,
    /// Action to invoke with empty params.
    pub action: String,
    /// Status the fallback's response is sent with.
    pub status: u16,
}

/// Tuning for the guard middleware stack.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// HTTP methods the method whitelist accepts.
    pub methods: Vec<String>,
    /// Maximum declared payload size in bytes.
    pub max_payload_bytes: u64,
    /// Requests allowed per rate-limit window, per client.
    pub rate_limit: u32,
    /// Rate-limit window in seconds.
    pub rate_window_secs: u64,
    /// Requests allowed per burst window, per client.
    pub burst_limit: u32,
    /// Burst window in seconds.
    pub burst_window_secs: u64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            methods: vec!["GET".to_string(), "POST".to_string()],
            max_payload_bytes: 1_000_000,
            rate_limit: 30,
            rate_window_secs: 60,
            burst_limit: 10,
            burst_window_secs: 2,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global on/off switch; off means the null logger.
    pub enabled: bool,
    /// Enabled level names, e.g. `["error", "warning", "info"]`.
    pub mask: Vec<String>,
    /// Output target: "stderr" or "file".
    pub target: String,
    /// Log file path when the target is "file".
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mask: vec![
                "error".to_string(),
                "warning".to_string(),
                "info".to_string(),
            ],
            target: "stderr".to_string(),
            file: None,
        }
    }
}

/// Merged application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Runtime environment: "dev", "staging", "prod".
    pub env: String,
    /// Absolute base URL, used for absolute link generation.
    pub base_url: String,
    /// Path prefix stripped before route matching.
    pub base_path: String,
    /// Directory the view renderer loads templates from, if any.
    pub templates: Option<PathBuf>,
    /// Security header settings.
    pub security: SecurityConfig,
    /// Fallback routes per status code (primarily 404).
    pub fallbacks: BTreeMap<u16, FallbackSpec>,
    /// Guard middleware tuning.
    pub guards: GuardConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Free-form component settings.
    pub custom: Value,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: "prod".to_string(),
            base_url: String::new(),
            base_path: String::new(),
            templates: None,
            security: SecurityConfig::default(),
            fallbacks: BTreeMap::new(),
            guards: GuardConfig::default(),
            logging: LoggingConfig::default(),
            custom: Value::Null,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let value = read_value(path.as_ref())?;
        Self::from_value(value, path.as_ref())
    }

    /// Loads configuration and merges an optional overlay over it.
    ///
    /// The overlay (typically credentials) wins on conflicts; objects are
    /// merged recursively, everything else is replaced. A missing overlay
    /// file is ignored.
    pub fn load_with_overlay(
        path: impl AsRef<Path>,
        overlay: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let mut base = read_value(path.as_ref())?;
        if overlay.as_ref().is_file() {
            let overlay_value = read_value(overlay.as_ref())?;
            merge(&mut base, overlay_value);
        }
        Self::from_value(base, path.as_ref())
    }

    fn from_value(value: Value, path: &Path) -> Result<Self, ConfigError> {
        serde_json::from_value(value).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolves a dotted key inside the free-form `custom` map.
    pub fn custom_value(&self, key: &str) -> Option<&Value> {
        let mut current = &self.custom;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }
}

fn read_value(path: &Path) -> Result<Value, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Recursively merges `overlay` into `base`. Objects merge key by key;
/// any other value in the overlay replaces the base value.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base_slot, overlay_value) => *base_slot = overlay_value,
    }
}
