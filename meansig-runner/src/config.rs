//! Job configuration: loading and validation.
//!
//! The configuration is a small key/value document with three required keys:
//!
//! ```yaml
//! seed: 42
//! window: 5
//! version: "v1"
//! ```
//!
//! YAML is the default format; files ending in `.toml` are read as TOML.
//! Unknown keys are ignored.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration document: {0}")]
    Malformed(String),

    #[error("missing required configuration key: {0}")]
    MissingKey(&'static str),

    #[error("window must be a positive integer (got {0})")]
    InvalidWindow(i64),

    #[error("version must be a non-empty string")]
    EmptyVersion,
}

/// Validated job configuration. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Recorded for reproducibility bookkeeping; the computation never reads it.
    pub seed: i64,

    /// Rolling-mean window in rows. Always >= 1.
    pub window: usize,

    /// Free-form version label echoed into the metrics document.
    pub version: String,
}

/// Document formats accepted by [`load_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// `.toml` → TOML, anything else → YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Keys as they appear in the document, before presence and range checks.
#[derive(Debug, Deserialize)]
struct RawConfig {
    seed: Option<i64>,
    window: Option<i64>,
    version: Option<String>,
}

impl RawConfig {
    fn validate(self) -> Result<SignalConfig, ConfigError> {
        let seed = self.seed.ok_or(ConfigError::MissingKey("seed"))?;
        let raw_window = self.window.ok_or(ConfigError::MissingKey("window"))?;
        let version = self.version.ok_or(ConfigError::MissingKey("version"))?;

        let window = usize::try_from(raw_window)
            .ok()
            .filter(|w| *w >= 1)
            .ok_or(ConfigError::InvalidWindow(raw_window))?;

        if version.trim().is_empty() {
            return Err(ConfigError::EmptyVersion);
        }

        Ok(SignalConfig {
            seed,
            window,
            version,
        })
    }
}

impl SignalConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_yaml::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        raw.validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(text).map_err(|e| ConfigError::Malformed(e.message().to_string()))?;
        raw.validate()
    }

    pub fn parse(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Yaml => Self::from_yaml_str(text),
            ConfigFormat::Toml => Self::from_toml_str(text),
        }
    }
}

/// Read and validate the configuration at `path`.
pub fn load_config(path: &Path) -> Result<SignalConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    SignalConfig::parse(&text, ConfigFormat::from_path(path))
}
