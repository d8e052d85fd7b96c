//! Optional TOML configuration.
//!
//! Looked up from `--config`, then the `DATA_TOOLS_CONFIG` environment
//! variable. Without either, built-in defaults apply.
//!
//! ```toml
//! [display]
//! max_chars = 20000
//!
//! [openapi]
//! schema = "schemas/custom-openapi.json"
//! ```

use std::path::{Path, PathBuf};

use data_tools_cli_utils::render::DEFAULT_DISPLAY_LIMIT;
use serde::Deserialize;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "DATA_TOOLS_CONFIG";

/// Errors that can occur while loading the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`Config`].
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// The underlying TOML error.
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Terminal output settings.
    pub display: DisplayConfig,
    /// OpenAPI validator settings.
    pub openapi: OpenApiConfig,
}

/// Terminal output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Maximum characters of JSON shown in previews.
    pub max_chars: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_DISPLAY_LIMIT,
        }
    }
}

/// OpenAPI validator settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenApiConfig {
    /// JSON schema file used instead of the embedded OpenAPI 3.0 schema.
    pub schema: Option<PathBuf>,
}

/// Parses config TOML.
///
/// # Errors
///
/// Returns [`toml::de::Error`] if the TOML is malformed or has unknown keys.
pub fn parse_config(toml_str: &str) -> Result<Config, toml::de::Error> {
    toml::de::from_str(toml_str)
}

/// Loads the config from `explicit`, else from `DATA_TOOLS_CONFIG`, else
/// returns defaults.
///
/// A missing file named by the environment variable is logged and ignored;
/// a missing `--config` file is an error.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_file(path);
    }

    let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) else {
        return Ok(Config::default());
    };

    if !path.exists() {
        log::warn!(
            "{CONFIG_ENV} points at {} which does not exist, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    load_file(&path)
}

fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config = parse_config(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("Loaded config from {}", path.display());

    Ok(config)
}
