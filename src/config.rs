//! Configuration for claude-loop.
//!
//! Settings live in an optional TOML file, by default
//! `{config_dir}/claude-loop/config.toml`. Every field has a default, so a
//! missing file (or a missing section) simply means "use the defaults".
//!
//! ```toml
//! [analysis]
//! model = "claude-3-haiku-20240307"
//! api_key_env = "ANTHROPIC_API_KEY"
//! max_tokens = 500
//! timeout_secs = 30
//!
//! [probe]
//! timeout_secs = 10
//!
//! [presets]
//! user_file = "/home/me/.config/claude-loop/presets.toml"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{LoopError, Result};

/// Application directory name under the platform config dir.
pub const APP_DIR: &str = "claude-loop";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub probe: ProbeConfig,
    pub presets: PresetsConfig,
}

// ============================================================================
// Analysis Settings
// ============================================================================

/// Settings for the external analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Model ID sent with each request.
    pub model: String,

    /// Environment variable name containing the API key.
    ///
    /// Default: "ANTHROPIC_API_KEY".
    pub api_key_env: String,

    /// Response token cap.
    pub max_tokens: u32,

    /// Client-side request timeout in seconds.
    pub timeout_secs: u64,

    /// Messages API endpoint.
    pub endpoint: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-haiku-20240307".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            max_tokens: 500,
            timeout_secs: 30,
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Read the credential from the configured environment variable.
    ///
    /// Blank values count as absent.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate the analysis configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model or endpoint is empty
    /// - `max_tokens` or `timeout_secs` is zero
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("analysis.model must not be empty".to_string());
        }
        if self.endpoint.trim().is_empty() {
            return Err("analysis.endpoint must not be empty".to_string());
        }
        if self.max_tokens == 0 {
            return Err("analysis.max_tokens must be greater than 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("analysis.timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Probe Settings
// ============================================================================

/// Settings for the change probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Timeout for each git query, in seconds.
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl ProbeConfig {
    /// Validate the probe configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `timeout_secs` is zero.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("probe.timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Preset Settings
// ============================================================================

/// Where user presets come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetsConfig {
    /// Explicit user preset file. Defaults to
    /// `{config_dir}/claude-loop/presets.toml`.
    pub user_file: Option<PathBuf>,
}

// ============================================================================
// Loading
// ============================================================================

impl Config {
    /// Default config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("config.toml"))
    }

    /// Default user preset file location.
    #[must_use]
    pub fn default_presets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("presets.toml"))
    }

    /// Load configuration.
    ///
    /// With an explicit `path` the file must exist and be valid. Without one,
    /// the default location is tried through [`Config::load_or_default`].
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, cannot be read, is
    /// not valid TOML, or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(LoopError::config_with_path(
                        "config file not found",
                        explicit.to_path_buf(),
                    ));
                }
                Self::from_file(explicit)
            }
            None => Ok(Self::default_path()
                .map(|default| Self::load_or_default(&default))
                .unwrap_or_default()),
        }
    }

    /// Load `path` if it exists; a missing, unreadable, or invalid file
    /// yields [`Config::default`]. Problems other than absence are logged.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load and validate a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if reading, parsing, or validation fails.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoopError::config_with_path(e.to_string(), path.to_path_buf()))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| LoopError::config_with_path(e.to_string(), path.to_path_buf()))?;
        config
            .analysis
            .validate()
            .and_then(|()| config.probe.validate())
            .map_err(|e| LoopError::config_with_path(e, path.to_path_buf()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolved user preset file, if any location can be determined.
    #[must_use]
    pub fn user_presets_path(&self) -> Option<PathBuf> {
        self.presets
            .user_file
            .clone()
            .or_else(Self::default_presets_path)
    }
}
