//! Configuration file support for the page editor.
//!
//! Server connection, editing tolerances, keybindings and log level live in
//! one versioned JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CLICK_THRESHOLD_PX, DEFAULT_HANDLE_RADIUS_PX,
    DEFAULT_HIT_TOLERANCE_PX, DEFAULT_LLM_LANGUAGE, DEFAULT_LLM_TIMEOUT_SECS,
    DEFAULT_REGION_PADDING, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::keybindings::KeyBindings;
use crate::model::RegionType;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Parse a level name as accepted on the command line.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Page service connection
    #[serde(default)]
    pub server: ServerConfig,

    /// Editing behavior
    #[serde(default)]
    pub editor: EditorSettings,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindings,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Where the page service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL; endpoint paths are appended to it
    pub base_url: String,
    /// Timeout for page loads and saves
    pub request_timeout_secs: u64,
    /// Timeout for transcription suggestions
    pub llm_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

/// Editing tolerances and defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Line edge/baseline hit tolerance in screen pixels
    pub hit_tolerance_px: f64,
    /// Vertex handle radius in screen pixels
    pub handle_radius_px: f64,
    /// Pointer travel (screen pixels) below which a press on empty canvas
    /// is a click rather than a pan
    pub click_threshold_px: f64,
    /// Padding around a line when a region has to be synthesized for it
    pub region_padding: f64,
    /// Type given to newly drawn regions
    pub default_region_type: RegionType,
    /// Language hint for transcription suggestions
    pub llm_language: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            hit_tolerance_px: DEFAULT_HIT_TOLERANCE_PX,
            handle_radius_px: DEFAULT_HANDLE_RADIUS_PX,
            click_threshold_px: DEFAULT_CLICK_THRESHOLD_PX,
            region_padding: DEFAULT_REGION_PADDING,
            default_region_type: RegionType::Text,
            llm_language: DEFAULT_LLM_LANGUAGE.to_string(),
        }
    }
}

impl EditorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
            editor: EditorSettings::default(),
            keybindings: KeyBindings::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        if config.server.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("server.base_url is empty".to_string()));
        }
        let padding = config.editor.region_padding;
        if padding.is_nan() || padding < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "editor.region_padding must be >= 0, got {}",
                padding
            )));
        }

        let threshold = config.editor.click_threshold_px;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "editor.click_threshold_px must be >= 0, got {}",
                threshold
            )));
        }

        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "pagegt-config.json"
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("pagegt").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("pagegt")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Save configuration to the default path.
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to(&path)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagegt_view::KeyCode;

    #[test]
    fn defaults() {
        let config = EditorConfig::new();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.server.llm_timeout_secs, 300);
        assert_eq!(config.editor.region_padding, 50.0);
        assert_eq!(config.editor.click_threshold_px, 5.0);
        assert_eq!(config.editor.llm_language, "German");
    }

    #[test]
    fn minimal_file_fills_defaults() {
        let config = EditorConfig::from_json(
            r#"{"version": 1, "server": {"base_url": "http://pages.local"}, "log_level": "debug"}"#,
        )
        .unwrap();
        assert_eq!(config.server.base_url, "http://pages.local");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.keybindings, KeyBindings::default());
    }

    #[test]
    fn rejects_newer_version() {
        let err = EditorConfig::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                ..
            }
        ));
    }

    #[test]
    fn rejects_negative_padding() {
        let err = EditorConfig::from_json(r#"{"version": 1, "editor": {"region_padding": -1.0}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_negative_click_threshold() {
        let err =
            EditorConfig::from_json(r#"{"version": 1, "editor": {"click_threshold_px": -2.0}}"#)
                .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = EditorConfig::new();
        config.server.base_url = "http://10.0.0.2:8080".to_string();
        config.editor.default_region_type = RegionType::Heading;
        config.keybindings.mode_add_line = KeyCode::K;
        config.save_to(&path).unwrap();

        let loaded = EditorConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EditorConfig::load_from(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn log_level_parsing() {
        assert_eq!(LogLevel::parse("WARN"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
        assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
    }
}
