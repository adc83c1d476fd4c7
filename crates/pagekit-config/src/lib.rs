//! Configuration management for pagekit
//!
//! This module handles loading, validation, and management of
//! pagekit configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Theme persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Storage key the preferred theme is persisted under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Attribute name carrying the theme on the page root
    #[serde(default = "default_theme_attribute")]
    pub attribute: String,
    /// Theme applied when no preference has been persisted
    #[serde(default)]
    pub default_theme: ThemeName,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            attribute: default_theme_attribute(),
            default_theme: ThemeName::default(),
        }
    }
}

fn default_storage_key() -> String {
    "preferred-theme".to_string()
}

fn default_theme_attribute() -> String {
    "data-theme".to_string()
}

/// Theme name enumeration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    /// Light visual mode
    Light,
    /// Dark visual mode
    Dark,
}

impl Default for ThemeName {
    fn default() -> Self {
        ThemeName::Light
    }
}

impl std::str::FromStr for ThemeName {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(ThemeName::Light),
            "dark" => Ok(ThemeName::Dark),
            _ => Err(format!("Invalid theme name: {}", s)),
        }
    }
}

impl std::fmt::Display for ThemeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeName::Light => write!(f, "light"),
            ThemeName::Dark => write!(f, "dark"),
        }
    }
}

/// Timer durations for transient UI elements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Delay before non-permanent alerts present at load are dismissed
    #[serde(default = "default_alert_dismiss_ms")]
    pub alert_dismiss_ms: u64,
    /// Delay before an injected success banner dismisses itself
    #[serde(default = "default_success_dismiss_ms")]
    pub success_dismiss_ms: u64,
    /// Whether toasts hide on their own after showing
    #[serde(default = "default_true")]
    pub toast_auto_hide: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            alert_dismiss_ms: default_alert_dismiss_ms(),
            success_dismiss_ms: default_success_dismiss_ms(),
            toast_auto_hide: true,
        }
    }
}

fn default_alert_dismiss_ms() -> u64 {
    5000
}

fn default_success_dismiss_ms() -> u64 {
    3000
}

fn default_true() -> bool {
    true
}

/// Date rendering settings
///
/// Formats are explicit chrono format strings so rendered output is
/// deterministic across environments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Short date format
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Long date-time format
    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            datetime_format: default_datetime_format(),
        }
    }
}

fn default_date_format() -> String {
    "%m/%d/%Y".to_string()
}

fn default_datetime_format() -> String {
    "%B %e, %Y %H:%M".to_string()
}

/// Network request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Base URL prepended to relative request paths
    #[serde(default)]
    pub base_url: Option<String>,
    /// Content type attached to every request unless overridden
    #[serde(default = "default_content_type")]
    pub default_content_type: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            default_content_type: default_content_type(),
        }
    }
}

fn default_content_type() -> String {
    "application/json".to_string()
}

/// Page element conventions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Class of the default banner container
    #[serde(default = "default_container_class")]
    pub container_class: String,
    /// Text shown by the loading helper when none is given
    #[serde(default = "default_loading_text")]
    pub loading_text: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            container_class: default_container_class(),
            loading_text: default_loading_text(),
        }
    }
}

fn default_container_class() -> String {
    "container".to_string()
}

fn default_loading_text() -> String {
    "Loading...".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "debug".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PageConfig {
    /// Theme persistence settings
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Timer durations
    #[serde(default)]
    pub timing: TimingConfig,
    /// Date rendering settings
    #[serde(default)]
    pub format: FormatConfig,
    /// Network request settings
    #[serde(default)]
    pub network: NetworkConfig,
    /// Page element conventions
    #[serde(default)]
    pub ui: UiConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PageConfig {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError,
        })?;

        let config: PageConfig =
            serde_yaml::from_str(&content).map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.theme.storage_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "theme.storage_key".to_string(),
                reason: "Storage key must not be empty".to_string(),
            });
        }

        if self.theme.attribute.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "theme.attribute".to_string(),
                reason: "Theme attribute name must not be empty".to_string(),
            });
        }

        if self.timing.alert_dismiss_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timing.alert_dismiss_ms".to_string(),
                reason: "Alert dismissal delay must be greater than 0".to_string(),
            });
        }

        if self.timing.success_dismiss_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timing.success_dismiss_ms".to_string(),
                reason: "Success banner delay must be greater than 0".to_string(),
            });
        }

        if self.format.date_format.is_empty() || self.format.datetime_format.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "format".to_string(),
                reason: "Date formats must not be empty".to_string(),
            });
        }

        if self.ui.container_class.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ui.container_class".to_string(),
                reason: "Container class must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults_match_page_conventions() {
        let config = PageConfig::default();
        assert_eq!(config.theme.storage_key, "preferred-theme");
        assert_eq!(config.theme.attribute, "data-theme");
        assert_eq!(config.timing.alert_dismiss_ms, 5000);
        assert_eq!(config.timing.success_dismiss_ms, 3000);
        assert_eq!(config.network.default_content_type, "application/json");
        assert_eq!(config.ui.container_class, "container");
        assert_eq!(config.ui.loading_text, "Loading...");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_theme_name_round_trip() {
        assert_eq!(ThemeName::from_str("dark"), Ok(ThemeName::Dark));
        assert_eq!(ThemeName::from_str("LIGHT"), Ok(ThemeName::Light));
        assert!(ThemeName::from_str("sepia").is_err());
        assert_eq!(ThemeName::Dark.to_string(), "dark");
        assert_eq!(ThemeName::default(), ThemeName::Light);
    }

    #[test]
    fn test_validate_rejects_zero_timers() {
        let mut config = PageConfig::default();
        config.timing.alert_dismiss_ms = 0;
        assert!(config.validate().is_err());

        let mut config = PageConfig::default();
        config.timing.success_dismiss_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_storage_key() {
        let mut config = PageConfig::default();
        config.theme.storage_key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "timing:\n  alert_dismiss_ms: 250\n";
        let config: PageConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.timing.alert_dismiss_ms, 250);
        assert_eq!(config.timing.success_dismiss_ms, 3000);
        assert_eq!(config.theme.storage_key, "preferred-theme");
    }

    #[test]
    fn test_default_template_parses() {
        let config: PageConfig = serde_yaml::from_str(PageConfig::generate_default()).unwrap();
        assert!(config.validate().is_ok());
    }
}
