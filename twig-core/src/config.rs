//! Configuration management for Twig
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (TWIG_*)
//! 3. Config file (~/.config/twig/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Offset};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogConfig, RESERVED_PROPERTIES};
use crate::engine::{EngineSettings, OptionKey};
use crate::render::{Color, Layout, Style};
use crate::{Error, Result};

/// Offset commit times are displayed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneSetting {
    /// The machine's current UTC offset
    #[default]
    Local,
    Utc,
}

impl TimeZoneSetting {
    pub fn offset(self) -> FixedOffset {
        match self {
            TimeZoneSetting::Local => *chrono::Local::now().offset(),
            TimeZoneSetting::Utc => chrono::Utc.fix(),
        }
    }
}

impl std::str::FromStr for TimeZoneSetting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(TimeZoneSetting::Local),
            "utc" => Ok(TimeZoneSetting::Utc),
            other => Err(Error::Config(format!(
                "Unknown timezone '{}', expected 'local' or 'utc'",
                other
            ))),
        }
    }
}

/// Listing defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListConfig {
    /// Hide branches without commits in this many days
    pub max_days_old: Option<f64>,

    /// Only list branches matching this pattern
    pub only_branch: Option<String>,

    /// Hide branches matching this pattern
    pub except_branch: Option<String>,

    pub timezone: TimeZoneSetting,

    /// Color of the column headers
    pub header_color: Color,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            max_days_old: None,
            only_branch: None,
            except_branch: None,
            timezone: TimeZoneSetting::Local,
            header_color: Color::Blue,
        }
    }
}

/// Branch property settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PropertiesConfig {
    /// Property names hidden from listings and protected from writes
    pub reserved: Vec<String>,
}

impl Default for PropertiesConfig {
    fn default() -> Self {
        Self {
            reserved: RESERVED_PROPERTIES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub list: ListConfig,
    pub properties: PropertiesConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/twig/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("twig").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - TWIG_MAX_DAYS_OLD: Hide branches older than this many days
    /// - TWIG_ONLY_BRANCH: Only list matching branches
    /// - TWIG_EXCEPT_BRANCH: Hide matching branches
    /// - TWIG_TIMEZONE: `local` or `utc`
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(days) = lookup("TWIG_MAX_DAYS_OLD") {
            let parsed = days.trim().parse::<f64>().ok().filter(|d| d.is_finite());
            match parsed {
                Some(parsed) => self.list.max_days_old = Some(parsed),
                None => {
                    return Err(Error::InvalidNumericOption {
                        flag: OptionKey::MaxDaysOld.flag().to_string(),
                        value: days,
                    })
                }
            }
        }

        if let Some(pattern) = lookup("TWIG_ONLY_BRANCH") {
            self.list.only_branch = Some(pattern);
        }

        if let Some(pattern) = lookup("TWIG_EXCEPT_BRANCH") {
            self.list.except_branch = Some(pattern);
        }

        if let Some(timezone) = lookup("TWIG_TIMEZONE") {
            self.list.timezone = timezone.parse()?;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, utc: bool) -> Self {
        if utc {
            self.list.timezone = TimeZoneSetting::Utc;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(utc: bool) -> Result<Self> {
        Ok(Self::load()?.with_env_overrides()?.with_cli_overrides(utc))
    }

    /// Filters to apply before any given on the command line
    pub fn default_options(&self) -> Vec<(OptionKey, String)> {
        let mut options = Vec::new();

        if let Some(days) = self.list.max_days_old {
            options.push((OptionKey::MaxDaysOld, days.to_string()));
        }
        if let Some(pattern) = &self.list.only_branch {
            options.push((OptionKey::NameOnly, pattern.clone()));
        }
        if let Some(pattern) = &self.list.except_branch {
            options.push((OptionKey::NameExcept, pattern.clone()));
        }

        options
    }

    /// Construction constants for the inventory engine
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            catalog: CatalogConfig {
                reserved_properties: self.properties.reserved.clone(),
                display_offset: self.list.timezone.offset(),
            },
            layout: Layout {
                header_style: Style::color(self.list.header_color),
                ..Layout::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.list.max_days_old.is_none());
        assert_eq!(config.list.timezone, TimeZoneSetting::Local);
        assert_eq!(config.list.header_color, Color::Blue);
        assert_eq!(config.properties.reserved, vec!["merge", "remote"]);
        assert!(config.default_options().is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[list]
max_days_old = 30
only_branch = "^feature/"
timezone = "utc"
header_color = "cyan"

[properties]
reserved = ["merge", "remote", "rebase"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.list.max_days_old, Some(30.0));
        assert_eq!(config.list.only_branch.as_deref(), Some("^feature/"));
        assert_eq!(config.list.timezone, TimeZoneSetting::Utc);
        assert_eq!(config.list.header_color, Color::Cyan);
        assert_eq!(config.properties.reserved.len(), 3);
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[list]
except_branch = "^wip/"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // everything else should use defaults
        assert_eq!(config.list.except_branch.as_deref(), Some("^wip/"));
        assert_eq!(config.list.header_color, Color::Blue);
        assert_eq!(config.properties.reserved, vec!["merge", "remote"]);
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[list]\nmax_days_old = 2.5\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.list.max_days_old, Some(2.5));

        std::fs::write(&path, "[list\n").unwrap();
        assert!(matches!(Config::load_from_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_overrides_from(env(&[
                ("TWIG_MAX_DAYS_OLD", "14"),
                ("TWIG_EXCEPT_BRANCH", "^tmp"),
                ("TWIG_TIMEZONE", "UTC"),
            ]))
            .unwrap();

        assert_eq!(config.list.max_days_old, Some(14.0));
        assert_eq!(config.list.except_branch.as_deref(), Some("^tmp"));
        assert_eq!(config.list.timezone, TimeZoneSetting::Utc);
    }

    #[test]
    fn test_env_overrides_reject_bad_values() {
        let result = Config::default().with_overrides_from(env(&[("TWIG_MAX_DAYS_OLD", "soon")]));
        assert!(matches!(result, Err(Error::InvalidNumericOption { .. })));

        let result = Config::default().with_overrides_from(env(&[("TWIG_TIMEZONE", "mars")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(true);
        assert_eq!(config.list.timezone, TimeZoneSetting::Utc);
    }

    #[test]
    fn test_default_options_and_settings() {
        let mut config = Config::default();
        config.list.max_days_old = Some(30.0);
        config.list.only_branch = Some("^feature/".to_string());
        config.list.timezone = TimeZoneSetting::Utc;
        config.list.header_color = Color::Green;

        assert_eq!(
            config.default_options(),
            vec![
                (OptionKey::MaxDaysOld, "30".to_string()),
                (OptionKey::NameOnly, "^feature/".to_string()),
            ]
        );

        let settings = config.engine_settings();
        assert_eq!(settings.catalog.display_offset.local_minus_utc(), 0);
        assert_eq!(settings.layout.header_style, Style::color(Color::Green));
        assert_eq!(settings.layout.unit_width, 8);
    }
}
