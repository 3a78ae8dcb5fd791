//! Configuration for Area window chrome
//!
//! Loads configuration from TOML file at `~/.config/area/chrome.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::ChromeError;
use crate::shared::Geometry;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chrome: ChromeConfig,
    pub dock: DockConfig,
    pub notify: NotifyConfig,
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            // Auto-generate default config file
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        Self::from_path(&config_path)
    }

    /// Load and validate configuration from an explicit path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.chrome.validate().context("Invalid chrome section")?;
        config.dock.validate().context("Invalid dock section")?;

        info!("Configuration loaded from {:?}", path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("area");

        Ok(config_dir.join("chrome.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string).context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

/// Chrome geometry, fixed for the lifetime of a controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeConfig {
    /// Layout minimum width
    pub min_width: f64,
    /// Layout minimum height
    pub min_height: f64,
    /// Resize grip thickness in pixels
    pub resize_border_width: i32,
    /// Drop-shadow margin around the window in pixels
    pub base_outer_margin: i32,
    /// Corner radius in pixels
    pub base_corner_radius: i32,
    /// Titlebar height in pixels
    pub title_bar_height: i32,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            min_width: 400.0,
            min_height: 400.0,
            resize_border_width: 6,
            base_outer_margin: 10,
            base_corner_radius: 10,
            title_bar_height: 42,
        }
    }
}

impl ChromeConfig {
    /// Reject negative sizes before they reach derived geometry
    pub fn validate(&self) -> Result<(), ChromeError> {
        for (field, value) in [("min_width", self.min_width), ("min_height", self.min_height)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChromeError::InvalidConfig {
                    field,
                    value: value.to_string(),
                });
            }
        }

        for (field, value) in [
            ("resize_border_width", self.resize_border_width),
            ("base_outer_margin", self.base_outer_margin),
            ("base_corner_radius", self.base_corner_radius),
            ("title_bar_height", self.title_bar_height),
        ] {
            if value < 0 {
                return Err(ChromeError::InvalidConfig {
                    field,
                    value: value.to_string(),
                });
            }
        }

        // derived geometry adds these pairs together
        for (field, a, b) in [
            (
                "resize_border_width + base_outer_margin",
                self.resize_border_width,
                self.base_outer_margin,
            ),
            (
                "title_bar_height + resize_border_width",
                self.title_bar_height,
                self.resize_border_width,
            ),
        ] {
            if a.checked_add(b).is_none() {
                return Err(ChromeError::InvalidConfig {
                    field,
                    value: format!("{} + {}", a, b),
                });
            }
        }

        Ok(())
    }
}

/// Dock detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    /// Distance from a work-area edge that still counts as touching it
    pub snap_distance: i32,
    /// Work area the replay harness docks against
    pub work_area: Geometry,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            snap_distance: 8,
            work_area: Geometry::new(0, 0, 1920, 1080),
        }
    }
}

impl DockConfig {
    pub fn validate(&self) -> Result<(), ChromeError> {
        if self.snap_distance < 0 {
            return Err(ChromeError::InvalidConfig {
                field: "snap_distance",
                value: self.snap_distance.to_string(),
            });
        }
        self.work_area
            .validate()
            .map_err(|_| ChromeError::InvalidConfig {
                field: "work_area",
                value: format!("{:?}", self.work_area),
            })
    }
}

/// When attribute changes are published
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyPolicy {
    /// Every state or dock signal republishes the full state-dependent set
    #[default]
    Always,
    /// Only attributes whose value actually moved are published
    OnChange,
}

/// Notification configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub policy: NotifyPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_window() {
        let config = Config::default();
        assert_eq!(config.chrome.min_width, 400.0);
        assert_eq!(config.chrome.resize_border_width, 6);
        assert_eq!(config.chrome.base_outer_margin, 10);
        assert_eq!(config.chrome.base_corner_radius, 10);
        assert_eq!(config.chrome.title_bar_height, 42);
        assert_eq!(config.notify.policy, NotifyPolicy::Always);
        assert!(config.chrome.validate().is_ok());
    }

    #[test]
    fn test_negative_values_rejected() {
        let config = ChromeConfig {
            title_bar_height: -4,
            ..ChromeConfig::default()
        };
        match config.validate() {
            Err(ChromeError::InvalidConfig { field, value }) => {
                assert_eq!(field, "title_bar_height");
                assert_eq!(value, "-4");
            }
            other => panic!("unexpected: {:?}", other),
        }

        let config = ChromeConfig {
            min_height: f64::NAN,
            ..ChromeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sums_that_overflow_rejected() {
        let config = ChromeConfig {
            title_bar_height: i32::MAX,
            ..ChromeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ChromeError::InvalidConfig { field: "title_bar_height + resize_border_width", .. })
        ));

        let config = ChromeConfig {
            resize_border_width: i32::MAX - 5,
            title_bar_height: 0,
            ..ChromeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ChromeError::InvalidConfig { field: "resize_border_width + base_outer_margin", .. })
        ));

        let at_limit = ChromeConfig {
            resize_border_width: 0,
            base_outer_margin: i32::MAX,
            title_bar_height: i32::MAX,
            ..ChromeConfig::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_huge_title_bar_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chrome.toml");
        fs::write(&path, "[chrome]\ntitle_bar_height = 2147483647\n").unwrap();

        let err = Config::from_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("title_bar_height"));
    }

    #[test]
    fn test_work_area_bounds_checked() {
        let dock = DockConfig {
            work_area: Geometry::new(0, 0, u32::MAX, 1080),
            ..DockConfig::default()
        };
        assert!(dock.validate().is_err());
        assert!(DockConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chrome.toml");
        fs::write(
            &path,
            "[chrome]\ntitle_bar_height = 30\n\n[notify]\npolicy = \"on_change\"\n",
        )
        .unwrap();

        let config = Config::from_path(&path).unwrap();
        assert_eq!(config.chrome.title_bar_height, 30);
        assert_eq!(config.chrome.base_outer_margin, 10);
        assert_eq!(config.notify.policy, NotifyPolicy::OnChange);
        assert_eq!(config.dock, DockConfig::default());
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chrome.toml");
        fs::write(&path, "[chrome]\nbase_corner_radius = -2\n").unwrap();

        let err = Config::from_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("base_corner_radius"));
    }

    #[test]
    fn test_default_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("area").join("chrome.toml");

        Config::save_default(&path).unwrap();
        assert_eq!(Config::from_path(&path).unwrap(), Config::default());
    }
}
