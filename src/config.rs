//! Configuration for the area-window demo
//!
//! Loads configuration from TOML file at `~/.config/area-window/config.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::display::WindowOptions;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Configuration loaded from {:?}", path);
        debug!("Config: {:?}", config);
        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("area-window");

        Ok(config_dir.join("config.toml"))
    }

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

/// Initial window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u16,
    pub height: u16,
    /// Background color (hex: 0xRRGGBB)
    pub background: u32,
    /// Accent color used by the demo painter (hex: 0xRRGGBB)
    pub accent: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "area-window".to_string(),
            width: 800,
            height: 600,
            background: 0x2e3440, // Polar Night Darkest
            accent: 0x5e81ac,     // Frost Blue
        }
    }
}

impl WindowConfig {
    pub fn to_options(&self) -> WindowOptions {
        WindowOptions {
            title: self.title.clone(),
            width: self.width,
            height: self.height,
            background: self.background,
        }
    }
}

/// Display connection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// X display to connect to; `$DISPLAY` when unset
    pub name: Option<String>,
    /// Override the pixels-per-point factor derived from the screen's DPI
    pub pixels_per_pt: Option<f32>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "area_window=info,area-window=info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.window.width, 800);
        assert_eq!(parsed.window.title, "area-window");
        assert!(parsed.display.pixels_per_pt.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[window]\nwidth = 320\n\n[display]\npixels_per_pt = 2.0\n").unwrap();
        assert_eq!(parsed.window.width, 320);
        assert_eq!(parsed.window.height, 600);
        assert_eq!(parsed.display.pixels_per_pt, Some(2.0));
        assert_eq!(parsed.logging.filter, LoggingConfig::default().filter);
    }

    #[test]
    fn test_window_options_from_config() {
        let opts = WindowConfig::default().to_options();
        assert_eq!(opts.title, "area-window");
        assert_eq!((opts.width, opts.height), (800, 600));
        assert_eq!(opts.background, 0x2e3440);
    }
}
