//! Configuration management for the activity bar
//!
//! Handles loading, parsing and validation of the YAML application config,
//! plus hot-reloading of the theme file it points to.

pub mod watcher;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::activity::PAD_TIMEOUT_MS;
use crate::status::{BATTERY_INTERVAL_MS, NETWORK_INTERVAL_MS};

pub use watcher::ThemeWatcher;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub screen: ScreenMetrics,
    #[serde(default)]
    pub settings: Settings,
    pub theme: ThemeConfig,
    #[serde(default)]
    pub fonts: FontConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Screen size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ScreenMetrics {
    pub width: f32,
    pub height: f32,
}

/// User-facing display toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub show_controller_activity: bool,
    #[serde(default = "default_true")]
    pub show_network_indicator: bool,
    #[serde(default = "default_true")]
    pub show_battery_indicator: bool,
    /// Outline the widget bounds
    #[serde(default)]
    pub debug_image: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_controller_activity: true,
            show_network_indicator: true,
            show_battery_indicator: true,
            debug_image: false,
        }
    }
}

/// Where the widget's theme element lives
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThemeConfig {
    pub path: PathBuf,
    #[serde(default = "default_theme_view")]
    pub view: String,
    #[serde(default = "default_theme_element")]
    pub element: String,
}

/// Font faces
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FontConfig {
    /// Small text face used for the battery percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_text: Option<String>,
}

/// Timeouts and poll intervals (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimingConfig {
    #[serde(default = "default_pad_timeout")]
    pub pad_timeout_ms: u32,
    #[serde(default = "default_network_interval")]
    pub network_interval_ms: u32,
    #[serde(default = "default_battery_interval")]
    pub battery_interval_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            pad_timeout_ms: PAD_TIMEOUT_MS,
            network_interval_ms: NETWORK_INTERVAL_MS,
            battery_interval_ms: BATTERY_INTERVAL_MS,
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        // Theme path is relative to the config file
        if config.theme.path.is_relative() {
            if let Some(dir) = path.parent() {
                config.theme.path = dir.join(&config.theme.path);
            }
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.screen.width > 0.0 && self.screen.height > 0.0) {
            anyhow::bail!(
                "Screen size must be positive (got {}x{})",
                self.screen.width,
                self.screen.height
            );
        }

        if self.theme.view.is_empty() {
            anyhow::bail!("Theme view cannot be empty");
        }
        if self.theme.element.is_empty() {
            anyhow::bail!("Theme element cannot be empty");
        }

        let timing = &self.timing;
        for (name, value) in [
            ("pad_timeout_ms", timing.pad_timeout_ms),
            ("network_interval_ms", timing.network_interval_ms),
            ("battery_interval_ms", timing.battery_interval_ms),
        ] {
            if value == 0 {
                anyhow::bail!("Timing '{}' must be greater than 0", name);
            }
        }

        Ok(())
    }

    /// Directory theme resource paths are resolved against
    pub fn theme_dir(&self) -> PathBuf {
        self.theme
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_theme_view() -> String { "system".to_string() }
fn default_theme_element() -> String { "controllerActivity".to_string() }
fn default_pad_timeout() -> u32 { PAD_TIMEOUT_MS }
fn default_network_interval() -> u32 { NETWORK_INTERVAL_MS }
fn default_battery_interval() -> u32 { BATTERY_INTERVAL_MS }
