//! Configuration management for Veil
//!
//! This module handles loading, parsing, and validating configuration
//! from TOML files. It combines animation timing, popup layer metrics,
//! driver settings and the popup templates known to the default resolver.

use anyhow::{Context, Result};
use cgmath::Vector2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::popup::PopupTemplate;

/// Main configuration struct containing all Veil settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct VeilConfig {
    /// Open/close animation timing
    #[serde(default)]
    pub animation: AnimationConfig,

    /// Popup layer metrics and draw ordering
    #[serde(default)]
    pub layer: LayerConfig,

    /// Driver loop settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Popup templates by identity name (`[popups.Settings]`)
    #[serde(default)]
    pub popups: BTreeMap<String, PopupTemplate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Attach animation controllers to popups; when false every close is immediate
    pub enabled: bool,

    /// Duration of every open/close channel (milliseconds)
    pub duration_ms: u32,

    /// Delay before the close button pops in (milliseconds)
    pub accent_delay_ms: u32,

    /// Scale a popup starts from when the scale channel is enabled
    pub hidden_scale: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayerConfig {
    /// Draw order of the popup layer canvas itself
    pub base_draw_order: i32,

    /// Screen width used for off-screen slide targets (pixels)
    pub viewport_width: f32,

    /// Screen height used for off-screen slide targets (pixels)
    pub viewport_height: f32,
}

/// General driver settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable debug logging
    pub debug: bool,

    /// Frame rate of the driver loop
    pub fps: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_ms: 200,
            accent_delay_ms: 100,
            hidden_scale: 0.8,
        }
    }
}

impl AnimationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.duration_ms))
    }

    pub fn accent_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.accent_delay_ms))
    }
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            base_draw_order: 100,
            viewport_width: 1920.0,
            viewport_height: 1080.0,
        }
    }
}

impl LayerConfig {
    pub fn viewport(&self) -> Vector2<f32> {
        Vector2::new(self.viewport_width, self.viewport_height)
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            debug: false,
            fps: 60,
        }
    }
}

impl VeilConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Expand ~ to home directory
        let expanded_path = if path.to_string_lossy().starts_with('~') {
            let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
            let relative = path.strip_prefix("~").unwrap_or(path);
            Path::new(&home).join(relative)
        } else {
            path.to_path_buf()
        };

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        let config: VeilConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", expanded_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.animation.duration_ms > 10_000 {
            anyhow::bail!("Invalid animation duration_ms: must be at most 10000");
        }

        if self.animation.accent_delay_ms > 10_000 {
            anyhow::bail!("Invalid animation accent_delay_ms: must be at most 10000");
        }

        if !(self.animation.hidden_scale > 0.0 && self.animation.hidden_scale <= 1.0) {
            anyhow::bail!("Invalid hidden_scale: must be in (0.0, 1.0]");
        }

        if self.layer.viewport_width <= 0.0 || self.layer.viewport_height <= 0.0 {
            anyhow::bail!("Invalid viewport: width and height must be positive");
        }

        if self.general.fps == 0 || self.general.fps > 240 {
            anyhow::bail!("Invalid fps: must be between 1 and 240");
        }

        for (name, template) in &self.popups {
            if name.trim().is_empty() {
                anyhow::bail!("Invalid popup template: empty identity name");
            }
            if template.width < 0.0 || template.height < 0.0 {
                anyhow::bail!("Invalid popup template '{}': negative panel size", name);
            }
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, contents).context("Failed to write configuration file")?;

        Ok(())
    }

    /// Merge a partial configuration into this one.
    /// Sections that differ from their defaults override this config;
    /// popup templates are added, replacing same-named entries.
    pub fn merge_partial(mut self, partial: VeilConfig) -> Self {
        let default_config = VeilConfig::default();

        if partial.animation != default_config.animation {
            self.animation = partial.animation;
        }
        if partial.layer != default_config.layer {
            self.layer = partial.layer;
        }
        if partial.general != default_config.general {
            self.general = partial.general;
        }
        self.popups.extend(partial.popups);

        self
    }
}
