use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::overlay::OverlayStyle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub defaults: Defaults,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub mirror_mode: bool,
    pub show_status: bool,
    pub show_frames: bool,
    pub show_callout: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub brand_color_hex: String, // duotone colour, e.g. "#FF462F"
    pub glyph_color_hex: String,
    pub display_string: String,
    pub font_family: String,
    pub font_size_px: f32,
    pub line_width: f32,
    pub status_scale: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            mirror_mode: true,
            show_status: true,
            show_frames: true,
            show_callout: true,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            brand_color_hex: "#FF462F".to_string(),
            glyph_color_hex: "#31302C".to_string(),
            display_string: "HELLO".to_string(),
            font_family: "Arial".to_string(),
            font_size_px: 120.0,
            line_width: 5.0,
            status_scale: 2,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            ui: UiConfig::default(),
        }
    }
}

impl AppConfig {
    pub const PATH: &'static str = "config.json";

    /// Reads `path`, falling back to defaults when it is missing or
    /// malformed, then writes the result back so new fields show up.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            match serde_json::from_str::<AppConfig>(&content) {
                Ok(c) => {
                    info!("Loaded configuration from {}", path.display());
                    c
                }
                Err(e) => {
                    warn!("Error parsing config: {}. Loading defaults.", e);
                    Self::default()
                }
            }
        } else {
            info!("Configuration file not found. Creating default at {}", path.display());
            Self::default()
        };

        config.save_to(path)?;
        Ok(config)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write {}", path.as_ref().display()))?;
        Ok(())
    }

    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            line_width: self.ui.line_width.max(1.0),
            line_color: [255, 255, 255],
            cone_color: parse_hex(&self.ui.brand_color_hex),
            glyph_color: parse_hex(&self.ui.glyph_color_hex),
            status_scale: self.ui.status_scale.max(1),
            show_frames: self.defaults.show_frames,
            show_callout: self.defaults.show_callout,
            show_status: self.defaults.show_status,
        }
    }
}

/// `#RRGGBB` to RGB; anything else is red.
pub fn parse_hex(hex: &str) -> [u8; 3] {
    if hex.len() == 7 && hex.starts_with('#') && hex.is_ascii() {
        let r = u8::from_str_radix(&hex[1..3], 16).unwrap_or(255);
        let g = u8::from_str_radix(&hex[3..5], 16).unwrap_or(0);
        let b = u8::from_str_radix(&hex[5..7], 16).unwrap_or(0);
        [r, g, b]
    } else {
        [255, 0, 0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_BRAND_COLOR, DEFAULT_GLYPH_COLOR};

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#FF462F"), [255, 70, 47]);
        assert_eq!(parse_hex("#31302c"), [49, 48, 44]);
        assert_eq!(parse_hex("FF462F"), [255, 0, 0]);
        assert_eq!(parse_hex("#GG0000"), [255, 0, 0]);
        assert_eq!(parse_hex("#ééé"), [255, 0, 0]);
    }

    #[test]
    fn defaults_match_brand() {
        let style = AppConfig::default().overlay_style();
        assert_eq!(style.cone_color, DEFAULT_BRAND_COLOR);
        assert_eq!(style.glyph_color, DEFAULT_GLYPH_COLOR);
        assert_eq!(style.line_width, 5.0);
    }

    #[test]
    fn missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"ui": {"display_string": "HI THERE"}}"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.ui.display_string, "HI THERE");
        assert_eq!(config.ui.font_size_px, 120.0);
        assert!(config.defaults.show_callout);

        // written back with every field
        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.contains("brand_color_hex"));
    }

    #[test]
    fn malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
