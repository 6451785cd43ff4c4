//! Configuration for mudterm.
//!
//! This module provides TOML configuration loading from
//! `~/.mudterm/config.toml`:
//!
//! ```toml
//! [world]
//! host = "mud.example.com"
//! port = 4000
//!
//! # 16 colors, ANSI order (black, red, green, yellow, blue, magenta,
//! # cyan, light gray, then the bright counterparts)
//! palette = [
//!     "#000000", "#800000", "#008000", "#808000",
//!     "#000080", "#800080", "#008080", "#C0C0C0",
//!     "#808080", "#FF0000", "#00FF00", "#FFFF00",
//!     "#0000FF", "#FF00FF", "#00FFFF", "#FFFFFF",
//! ]
//!
//! [echo]
//! foreground = "#FFFF00"
//! ```

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::session::EchoStyle;
use crate::output::{Palette, RgbColor};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Default world to connect to
    pub world: WorldConfig,
    /// Palette override, 16 hex colors in ANSI order
    pub palette: Vec<String>,
    /// Input echo colors
    pub echo: EchoConfig,
}

/// Default world address
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub host: Option<String>,
    pub port: u16,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 4000,
        }
    }
}

/// Input echo colors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoConfig {
    pub foreground: String,
    pub background: Option<String>,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            foreground: "#FFFF00".to_string(),
            background: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    match toml::from_str(&content) {
                        Ok(config) => return config,
                        Err(error) => {
                            tracing::warn!("ignoring malformed config: {}", error);
                        }
                    }
                }
            }
        }
        Self::default()
    }

    /// Save configuration to file
    #[allow(dead_code)]
    pub fn save(&self) -> Result<(), String> {
        if let Some(path) = Self::config_path() {
            let content = toml::to_string_pretty(self)
                .map_err(|e| format!("Failed to serialize config: {}", e))?;
            fs::write(&path, content).map_err(|e| format!("Failed to write config: {}", e))?;
            Ok(())
        } else {
            Err("Could not determine config path".to_string())
        }
    }

    /// Get config file path
    fn config_path() -> Option<PathBuf> {
        if let Some(home) = home_dir() {
            let mudterm_dir = home.join(".mudterm");
            if !mudterm_dir.exists() {
                let _ = fs::create_dir_all(&mudterm_dir);
            }
            return Some(mudterm_dir.join("config.toml"));
        }
        None
    }

    /// The session palette: the configured override when it is a complete,
    /// well-formed 16-color table, the conventional ANSI table otherwise.
    pub fn palette(&self) -> Palette {
        if self.palette.is_empty() {
            return Palette::default();
        }
        if self.palette.len() != 16 {
            tracing::warn!(
                "palette override has {} entries instead of 16, using defaults",
                self.palette.len()
            );
            return Palette::default();
        }
        let mut colors = *Palette::ANSI.colors();
        for (slot, entry) in colors.iter_mut().zip(&self.palette) {
            match parse_hex_color(entry) {
                Some(color) => *slot = color,
                None => {
                    tracing::warn!("bad palette color {:?}, using defaults", entry);
                    return Palette::default();
                }
            }
        }
        Palette::new(colors)
    }

    /// The input echo style.
    pub fn echo_style(&self) -> EchoStyle {
        let default = EchoStyle::default();
        EchoStyle {
            foreground: parse_hex_color(&self.echo.foreground).or(default.foreground),
            background: self
                .echo
                .background
                .as_deref()
                .and_then(parse_hex_color),
        }
    }
}

/// Parse `#RRGGBB` (or `RRGGBB`) into a color.
pub fn parse_hex_color(text: &str) -> Option<RgbColor> {
    let hex = text.strip_prefix('#').unwrap_or(text);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let code = u32::from_str_radix(hex, 16).ok()?;
    Some(RgbColor::from_code(code))
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF8000"), Some(RgbColor::new(255, 128, 0)));
        assert_eq!(parse_hex_color("ff8000"), Some(RgbColor::new(255, 128, 0)));
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
        assert_eq!(parse_hex_color(""), None);
    }

    #[test]
    fn test_palette_from_config() {
        let mut config = Config::default();
        assert_eq!(config.palette(), Palette::default());

        config.palette = vec!["#112233".to_string(); 16];
        let palette = config.palette();
        assert_eq!(palette.get(0), Some(RgbColor::new(0x11, 0x22, 0x33)));
        assert_eq!(palette.get(15), Some(RgbColor::new(0x11, 0x22, 0x33)));
    }

    #[test]
    fn test_bad_palette_falls_back() {
        let mut config = Config::default();
        config.palette = vec!["#112233".to_string(); 3];
        assert_eq!(config.palette(), Palette::default());

        config.palette = vec!["oops".to_string(); 16];
        assert_eq!(config.palette(), Palette::default());
    }

    #[test]
    fn test_config_parses_from_toml() {
        let config: Config = toml::from_str(
            r##"
            [world]
            host = "mud.example.com"
            port = 2300

            [echo]
            foreground = "#00FF00"
            "##,
        )
        .expect("parse config");
        assert_eq!(config.world.host.as_deref(), Some("mud.example.com"));
        assert_eq!(config.world.port, 2300);
        assert_eq!(
            config.echo_style().foreground,
            Some(RgbColor::new(0, 255, 0))
        );
    }
}
