//! Configuration loading and parsing.
//!
//! Parse `dawn.toml` extracting the render theme, the glyph scaling
//! toggle, and an optional wrap width override (0 follows the viewport).
//! Unknown fields are ignored (TOML deserialization tolerance) so the
//! format can grow without breaking older files; a malformed file falls
//! back to defaults rather than aborting startup.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default)]
    pub theme: ThemeChoice,
    /// Glyph scaling for headers where the terminal supports it.
    #[serde(default = "RenderConfig::default_scaling")]
    pub scaling: bool,
}

impl RenderConfig {
    const fn default_scaling() -> bool {
        true
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            theme: ThemeChoice::default(),
            scaling: Self::default_scaling(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EditorConfig {
    /// Wrap width in cells; 0 follows the viewport width.
    #[serde(default)]
    pub wrap_width: u16,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,
    pub file: ConfigFile,
    /// Wrap width after viewport clamping.
    pub effective_wrap_width: u16,
}

/// Best-effort config path following platform conventions: a local
/// `dawn.toml` wins, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("dawn.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("dawn").join("dawn.toml");
    }
    PathBuf::from("dawn.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => {
                info!(target: "config", path = %path.display(), "config_loaded");
                Ok(Config {
                    raw: Some(content),
                    file,
                    effective_wrap_width: 0, // computed against the viewport later
                })
            }
            Err(_e) => {
                info!(target: "config", path = %path.display(), "config_parse_error_defaults");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}

impl Config {
    /// Clamp the configured wrap width to the viewport. Returns the
    /// effective value; 0 means "use the viewport width".
    pub fn apply_viewport_width(&mut self, viewport_columns: u16) -> u16 {
        let raw = self.file.editor.wrap_width;
        let clamped = if raw == 0 {
            0
        } else {
            raw.min(viewport_columns.max(4))
        };
        if clamped != raw {
            info!(target: "config", raw, clamped, viewport_columns, "wrap_width_clamped");
        }
        self.effective_wrap_width = clamped;
        clamped
    }
}
