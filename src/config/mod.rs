//! Configuration file management
//!
//! Loads TOML configuration files and provides demo settings.
//! Default config path: ~/.config/gles-demos/config.toml

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_MOSAIC_CELL;
use crate::filter::{checked_mosaic_cell, slider_progress, FilterKind};

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "GLES_DEMOS_CONFIG";

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Drawing surface settings
    pub surface: SurfaceConfig,
    /// Demo selection
    pub demo: DemoConfig,
    /// Image resources for the texture demos
    pub images: ImagesConfig,
    /// Image filter settings
    pub filter: FilterConfig,
    /// Frame capture settings
    pub output: OutputConfig,
}

/// Drawing surface settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    /// Clear color (RRGGBB)
    pub clear_color: String,
}

/// Demo selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Demo used when none is given on the command line
    pub default: String,
    /// Frames drawn per surface size in render mode
    pub frames: u32,
}

/// Image resources
///
/// Resource ids are paths relative to `asset_dir`, or `builtin:NAME` for
/// generated images (checker, gradient, badge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub asset_dir: String,
    /// Main image (texture quad, multi-texture background, filter input)
    pub primary: String,
    /// Overlay image for the multi-texture demo
    pub overlay: String,
}

/// Image filter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// "none" | "gray" | "warm" | "cool" | "mosaic"
    pub initial: String,
    /// Warm slider position (0-100)
    pub warm: u32,
    /// Cool slider position (0-100)
    pub cool: u32,
    /// Mosaic block size in 400x400 reference texels
    pub mosaic_cell: f32,
}

/// Frame capture settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for saved frames (~ is expanded)
    pub capture_dir: String,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            clear_color: "ffffff".to_string(),
        }
    }
}

impl SurfaceConfig {
    /// Clear color as normalized RGBA
    pub fn clear_rgba(&self) -> [f32; 4] {
        parse_hex_color(&self.clear_color)
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            default: "point".to_string(),
            frames: 1,
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            asset_dir: "assets".to_string(),
            primary: "builtin:checker".to_string(),
            overlay: "builtin:badge".to_string(),
        }
    }
}

impl ImagesConfig {
    pub fn asset_path(&self) -> PathBuf {
        PathBuf::from(expand_path(&self.asset_dir))
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            initial: "none".to_string(),
            warm: 10,
            cool: 10,
            mosaic_cell: DEFAULT_MOSAIC_CELL,
        }
    }
}

impl FilterConfig {
    /// Resolve the initial filter, using the slider value for warm and cool
    ///
    /// Unknown names fall back to no filter.
    pub fn initial_filter(&self) -> FilterKind {
        let progress = match self.initial.trim().to_ascii_lowercase().as_str() {
            "warm" => Some(slider_progress(self.warm)),
            "cool" => Some(slider_progress(self.cool)),
            _ => None,
        };
        FilterKind::parse(&self.initial, progress).unwrap_or_else(|| {
            warn!("Unknown filter '{}', using none", self.initial);
            FilterKind::None
        })
    }

    /// Mosaic cell size, with non-positive or non-finite values replaced by the default
    pub fn mosaic_cell(&self) -> f32 {
        checked_mosaic_cell(self.mosaic_cell).unwrap_or_else(|| {
            warn!(
                "Invalid mosaic_cell {}, using {}",
                self.mosaic_cell, DEFAULT_MOSAIC_CELL
            );
            DEFAULT_MOSAIC_CELL
        })
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            capture_dir: ".".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn capture_path(&self) -> PathBuf {
        PathBuf::from(expand_path(&self.capture_dir))
    }
}

impl Config {
    /// Get the path that would be used for loading config
    /// Returns None if using built-in defaults
    pub fn config_path() -> Option<PathBuf> {
        // 1. GLES_DEMOS_CONFIG environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let p = Path::new(&path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
            warn!("{} points at missing file: {}", CONFIG_ENV, path);
        }

        // 2. User config: ~/.config/gles-demos/config.toml
        let user_config = default_config_path()?;
        if user_config.exists() {
            return Some(user_config);
        }

        None
    }

    /// Load configuration with priority:
    /// 1. GLES_DEMOS_CONFIG environment variable
    /// 2. ~/.config/gles-demos/config.toml (user config)
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {:#}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Serialize with a short header comment
    pub fn to_toml(&self) -> Result<String> {
        let body = toml::to_string_pretty(self).context("Failed to serialize config")?;
        Ok(format!(
            "# gles-demos configuration\n\
             # Resource ids: a path under [images].asset_dir, or builtin:checker,\n\
             # builtin:gradient, builtin:badge\n\
             # Filters: none, gray, warm, cool, mosaic\n\n{}",
            body
        ))
    }

    /// Write the defaults to `path`, creating parent directories
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = Self::default().to_toml()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}

/// ~/.config/gles-demos/config.toml
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gles-demos").join("config.toml"))
}

/// Convert color string (RRGGBB) to [f32; 4]
///
/// Malformed strings give opaque white.
pub fn parse_hex_color(hex: &str) -> [f32; 4] {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return [1.0, 1.0, 1.0, 1.0];
    }

    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);

    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

/// Expand ~ to the user's home directory
pub fn expand_path(path: &str) -> String {
    if !path.starts_with('~') {
        return path.to_string();
    }

    match dirs::home_dir() {
        Some(home) if path == "~" => home.to_string_lossy().to_string(),
        Some(home) => format!("{}{}", home.to_string_lossy(), &path[1..]),
        None => path.to_string(),
    }
}
