//! Viewer configuration
//!
//! Uses RON (Rusty Object Notation) for human-readable config files.
//! Every field has a default, so a config file only needs the values it
//! wants to change.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::rasterizer::{Color, RasterSettings, TextureFilter, Vec3, WrapMode, HEIGHT, WIDTH};

/// Default config location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "assets/viewer.ron";

/// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

/// Settings for the interactive viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Framebuffer resolution (pixels)
    pub width: usize,
    pub height: usize,
    /// Window size as a multiple of the framebuffer
    pub window_scale: u32,
    pub clear_color: Color,
    /// Image to texture the scene with; a checkerboard is used when unset
    pub texture: Option<PathBuf>,
    pub filter: TextureFilter,
    pub wrap: WrapMode,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub target: Vec3,
    /// Cube rotation speed (radians per second)
    pub spin_speed: f32,
    /// Draw a textured ground plane under the cube
    pub ground: bool,
    /// Outline the cube's triangles on top of the shaded image
    pub wireframe: bool,
    pub raster: RasterSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            window_scale: 3,
            clear_color: Color::new(30, 30, 35),
            texture: None,
            filter: TextureFilter::Linear,
            wrap: WrapMode::Repeat,
            fov_y: 60.0,
            near: 0.1,
            far: 100.0,
            eye: Vec3::new(0.0, 2.0, 5.0),
            target: Vec3::ZERO,
            spin_speed: 0.8,
            ground: true,
            wireframe: false,
            raster: RasterSettings::default(),
        }
    }
}

impl ViewerConfig {
    /// Load a config from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    /// Load a config from a RON string
    pub fn from_ron(s: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(s)?)
    }

    /// Save a config to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .indentor("  ".to_string());

        let contents = ron::ser::to_string_pretty(self, config)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    /// A file that exists but fails to parse is logged and ignored.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to load {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::ShadeMode;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = ViewerConfig::from_ron(
            "(width: 64, height: 48, filter: Nearest, raster: (clamp_depth: true))",
        )
        .unwrap();

        assert_eq!(config.width, 64);
        assert_eq!(config.height, 48);
        assert_eq!(config.filter, TextureFilter::Nearest);
        assert!(config.raster.clamp_depth);
        assert_eq!(config.raster.shading, ShadeMode::Texture);
        assert_eq!(config.fov_y, ViewerConfig::default().fov_y);
        assert_eq!(config.texture, None);
        assert!(!config.wireframe);
    }

    #[test]
    fn test_round_trip_through_file() {
        let mut config = ViewerConfig::default();
        config.texture = Some(PathBuf::from("assets/textures/brick.png"));
        config.clear_color = Color::new(1, 2, 3);
        config.raster.shading = ShadeMode::Color;
        config.wireframe = true;

        let path = std::env::temp_dir().join(format!("msaa-raster-config-{}.ron", std::process::id()));
        config.save(&path).unwrap();
        let loaded = ViewerConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = ViewerConfig::from_ron("(width: \"wide\")");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ViewerConfig::load_or_default("does/not/exist.ron");
        assert_eq!(config, ViewerConfig::default());
    }
}
