//! Settings management
//!
//! Every section is `#[serde(default)]`, so a settings file only needs the
//! keys it wants to override.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub renderer: RendererSettings,
    pub atlas: AtlasSettings,
    pub benchmark: BenchmarkSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Sable Sprite Demo".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    pub max_sprites_per_batch: usize,
    pub max_textures_per_batch: usize,
    pub frustum_culling: bool,
    /// Linear RGBA.
    pub clear_color: [f32; 4],
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            max_sprites_per_batch: 1000,
            max_textures_per_batch: 8,
            frustum_culling: true,
            clear_color: [0.1, 0.1, 0.12, 1.0],
        }
    }
}

/// One image file to pack into a named atlas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSource {
    pub atlas: String,
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasSettings {
    pub width: u32,
    pub height: u32,
    pub sprites: Vec<SpriteSource>,
}

impl Default for AtlasSettings {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            sprites: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkSettings {
    pub sprite_count: usize,
    pub frame_count: usize,
    /// Side length of the square world sprites are scattered in.
    pub world_size: f32,
    pub sprite_scale: f32,
    pub camera_zoom: f32,
    pub moving_camera: bool,
    /// World units per second; the camera drifts diagonally at half speed in y.
    pub camera_speed: f32,
    pub seed: u64,
    pub output_path: Option<PathBuf>,
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        Self {
            sprite_count: 1000,
            frame_count: 600,
            world_size: 100.0,
            sprite_scale: 1.0,
            camera_zoom: 0.1,
            moving_camera: true,
            camera_speed: 5.0,
            seed: 0x5AB1E,
            output_path: None,
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(?path, "settings file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let settings = serde_json::from_str(&text).map_err(|source| SettingsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        info!(?path, "settings loaded");
        Ok(settings)
    }

    /// Write pretty-printed JSON, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.renderer.max_sprites_per_batch, 1000);
        assert_eq!(settings.atlas.width, 1024);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "renderer": { "frustum_culling": false }, "window": { "width": 800 } }"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!(!settings.renderer.frustum_culling);
        assert_eq!(settings.renderer.max_textures_per_batch, 8);
        assert_eq!(settings.window.width, 800);
        assert_eq!(settings.window.height, 720);
    }

    #[test]
    fn save_then_load_preserves_sprite_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings::default();
        settings.atlas.sprites.push(SpriteSource {
            atlas: "ui".into(),
            name: "button".into(),
            path: "assets/button.png".into(),
        });
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Settings::load(&path), Err(SettingsError::Json { .. })));
    }
}
