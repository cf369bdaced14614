//! Rendering backend abstraction
//!
//! The batcher and atlas code only talk to the GPU through [`RenderBackend`]:
//! create a texture (with its full mip chain), upload one frame's geometry,
//! and issue indexed draws with a set of bound textures.

use crate::error::RenderError;
use crate::vertex::SpriteVertex;
use glam::Mat4;
use std::fmt;
use std::ops::Range;

/// Opaque texture id handed out by a backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(u32);

impl TextureHandle {
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "texture #{}", self.0)
    }
}

/// One level of an RGBA8 mip chain, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl MipLevel {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Check that a mip chain is non-empty and every level has RGBA8 size.
pub(crate) fn validate_levels(label: &str, levels: &[MipLevel]) -> Result<(), RenderError> {
    if levels.is_empty() || levels[0].width == 0 || levels[0].height == 0 {
        return Err(RenderError::EmptyTexture {
            label: label.to_string(),
        });
    }
    for (level, mip) in levels.iter().enumerate() {
        if mip.pixels.len() != mip.expected_len() {
            return Err(RenderError::MipLevelSize {
                label: label.to_string(),
                level,
                expected: mip.expected_len(),
                actual: mip.pixels.len(),
            });
        }
    }
    Ok(())
}

pub trait RenderBackend {
    /// Upload an RGBA8 texture. `levels[0]` is the full-size image.
    fn create_texture(&mut self, label: &str, levels: &[MipLevel]) -> Result<TextureHandle, RenderError>;

    fn destroy_texture(&mut self, texture: TextureHandle) -> Result<(), RenderError>;

    /// Size of mip level 0.
    fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)>;

    /// Textures that can be bound to a single draw.
    fn max_textures_per_draw(&self) -> usize;

    /// Replace the frame's vertex and index data and camera matrix.
    fn upload_geometry(
        &mut self,
        view_projection: Mat4,
        vertices: &[SpriteVertex],
        indices: &[u32],
    ) -> Result<(), RenderError>;

    /// Draw `indices` from the last upload with `textures` bound to slots
    /// 0..textures.len().
    fn draw_indexed(&mut self, textures: &[TextureHandle], indices: Range<u32>) -> Result<(), RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_must_match_rgba_size() {
        let ok = [MipLevel::new(2, 2, vec![0; 16]), MipLevel::new(1, 1, vec![0; 4])];
        assert!(validate_levels("ok", &ok).is_ok());

        let short = [MipLevel::new(2, 2, vec![0; 15])];
        assert!(matches!(
            validate_levels("short", &short),
            Err(RenderError::MipLevelSize { level: 0, expected: 16, actual: 15, .. })
        ));

        assert!(matches!(
            validate_levels("empty", &[]),
            Err(RenderError::EmptyTexture { .. })
        ));
    }
}
