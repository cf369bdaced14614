//! Recording backend with no GPU
//!
//! Keeps every texture's pixels on the CPU and logs each geometry upload and
//! draw, so packing, batching and culling can be asserted on directly.

use crate::backend::{validate_levels, MipLevel, RenderBackend, TextureHandle};
use crate::error::RenderError;
use crate::vertex::SpriteVertex;
use glam::{Mat4, Vec2};
use std::collections::HashMap;
use std::ops::Range;
use tracing::trace;

/// A texture as the headless backend stores it.
#[derive(Debug, Clone)]
pub struct RecordedTexture {
    pub label: String,
    pub levels: Vec<MipLevel>,
}

/// One `draw_indexed` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDraw {
    pub textures: Vec<TextureHandle>,
    pub indices: Range<u32>,
}

pub struct HeadlessBackend {
    next_id: u32,
    max_textures: usize,
    textures: HashMap<TextureHandle, RecordedTexture>,
    view_projection: Mat4,
    vertices: Vec<SpriteVertex>,
    indices: Vec<u32>,
    draws: Vec<RecordedDraw>,
    uploads: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::with_texture_slots(8)
    }

    pub fn with_texture_slots(max_textures: usize) -> Self {
        Self {
            next_id: 1,
            max_textures,
            textures: HashMap::new(),
            view_projection: Mat4::IDENTITY,
            vertices: Vec::new(),
            indices: Vec::new(),
            draws: Vec::new(),
            uploads: 0,
        }
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&RecordedTexture> {
        self.textures.get(&handle)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// RGBA of level-0 pixel `(x, y)`, row 0 at the top.
    pub fn pixel(&self, handle: TextureHandle, x: u32, y: u32) -> Option<[u8; 4]> {
        let level = self.textures.get(&handle)?.levels.first()?;
        if x >= level.width || y >= level.height {
            return None;
        }
        let i = (y as usize * level.width as usize + x as usize) * 4;
        level.pixels.get(i..i + 4)?.try_into().ok()
    }

    /// Nearest-neighbour sample of level 0 at `uv` (v grows downward).
    pub fn sample(&self, handle: TextureHandle, uv: Vec2) -> Option<[u8; 4]> {
        let level = self.textures.get(&handle)?.levels.first()?;
        let x = (uv.x * level.width as f32).floor().clamp(0.0, (level.width - 1) as f32);
        let y = (uv.y * level.height as f32).floor().clamp(0.0, (level.height - 1) as f32);
        self.pixel(handle, x as u32, y as u32)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    /// Vertices of the most recent upload.
    pub fn vertices(&self) -> &[SpriteVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Draws issued since the last [`HeadlessBackend::clear_draws`].
    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    pub fn clear_draws(&mut self) {
        self.draws.clear();
    }

    pub fn upload_count(&self) -> usize {
        self.uploads
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_texture(&mut self, label: &str, levels: &[MipLevel]) -> Result<TextureHandle, RenderError> {
        validate_levels(label, levels)?;
        let handle = TextureHandle::from_raw(self.next_id);
        self.next_id += 1;
        trace!(%handle, label, levels = levels.len(), "headless texture created");
        self.textures.insert(
            handle,
            RecordedTexture {
                label: label.to_string(),
                levels: levels.to_vec(),
            },
        );
        Ok(handle)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) -> Result<(), RenderError> {
        self.textures
            .remove(&texture)
            .map(|_| ())
            .ok_or(RenderError::UnknownTexture(texture))
    }

    fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)> {
        self.textures
            .get(&texture)
            .and_then(|t| t.levels.first())
            .map(|level| (level.width, level.height))
    }

    fn max_textures_per_draw(&self) -> usize {
        self.max_textures
    }

    fn upload_geometry(
        &mut self,
        view_projection: Mat4,
        vertices: &[SpriteVertex],
        indices: &[u32],
    ) -> Result<(), RenderError> {
        self.view_projection = view_projection;
        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);
        self.indices.clear();
        self.indices.extend_from_slice(indices);
        self.uploads += 1;
        Ok(())
    }

    fn draw_indexed(&mut self, textures: &[TextureHandle], indices: Range<u32>) -> Result<(), RenderError> {
        if textures.len() > self.max_textures {
            return Err(RenderError::TooManyTextures {
                count: textures.len(),
                max: self.max_textures,
            });
        }
        if let Some(missing) = textures.iter().find(|t| !self.textures.contains_key(t)) {
            return Err(RenderError::UnknownTexture(*missing));
        }
        if indices.start > indices.end || indices.end as usize > self.indices.len() {
            return Err(RenderError::IndexRange {
                start: indices.start,
                end: indices.end,
                uploaded: self.indices.len(),
            });
        }
        self.draws.push(RecordedDraw {
            textures: textures.to_vec(),
            indices,
        });
        Ok(())
    }
}
