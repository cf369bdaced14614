//! Per-frame sprite batching
//!
//! `begin` → any number of `add_sprite` → `end`. Sprites are culled against
//! the frustum on submission, bucketed into batches bounded by sprite count
//! and distinct textures, then turned into one shared vertex/index buffer
//! with one indexed draw per batch.
//!
//! Batch, vertex and index storage is kept across frames and only cleared.

use crate::backend::{RenderBackend, TextureHandle};
use crate::batch::frustum::Frustum;
use crate::batch::sprite_batch::{SpriteBatch, SpriteRenderCommand};
use crate::batch::stats::RenderStats;
use crate::error::RenderError;
use crate::vertex::SpriteVertex;
use glam::{Mat4, Vec2, Vec3, Vec4};
use sable_core::math::{scale_of, translation_of};
use std::ops::Range;
use std::time::Instant;
use tracing::{trace, warn};

/// Unit quad, counter-clockwise from bottom-left.
const QUAD_CORNERS: [Vec3; 4] = [
    Vec3::new(-0.5, -0.5, 0.0),
    Vec3::new(0.5, -0.5, 0.0),
    Vec3::new(0.5, 0.5, 0.0),
    Vec3::new(-0.5, 0.5, 0.0),
];

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatcherConfig {
    pub max_sprites_per_batch: usize,
    pub max_textures_per_batch: usize,
    pub frustum_culling: bool,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            max_sprites_per_batch: 1000,
            max_textures_per_batch: 8,
            frustum_culling: true,
        }
    }
}

pub struct SpriteBatcher {
    config: BatcherConfig,
    batches: Vec<SpriteBatch>,
    active_batches: usize,
    vertices: Vec<SpriteVertex>,
    indices: Vec<u32>,
    draw_ranges: Vec<Range<u32>>,
    view_projection: Mat4,
    frustum: Frustum,
    stats: RenderStats,
    frame_start: Option<Instant>,
}

impl SpriteBatcher {
    pub fn new(config: BatcherConfig) -> Self {
        let config = BatcherConfig {
            max_sprites_per_batch: config.max_sprites_per_batch.max(1),
            max_textures_per_batch: config.max_textures_per_batch.max(1),
            ..config
        };
        Self {
            config,
            batches: Vec::with_capacity(10),
            active_batches: 0,
            vertices: Vec::with_capacity(config.max_sprites_per_batch * 4),
            indices: Vec::with_capacity(config.max_sprites_per_batch * 6),
            draw_ranges: Vec::new(),
            view_projection: Mat4::IDENTITY,
            frustum: Frustum::default(),
            stats: RenderStats::default(),
            frame_start: None,
        }
    }

    pub fn config(&self) -> &BatcherConfig {
        &self.config
    }

    pub fn set_frustum_culling(&mut self, enabled: bool) {
        self.config.frustum_culling = enabled;
    }

    pub fn frustum_culling(&self) -> bool {
        self.config.frustum_culling
    }

    pub fn set_frustum(&mut self, frustum: Frustum) {
        self.frustum = frustum;
    }

    pub fn frustum(&self) -> Frustum {
        self.frustum
    }

    /// Start a frame: drop last frame's batches and geometry, zero the stats.
    pub fn begin(&mut self, view_projection: Mat4) {
        if self.frame_start.is_some() {
            warn!("begin called while a frame was open; discarding it");
        }
        for batch in &mut self.batches[..self.active_batches] {
            batch.clear();
        }
        self.active_batches = 0;
        self.vertices.clear();
        self.indices.clear();
        self.draw_ranges.clear();
        self.stats = RenderStats::default();
        self.view_projection = view_projection;
        self.frame_start = Some(Instant::now());
    }

    /// Queue a sprite. Returns false if it was culled (or no frame is open).
    ///
    /// The sprite is a unit quad transformed by `transform`; its world bounds
    /// for culling come from the matrix translation and basis lengths.
    pub fn add_sprite(
        &mut self,
        transform: Mat4,
        color: Vec4,
        texture: TextureHandle,
        uv_min: Vec2,
        uv_max: Vec2,
        layer: i32,
    ) -> bool {
        if self.frame_start.is_none() {
            warn!("add_sprite called outside begin/end; ignored");
            return false;
        }

        if self.config.frustum_culling {
            let position = translation_of(&transform);
            let size = scale_of(&transform).truncate();
            if !self.frustum.intersects(position, size) {
                self.stats.sprites_culled += 1;
                return false;
            }
        }

        let BatcherConfig {
            max_sprites_per_batch,
            max_textures_per_batch,
            ..
        } = self.config;
        let existing = self.batches[..self.active_batches]
            .iter()
            .position(|b| b.can_accept(texture, max_sprites_per_batch, max_textures_per_batch));

        let index = match existing {
            Some(index) => index,
            None => {
                if self.active_batches == self.batches.len() {
                    self.batches.push(SpriteBatch::new());
                }
                self.active_batches += 1;
                self.stats.batches_created += 1;
                self.active_batches - 1
            }
        };

        let batch = &mut self.batches[index];
        let texture_slot = batch.texture_slot(texture);
        batch.push(SpriteRenderCommand {
            transform,
            color,
            uv_min,
            uv_max,
            texture_slot,
            layer,
        });
        self.stats.sprites_rendered += 1;
        true
    }

    /// Close the frame: sort each batch by layer, build geometry, upload it
    /// once and issue one draw per batch.
    pub fn end(&mut self, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        let Some(start) = self.frame_start.take() else {
            warn!("end called without begin; ignored");
            return Ok(());
        };

        if self.active_batches > 0 {
            self.build_geometry();
            backend.upload_geometry(self.view_projection, &self.vertices, &self.indices)?;

            let batches = &self.batches[..self.active_batches];
            for (batch, range) in batches.iter().zip(&self.draw_ranges) {
                backend.draw_indexed(batch.textures(), range.clone())?;
                self.stats.draw_calls += 1;
            }
        }

        self.stats.last_frame_time_ms = start.elapsed().as_secs_f32() * 1000.0;
        trace!(
            draw_calls = self.stats.draw_calls,
            rendered = self.stats.sprites_rendered,
            culled = self.stats.sprites_culled,
            "sprite frame submitted"
        );
        Ok(())
    }

    fn build_geometry(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.draw_ranges.clear();

        for batch in &mut self.batches[..self.active_batches] {
            batch.sort_by_layer();
            let start = self.indices.len() as u32;
            for command in batch.commands() {
                push_quad(&mut self.vertices, &mut self.indices, command);
            }
            self.draw_ranges.push(start..self.indices.len() as u32);
        }
    }

    /// Batches filled this frame, in creation order.
    pub fn batches(&self) -> &[SpriteBatch] {
        &self.batches[..self.active_batches]
    }

    /// Geometry built by the last `end`.
    pub fn vertices(&self) -> &[SpriteVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    pub fn is_in_frame(&self) -> bool {
        self.frame_start.is_some()
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = RenderStats::default();
    }
}

impl Default for SpriteBatcher {
    fn default() -> Self {
        Self::new(BatcherConfig::default())
    }
}

/// Append four vertices and six indices for one command.
///
/// The quad's bottom edge samples `uv_max.y`: atlas rows run top-down, so
/// this keeps images upright.
fn push_quad(vertices: &mut Vec<SpriteVertex>, indices: &mut Vec<u32>, command: &SpriteRenderCommand) {
    let base = vertices.len() as u32;
    let (min, max) = (command.uv_min, command.uv_max);
    let uvs = [
        [min.x, max.y],
        [max.x, max.y],
        [max.x, min.y],
        [min.x, min.y],
    ];
    let color = command.color.to_array();
    let texture_index = command.texture_slot as f32;

    for (corner, uv) in QUAD_CORNERS.iter().zip(uvs) {
        let world = command.transform.transform_point3(*corner);
        vertices.push(SpriteVertex {
            position: world.to_array(),
            uv,
            color,
            texture_index,
        });
    }
    indices.extend(QUAD_INDICES.iter().map(|i| base + i));
}
