//! Sprite rendering facade
//!
//! Owns one [`SpriteBatcher`] behind an explicit init/shutdown lifecycle and
//! adds name-based submission through a [`TextureAtlasManager`]. Every call
//! made before `init` (or after `shutdown`) is logged and ignored.

use crate::atlas::TextureAtlasManager;
use crate::backend::{RenderBackend, TextureHandle};
use crate::batch::{BatcherConfig, Frustum, RenderStats, SpriteBatcher};
use crate::error::RenderError;
use glam::{Mat4, Vec2, Vec4};
use tracing::{info, warn};

pub struct SpriteRenderer {
    config: BatcherConfig,
    batcher: Option<SpriteBatcher>,
}

impl SpriteRenderer {
    pub fn new(config: BatcherConfig) -> Self {
        Self {
            config,
            batcher: None,
        }
    }

    /// Create the batcher. The per-batch texture cap is clamped to what the
    /// backend can bind in one draw. Calling twice is a no-op.
    pub fn init(&mut self, backend: &dyn RenderBackend) {
        if self.batcher.is_some() {
            return;
        }
        let slots = backend.max_textures_per_draw();
        if self.config.max_textures_per_batch > slots {
            warn!(
                requested = self.config.max_textures_per_batch,
                available = slots,
                "clamping textures per batch to backend limit"
            );
            self.config.max_textures_per_batch = slots;
        }
        self.batcher = Some(SpriteBatcher::new(self.config));
        info!(
            max_sprites = self.config.max_sprites_per_batch,
            max_textures = self.config.max_textures_per_batch,
            "sprite renderer initialized"
        );
    }

    pub fn shutdown(&mut self) {
        if self.batcher.take().is_some() {
            info!("sprite renderer shut down");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.batcher.is_some()
    }

    pub fn begin_frame(&mut self, view_projection: Mat4) {
        if let Some(batcher) = self.active("begin_frame") {
            batcher.begin(view_projection);
        }
    }

    pub fn end_frame(&mut self, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        match self.active("end_frame") {
            Some(batcher) => batcher.end(backend),
            None => Ok(()),
        }
    }

    /// Submit an atlas sprite by name. Unknown or not-yet-packed names are
    /// logged and skipped.
    pub fn render_sprite(
        &mut self,
        atlases: &TextureAtlasManager,
        name: &str,
        transform: Mat4,
        color: Vec4,
        layer: i32,
    ) -> bool {
        let Some(batcher) = self.active("render_sprite") else {
            return false;
        };
        let Some(atlas) = atlases.find_atlas_for_sprite(name) else {
            warn!(sprite = name, "sprite not found in any atlas");
            return false;
        };
        let (Some(texture), Some(uv)) = (atlas.texture(), atlas.sprite_uv(name)) else {
            warn!(sprite = name, "sprite UV data not found");
            return false;
        };
        batcher.add_sprite(transform, color, texture, uv.uv_min, uv.uv_max, layer)
    }

    /// Submit a sprite that samples `uv_min..uv_max` of `texture` directly.
    pub fn render_texture(
        &mut self,
        texture: TextureHandle,
        transform: Mat4,
        color: Vec4,
        uv_min: Vec2,
        uv_max: Vec2,
        layer: i32,
    ) -> bool {
        match self.active("render_texture") {
            Some(batcher) => batcher.add_sprite(transform, color, texture, uv_min, uv_max, layer),
            None => false,
        }
    }

    pub fn set_frustum_culling(&mut self, enabled: bool) {
        self.config.frustum_culling = enabled;
        if let Some(batcher) = self.active("set_frustum_culling") {
            batcher.set_frustum_culling(enabled);
        }
    }

    /// Visible rectangle from a camera center, viewport size and zoom.
    pub fn update_frustum(&mut self, camera_position: Vec2, view_size: Vec2, zoom: f32) {
        self.set_frustum(Frustum::from_view(camera_position, view_size, zoom));
    }

    pub fn set_frustum(&mut self, frustum: Frustum) {
        if let Some(batcher) = self.active("set_frustum") {
            batcher.set_frustum(frustum);
        }
    }

    /// Stats of the current or last frame; zeroed before `init`.
    pub fn stats(&self) -> RenderStats {
        self.batcher
            .as_ref()
            .map(|b| *b.stats())
            .unwrap_or_default()
    }

    pub fn reset_stats(&mut self) {
        if let Some(batcher) = self.batcher.as_mut() {
            batcher.reset_stats();
        }
    }

    pub fn batcher(&self) -> Option<&SpriteBatcher> {
        self.batcher.as_ref()
    }

    fn active(&mut self, call: &'static str) -> Option<&mut SpriteBatcher> {
        if self.batcher.is_none() {
            warn!(call, "sprite renderer used before init");
        }
        self.batcher.as_mut()
    }
}

impl Default for SpriteRenderer {
    fn default() -> Self {
        Self::new(BatcherConfig::default())
    }
}
