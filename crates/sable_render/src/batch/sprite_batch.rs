// sprite_batch.rs - Transient per-frame draw records

use crate::backend::TextureHandle;
use glam::{Mat4, Vec2, Vec4};

/// One sprite queued for drawing this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteRenderCommand {
    pub transform: Mat4,
    pub color: Vec4,
    pub uv_min: Vec2,
    pub uv_max: Vec2,
    /// Slot of the sprite's texture within its batch.
    pub texture_slot: u32,
    pub layer: i32,
}

/// Commands sharing a bounded texture set, drawn with one call.
///
/// Texture slots are handed out first-seen-first-assigned and never freed
/// until the batch is cleared.
#[derive(Debug, Default)]
pub struct SpriteBatch {
    textures: Vec<TextureHandle>,
    commands: Vec<SpriteRenderCommand>,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.textures.clear();
        self.commands.clear();
    }

    pub fn slot_of(&self, texture: TextureHandle) -> Option<u32> {
        self.textures
            .iter()
            .position(|t| *t == texture)
            .map(|slot| slot as u32)
    }

    /// True if a sprite using `texture` fits: below the sprite cap, and the
    /// texture is either already bound or a slot is still free.
    pub fn can_accept(&self, texture: TextureHandle, max_sprites: usize, max_textures: usize) -> bool {
        self.commands.len() < max_sprites
            && (self.slot_of(texture).is_some() || self.textures.len() < max_textures)
    }

    /// Slot for `texture`, binding it to the next free slot if new.
    /// Callers check `can_accept` first.
    pub fn texture_slot(&mut self, texture: TextureHandle) -> u32 {
        if let Some(slot) = self.slot_of(texture) {
            return slot;
        }
        self.textures.push(texture);
        (self.textures.len() - 1) as u32
    }

    pub fn push(&mut self, command: SpriteRenderCommand) {
        self.commands.push(command);
    }

    /// Painter's order: lower layers first, ties keep submission order.
    pub fn sort_by_layer(&mut self) {
        self.commands.sort_by_key(|c| c.layer);
    }

    pub fn textures(&self) -> &[TextureHandle] {
        &self.textures
    }

    pub fn commands(&self) -> &[SpriteRenderCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
