// manager.rs - Named atlases and the sprite -> atlas index

use crate::atlas::texture_atlas::{SpriteUv, TextureAtlas};
use crate::backend::{RenderBackend, TextureHandle};
use crate::error::AtlasError;
use std::collections::HashMap;
use std::path::Path;
use tracing::{error, warn};

/// Outcome of [`TextureAtlasManager::generate_all_atlases`], per atlas.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub generated: Vec<String>,
    pub failed: Vec<(String, AtlasError)>,
}

impl GenerationReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Registry of atlases. Sprite names are unique across every atlas it owns.
#[derive(Default)]
pub struct TextureAtlasManager {
    atlases: HashMap<String, TextureAtlas>,
    sprite_owner: HashMap<String, String>,
}

impl TextureAtlasManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_atlas(&mut self, name: &str, width: u32, height: u32) -> Result<&mut TextureAtlas, AtlasError> {
        if self.atlases.contains_key(name) {
            return Err(AtlasError::DuplicateAtlas(name.to_string()));
        }
        let atlas = TextureAtlas::new(width, height)?;
        Ok(self.atlases.entry(name.to_string()).or_insert(atlas))
    }

    pub fn atlas(&self, name: &str) -> Option<&TextureAtlas> {
        self.atlases.get(name)
    }

    pub fn atlas_mut(&mut self, name: &str) -> Option<&mut TextureAtlas> {
        self.atlases.get_mut(name)
    }

    /// Atlas names, sorted.
    pub fn atlas_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.atlases.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Decode `path` into the named atlas and index the sprite.
    pub fn load_sprite_to_atlas(
        &mut self,
        atlas_name: &str,
        sprite: &str,
        path: impl AsRef<Path>,
    ) -> Result<(), AtlasError> {
        let atlas = self.claim(atlas_name, sprite)?;
        atlas.add_sprite_from_file(sprite, path)?;
        self.sprite_owner
            .insert(sprite.to_string(), atlas_name.to_string());
        Ok(())
    }

    /// Buffer in-memory pixels into the named atlas and index the sprite.
    pub fn add_sprite_to_atlas(
        &mut self,
        atlas_name: &str,
        sprite: &str,
        data: &[u8],
        width: u32,
        height: u32,
        channels: u32,
    ) -> Result<(), AtlasError> {
        let atlas = self.claim(atlas_name, sprite)?;
        atlas.add_sprite(sprite, data, width, height, channels)?;
        self.sprite_owner
            .insert(sprite.to_string(), atlas_name.to_string());
        Ok(())
    }

    fn claim(&mut self, atlas_name: &str, sprite: &str) -> Result<&mut TextureAtlas, AtlasError> {
        if let Some(owner) = self.sprite_owner.get(sprite) {
            if owner != atlas_name {
                error!(sprite, owner = %owner, atlas = atlas_name, "sprite name already used by another atlas");
                return Err(AtlasError::SpriteOwnedElsewhere {
                    sprite: sprite.to_string(),
                    owner: owner.clone(),
                });
            }
        }
        self.atlases.get_mut(atlas_name).ok_or_else(|| {
            error!(atlas = atlas_name, "atlas not found");
            AtlasError::UnknownAtlas(atlas_name.to_string())
        })
    }

    pub fn find_atlas_for_sprite(&self, sprite: &str) -> Option<&TextureAtlas> {
        self.sprite_owner
            .get(sprite)
            .and_then(|owner| self.atlases.get(owner))
    }

    /// Texture and UV rectangle for a sprite in a generated atlas.
    pub fn resolve(&self, sprite: &str) -> Option<(TextureHandle, SpriteUv)> {
        let atlas = self.find_atlas_for_sprite(sprite)?;
        Some((atlas.texture()?, *atlas.sprite_uv(sprite)?))
    }

    /// Generate every atlas independently, in name order. A failure is
    /// logged and recorded; it does not stop the remaining atlases.
    pub fn generate_all_atlases(&mut self, backend: &mut dyn RenderBackend) -> GenerationReport {
        let mut names: Vec<String> = self.atlases.keys().cloned().collect();
        names.sort_unstable();

        let mut report = GenerationReport::default();
        for name in names {
            let Some(atlas) = self.atlases.get_mut(&name) else {
                continue;
            };
            match atlas.generate(backend) {
                Ok(()) => report.generated.push(name),
                Err(err) => {
                    warn!(atlas = %name, error = %err, "atlas generation failed");
                    report.failed.push((name, err));
                }
            }
        }
        report
    }
}
