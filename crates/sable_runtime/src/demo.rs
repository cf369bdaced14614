//! Procedural demo content
//!
//! Sprites are generated in memory so the demo and benchmark run without any
//! asset files on disk.

use glam::{Vec2, Vec3, Vec4};
use sable_core::ecs::{EcsError, Entity, World};
use sable_core::math::DeterministicRng;
use sable_render::{AtlasError, SpriteRenderSystem, TextureAtlasManager};

pub const DEMO_ATLAS: &str = "demo";
pub const DEMO_SPRITES: [&str; 4] = ["disc", "checker", "diamond", "frame"];

/// RGBA8 pixels of a `size` x `size` demo sprite, or `None` for unknown names.
pub fn sprite_pixels(name: &str, size: u32) -> Option<Vec<u8>> {
    let shade: fn(u32, u32, u32) -> [u8; 4] = match name {
        "disc" => disc,
        "checker" => checker,
        "diamond" => diamond,
        "frame" => frame,
        _ => return None,
    };
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            pixels.extend_from_slice(&shade(x, y, size));
        }
    }
    Some(pixels)
}

fn disc(x: u32, y: u32, size: u32) -> [u8; 4] {
    let half = size as f32 / 2.0;
    let d = Vec2::new(x as f32 + 0.5 - half, y as f32 + 0.5 - half).length() / half;
    if d > 1.0 {
        return [0; 4];
    }
    let glow = (255.0 * (1.0 - d * 0.6)) as u8;
    [glow, glow / 2, 40, 255]
}

fn checker(x: u32, y: u32, size: u32) -> [u8; 4] {
    let cell = (size / 4).max(1);
    if (x / cell + y / cell) % 2 == 0 {
        [230, 230, 230, 255]
    } else {
        [40, 90, 200, 255]
    }
}

fn diamond(x: u32, y: u32, size: u32) -> [u8; 4] {
    let half = size as i64 / 2;
    let manhattan = (x as i64 - half).abs() + (y as i64 - half).abs();
    if manhattan > half {
        [0; 4]
    } else {
        [60, 220, 120, 255]
    }
}

fn frame(x: u32, y: u32, size: u32) -> [u8; 4] {
    let border = (size / 8).max(1);
    let edge = x < border || y < border || x >= size - border || y >= size - border;
    if edge {
        [250, 200, 60, 255]
    } else {
        [250, 200, 60, 64]
    }
}

/// Add every demo sprite to `atlas_name`, creating the atlas if needed.
pub fn register_demo_sprites(
    atlases: &mut TextureAtlasManager,
    atlas_name: &str,
    atlas_size: u32,
    sprite_size: u32,
) -> Result<(), AtlasError> {
    if atlases.atlas(atlas_name).is_none() {
        atlases.create_atlas(atlas_name, atlas_size, atlas_size)?;
    }
    for name in DEMO_SPRITES {
        if let Some(pixels) = sprite_pixels(name, sprite_size) {
            atlases.add_sprite_to_atlas(atlas_name, name, &pixels, sprite_size, sprite_size, 4)?;
        }
    }
    Ok(())
}

/// Layout and look of a randomly scattered sprite field.
#[derive(Debug, Clone, Copy)]
pub struct FieldParams {
    pub count: usize,
    pub world_size: f32,
    pub sprite_scale: f32,
    pub max_layer: i32,
}

/// Scatter `params.count` sprites over a square centered on the origin.
///
/// Tints are drawn from `[0.5, 1]` per channel, layers from `0..=max_layer`.
pub fn spawn_sprite_field(
    world: &mut World,
    rng: &mut DeterministicRng,
    sprite_names: &[&str],
    atlas_name: &str,
    params: FieldParams,
) -> Result<Vec<Entity>, EcsError> {
    let half = params.world_size / 2.0;
    let mut entities = Vec::with_capacity(params.count);
    if sprite_names.is_empty() {
        return Ok(entities);
    }

    for _ in 0..params.count {
        let position = Vec3::new(rng.range_f32(-half, half), rng.range_f32(-half, half), 0.0);
        let color = Vec4::new(
            rng.range_f32(0.5, 1.0),
            rng.range_f32(0.5, 1.0),
            rng.range_f32(0.5, 1.0),
            1.0,
        );
        let layer = rng.index(params.max_layer.max(0) as usize + 1) as i32;
        let name = sprite_names[rng.index(sprite_names.len())];

        let entity = SpriteRenderSystem::spawn_sprite(
            world,
            name,
            atlas_name,
            position,
            Vec2::splat(params.sprite_scale),
            color,
            layer,
        )?;
        entities.push(entity);
    }
    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sable_render::HeadlessBackend;

    #[test]
    fn demo_sprites_pack_into_one_atlas() {
        let mut atlases = TextureAtlasManager::new();
        register_demo_sprites(&mut atlases, DEMO_ATLAS, 128, 32).unwrap();

        let mut backend = HeadlessBackend::new();
        assert!(atlases.generate_all_atlases(&mut backend).all_succeeded());
        for name in DEMO_SPRITES {
            assert!(atlases.resolve(name).is_some(), "{name} missing");
        }
        assert!(sprite_pixels("unknown", 8).is_none());
    }

    #[test]
    fn sprite_field_is_reproducible() {
        let params = FieldParams {
            count: 50,
            world_size: 10.0,
            sprite_scale: 1.0,
            max_layer: 5,
        };
        let positions = |seed| {
            let mut world = World::new();
            let mut rng = DeterministicRng::new(seed);
            let entities = spawn_sprite_field(&mut world, &mut rng, &DEMO_SPRITES, DEMO_ATLAS, params).unwrap();
            entities
                .iter()
                .map(|&e| world.get_component::<sable_render::Transform2D>(e).unwrap().position)
                .collect::<Vec<_>>()
        };

        let first = positions(7);
        assert_eq!(first.len(), 50);
        assert_eq!(first, positions(7));
        assert!(first.iter().all(|p| p.x.abs() <= 5.0 && p.y.abs() <= 5.0));
    }
}
