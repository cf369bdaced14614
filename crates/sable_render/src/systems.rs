//! Camera and sprite render systems
//!
//! [`CameraSystem2D`] is a regular ECS system. [`SpriteRenderSystem`] needs
//! the renderer, atlases and backend as well as the world, so it is driven
//! explicitly once per frame after the systems have updated.

use crate::atlas::TextureAtlasManager;
use crate::backend::RenderBackend;
use crate::components::{Camera2D, Sprite, Transform2D};
use crate::error::SystemError;
use crate::sprite_renderer::SpriteRenderer;
use glam::{Vec2, Vec3, Vec4};
use sable_core::ecs::{EcsError, Entity, Signature, System, World};
use sable_core::{signature, spawn};
use tracing::{trace, warn};

pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 15.0;

/// Keeps camera matrices current and applies mouse-wheel zoom.
pub struct CameraSystem2D {
    signature: Signature,
    pending_scroll: Vec<f32>,
}

impl CameraSystem2D {
    pub fn new() -> Self {
        Self {
            signature: signature![Camera2D],
            pending_scroll: Vec::new(),
        }
    }

    /// Queue a wheel event. Positive offsets zoom in by 10%, negative
    /// offsets zoom out by 10%; zero is ignored.
    pub fn on_scroll(&mut self, offset_y: f32) {
        if offset_y != 0.0 {
            self.pending_scroll.push(offset_y);
        }
    }

    fn apply_scroll(zoom: f32, offset_y: f32) -> f32 {
        let factor = if offset_y > 0.0 { 1.1 } else { 0.9 };
        (zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM)
    }
}

impl Default for CameraSystem2D {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CameraSystem2D {
    fn name(&self) -> &str {
        "camera_2d"
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn update(&mut self, _dt: f32, world: &mut World) -> Result<(), EcsError> {
        let cameras = world.entities_by_signature(&self.signature).to_vec();
        for entity in cameras {
            let camera = world.get_component_mut::<Camera2D>(entity)?;
            for offset in &self.pending_scroll {
                camera.zoom = Self::apply_scroll(camera.zoom, *offset);
            }
            camera.update_matrices();
        }
        self.pending_scroll.clear();
        Ok(())
    }
}

/// Submits every `Transform2D + Sprite` entity to the sprite renderer.
pub struct SpriteRenderSystem {
    signature: Signature,
    camera: Entity,
    frustum_culling: bool,
}

impl SpriteRenderSystem {
    pub fn new(camera: Entity) -> Self {
        Self {
            signature: signature![Transform2D, Sprite],
            camera,
            frustum_culling: true,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn camera(&self) -> Entity {
        self.camera
    }

    pub fn set_camera(&mut self, camera: Entity) {
        self.camera = camera;
    }

    pub fn set_frustum_culling(&mut self, enabled: bool) {
        self.frustum_culling = enabled;
    }

    pub fn toggle_frustum_culling(&mut self) -> bool {
        self.frustum_culling = !self.frustum_culling;
        self.frustum_culling
    }

    /// Render one frame of sprites through the camera.
    ///
    /// Atlas sprites resolve by name; texture sprites use their region with
    /// flips applied. Sprites with neither are skipped.
    pub fn render(
        &self,
        world: &World,
        renderer: &mut SpriteRenderer,
        atlases: &TextureAtlasManager,
        backend: &mut dyn RenderBackend,
    ) -> Result<(), SystemError> {
        let camera = world.get_component::<Camera2D>(self.camera)?;

        renderer.set_frustum_culling(self.frustum_culling);
        if self.frustum_culling {
            renderer.set_frustum(camera.visible_bounds());
        }

        renderer.begin_frame(camera.view_projection());
        for &entity in world.entities_by_signature(&self.signature) {
            // components removed after spawn leave the entity in this bucket
            let (sprite, transform) = match (
                world.get_component::<Sprite>(entity),
                world.get_component::<Transform2D>(entity),
            ) {
                (Ok(sprite), Ok(transform)) => (sprite, transform),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(%entity, error = %e, "skipping incomplete sprite entity");
                    continue;
                }
            };
            let model = transform.matrix();

            if sprite.is_atlas_sprite() {
                renderer.render_sprite(atlases, &sprite.sprite_name, model, sprite.color, sprite.layer);
            } else if let Some(texture) = sprite.texture {
                let (uv_min, uv_max) = sprite.uv_rect();
                renderer.render_texture(texture, model, sprite.color, uv_min, uv_max, sprite.layer);
            } else {
                trace!(%entity, "sprite has no atlas entry or texture");
            }
        }
        renderer.end_frame(backend)?;
        Ok(())
    }

    /// Spawn an atlas sprite with the renderable signature.
    pub fn spawn_sprite(
        world: &mut World,
        sprite_name: &str,
        atlas_name: &str,
        position: Vec3,
        scale: Vec2,
        color: Vec4,
        layer: i32,
    ) -> Result<Entity, EcsError> {
        spawn!(
            *world,
            Transform2D::new(position, 0.0, scale),
            Sprite::from_atlas(sprite_name, atlas_name, color, layer),
        )
    }

    /// Spawn a camera entity with its own signature.
    pub fn spawn_camera(world: &mut World, camera: Camera2D) -> Result<Entity, EcsError> {
        spawn!(*world, camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MipLevel;
    use crate::headless::HeadlessBackend;
    use sable_core::ecs::SystemManager;

    #[test]
    fn scroll_zoom_is_clamped() {
        let mut world = World::new();
        let cam = SpriteRenderSystem::spawn_camera(&mut world, Camera2D::default()).unwrap();
        let mut systems = SystemManager::new();
        systems.register(CameraSystem2D::new()).unwrap();

        systems.system_mut::<CameraSystem2D>().unwrap().on_scroll(1.0);
        systems.update_systems(0.016, &mut world).unwrap();
        assert!((world.get_component::<Camera2D>(cam).unwrap().zoom - 1.1).abs() < 1e-6);

        for _ in 0..100 {
            systems.system_mut::<CameraSystem2D>().unwrap().on_scroll(-1.0);
        }
        systems.update_systems(0.016, &mut world).unwrap();
        assert_eq!(world.get_component::<Camera2D>(cam).unwrap().zoom, MIN_ZOOM);

        for _ in 0..100 {
            systems.system_mut::<CameraSystem2D>().unwrap().on_scroll(2.0);
        }
        systems.update_systems(0.016, &mut world).unwrap();
        assert_eq!(world.get_component::<Camera2D>(cam).unwrap().zoom, MAX_ZOOM);
    }

    #[test]
    fn camera_update_refreshes_matrices() {
        let mut world = World::new();
        let cam = SpriteRenderSystem::spawn_camera(&mut world, Camera2D::default()).unwrap();
        world.get_component_mut::<Camera2D>(cam).unwrap().position = Vec2::new(5.0, 0.0);

        let mut system = CameraSystem2D::new();
        system.update(0.0, &mut world).unwrap();

        let camera = world.get_component::<Camera2D>(cam).unwrap();
        let origin = camera.view.transform_point3(Vec3::new(5.0, 0.0, 0.0));
        assert!(origin.length() < 1e-6);
    }

    #[test]
    fn render_submits_atlas_and_texture_sprites() {
        let mut backend = HeadlessBackend::new();
        let mut atlases = TextureAtlasManager::new();
        atlases.create_atlas("main", 32, 32).unwrap();
        atlases
            .add_sprite_to_atlas("main", "tile", &[200; 4 * 4 * 4], 4, 4, 4)
            .unwrap();
        atlases.generate_all_atlases(&mut backend);
        let loose = backend
            .create_texture("loose", &[MipLevel::new(1, 1, vec![255; 4])])
            .unwrap();

        let mut world = World::new();
        let cam = SpriteRenderSystem::spawn_camera(&mut world, Camera2D::new(Vec2::ZERO, 1.0, 1.0)).unwrap();
        SpriteRenderSystem::spawn_sprite(&mut world, "tile", "main", Vec3::ZERO, Vec2::splat(0.2), Vec4::ONE, 0)
            .unwrap();
        spawn!(
            world,
            Transform2D::from_position(Vec3::new(0.5, 0.0, 0.0)),
            Sprite::from_texture(loose, Vec4::ONE).with_flip(false, true),
        )
        .unwrap();
        // far outside the unit view
        SpriteRenderSystem::spawn_sprite(&mut world, "tile", "main", Vec3::new(50.0, 0.0, 0.0), Vec2::ONE, Vec4::ONE, 0)
            .unwrap();

        let mut renderer = SpriteRenderer::default();
        renderer.init(&backend);
        let system = SpriteRenderSystem::new(cam);
        system.render(&world, &mut renderer, &atlases, &mut backend).unwrap();

        let stats = renderer.stats();
        assert_eq!(stats.sprites_rendered, 2);
        assert_eq!(stats.sprites_culled, 1);
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(backend.draws()[0].textures.len(), 2);

        // flipped texture sprite: bottom-left vertex samples v = 0
        assert_eq!(backend.vertices()[4].uv, [0.0, 0.0]);
    }

    #[test]
    fn incomplete_sprite_entities_are_skipped() {
        let mut backend = HeadlessBackend::new();
        let loose = backend
            .create_texture("loose", &[MipLevel::new(1, 1, vec![255; 4])])
            .unwrap();

        let mut world = World::new();
        let cam = SpriteRenderSystem::spawn_camera(&mut world, Camera2D::new(Vec2::ZERO, 1.0, 1.0)).unwrap();
        let kept = spawn!(
            world,
            Transform2D::from_position(Vec3::ZERO),
            Sprite::from_texture(loose, Vec4::ONE),
        )
        .unwrap();
        let stripped = spawn!(
            world,
            Transform2D::from_position(Vec3::ZERO),
            Sprite::from_texture(loose, Vec4::ONE),
        )
        .unwrap();
        world.remove_component::<Sprite>(stripped).unwrap();
        assert!(world.has_component::<Sprite>(kept));

        let mut renderer = SpriteRenderer::default();
        renderer.init(&backend);
        let system = SpriteRenderSystem::new(cam);
        system
            .render(&world, &mut renderer, &TextureAtlasManager::new(), &mut backend)
            .unwrap();

        assert!(!renderer.batcher().unwrap().is_in_frame());
        assert_eq!(renderer.stats().sprites_rendered, 1);
        assert_eq!(backend.draws().len(), 1);
    }

    #[test]
    fn missing_camera_is_an_error() {
        let mut backend = HeadlessBackend::new();
        let world = World::new();
        let mut renderer = SpriteRenderer::default();
        renderer.init(&backend);

        let system = SpriteRenderSystem::new(Entity::from_raw(0));
        let err = system
            .render(&world, &mut renderer, &TextureAtlasManager::new(), &mut backend)
            .unwrap_err();
        assert!(matches!(err, SystemError::Ecs(EcsError::MissingPool { .. })));
    }
}
