//! Application object
//!
//! Owns the world, systems, atlas registry and sprite renderer. The backend
//! is passed in per call so the same application drives both the headless
//! and the windowed loop.

use crate::demo::{self, FieldParams};
use anyhow::Result;
use glam::{Vec2, Vec3, Vec4};
use sable_core::ecs::{Entity, SystemManager, World};
use sable_core::math::DeterministicRng;
use sable_metrics::{FrameStats, FrameTimer};
use sable_render::{
    BatcherConfig, Camera2D, CameraSystem2D, RenderBackend, RenderStats, SpriteRenderSystem, SpriteRenderer,
    TextureAtlasManager,
};
use sable_services::Settings;
use std::time::Duration;
use tracing::{info, warn};

const DEMO_SPRITE_COUNT: usize = 500;
const DEMO_WORLD_SIZE: f32 = 100.0;
const DEMO_ZOOM: f32 = 0.1;
const DEMO_ATLAS_SIZE: u32 = 256;

pub fn batcher_config(settings: &Settings) -> BatcherConfig {
    BatcherConfig {
        max_sprites_per_batch: settings.renderer.max_sprites_per_batch,
        max_textures_per_batch: settings.renderer.max_textures_per_batch,
        frustum_culling: settings.renderer.frustum_culling,
    }
}

pub struct Application {
    settings: Settings,
    world: World,
    systems: SystemManager,
    atlases: TextureAtlasManager,
    renderer: SpriteRenderer,
    sprite_system: Option<SpriteRenderSystem>,
    frame_timer: FrameTimer,
}

impl Application {
    pub fn new(settings: Settings) -> Self {
        let renderer = SpriteRenderer::new(batcher_config(&settings));
        Self {
            settings,
            world: World::new(),
            systems: SystemManager::new(),
            atlases: TextureAtlasManager::new(),
            renderer,
            sprite_system: None,
            frame_timer: FrameTimer::new(120),
        }
    }

    /// Build atlases, the camera and the demo scene.
    pub fn init(&mut self, backend: &mut dyn RenderBackend, aspect_ratio: f32) -> Result<()> {
        let file_sprites = self.load_atlases(backend)?;
        self.renderer.init(backend);

        let camera = SpriteRenderSystem::spawn_camera(
            &mut self.world,
            Camera2D::new(Vec2::ZERO, DEMO_ZOOM, aspect_ratio),
        )?;
        self.systems.register(CameraSystem2D::new())?;

        let mut rng = DeterministicRng::new(self.settings.benchmark.seed);
        demo::spawn_sprite_field(
            &mut self.world,
            &mut rng,
            &demo::DEMO_SPRITES,
            demo::DEMO_ATLAS,
            FieldParams {
                count: DEMO_SPRITE_COUNT,
                world_size: DEMO_WORLD_SIZE,
                sprite_scale: 2.0,
                max_layer: 3,
            },
        )?;
        // sprites loaded from disk sit in a row above the origin
        for (i, (atlas, name)) in file_sprites.iter().enumerate() {
            let position = Vec3::new(i as f32 * 4.0, 4.0, 0.0);
            SpriteRenderSystem::spawn_sprite(
                &mut self.world,
                name,
                atlas,
                position,
                Vec2::splat(3.0),
                Vec4::ONE,
                10,
            )?;
        }

        let mut sprites = SpriteRenderSystem::new(camera);
        sprites.set_frustum_culling(self.settings.renderer.frustum_culling);
        self.sprite_system = Some(sprites);

        info!(entities = self.world.entity_count(), "scene ready");
        Ok(())
    }

    /// Register demo sprites and configured files, then generate every
    /// atlas. Returns the `(atlas, sprite)` pairs loaded from files.
    fn load_atlases(&mut self, backend: &mut dyn RenderBackend) -> Result<Vec<(String, String)>> {
        let atlas = &self.settings.atlas;
        demo::register_demo_sprites(&mut self.atlases, demo::DEMO_ATLAS, DEMO_ATLAS_SIZE, 64)?;

        let mut loaded = Vec::new();
        for source in &atlas.sprites {
            if self.atlases.atlas(&source.atlas).is_none() {
                if let Err(e) = self.atlases.create_atlas(&source.atlas, atlas.width, atlas.height) {
                    warn!(atlas = %source.atlas, error = %e, "cannot create atlas");
                    continue;
                }
            }
            match self
                .atlases
                .load_sprite_to_atlas(&source.atlas, &source.name, &source.path)
            {
                Ok(()) => loaded.push((source.atlas.clone(), source.name.clone())),
                Err(e) => warn!(sprite = %source.name, error = %e, "skipping sprite"),
            }
        }

        let report = self.atlases.generate_all_atlases(backend);
        for (name, err) in &report.failed {
            warn!(atlas = %name, error = %err, "atlas unavailable");
        }
        loaded.retain(|(_, sprite)| self.atlases.resolve(sprite).is_some());
        Ok(loaded)
    }

    /// Update systems and submit one frame of sprites to `backend`.
    pub fn frame(&mut self, dt: f32, backend: &mut dyn RenderBackend) -> Result<Duration> {
        self.frame_timer.begin();
        self.systems.update_systems(dt, &mut self.world)?;
        if let Some(sprites) = &self.sprite_system {
            sprites.render(&self.world, &mut self.renderer, &self.atlases, backend)?;
        }
        Ok(self.frame_timer.end())
    }

    pub fn on_scroll(&mut self, offset_y: f32) {
        if let Some(cameras) = self.systems.system_mut::<CameraSystem2D>() {
            cameras.on_scroll(offset_y);
        }
    }

    /// Move the camera by `delta` view-space units, scaled by zoom.
    pub fn pan_camera(&mut self, delta: Vec2) -> Result<()> {
        if let Some(camera) = self.camera_entity() {
            let cam = self.world.get_component_mut::<Camera2D>(camera)?;
            cam.position += delta / cam.zoom;
        }
        Ok(())
    }

    pub fn resize(&mut self, aspect_ratio: f32) -> Result<()> {
        if let Some(camera) = self.camera_entity() {
            self.world.get_component_mut::<Camera2D>(camera)?.aspect_ratio = aspect_ratio;
        }
        Ok(())
    }

    pub fn toggle_frustum_culling(&mut self) -> bool {
        let enabled = self
            .sprite_system
            .as_mut()
            .map(SpriteRenderSystem::toggle_frustum_culling)
            .unwrap_or(false);
        info!(enabled, "frustum culling toggled");
        enabled
    }

    pub fn camera_entity(&self) -> Option<Entity> {
        self.sprite_system.as_ref().map(SpriteRenderSystem::camera)
    }

    pub fn stats(&self) -> RenderStats {
        self.renderer.stats()
    }

    /// Frame timing over the last 120 frames.
    pub fn frame_stats(&self) -> FrameStats {
        self.frame_timer.stats()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn atlases(&self) -> &TextureAtlasManager {
        &self.atlases
    }

    /// Entities in the renderable sprite bucket.
    pub fn sprite_count(&self) -> usize {
        self.sprite_system
            .as_ref()
            .map(|s| self.world.entities_by_signature(s.signature()).len())
            .unwrap_or(0)
    }

    /// Release GPU resources. The application can be dropped afterwards.
    pub fn shutdown(&mut self, backend: &mut dyn RenderBackend) {
        self.renderer.shutdown();
        for name in self.atlases.atlas_names() {
            let texture = self.atlases.atlas(name).and_then(|a| a.texture());
            if let Some(texture) = texture {
                if let Err(e) = backend.destroy_texture(texture) {
                    warn!(atlas = name, error = %e, "failed to release atlas texture");
                }
            }
        }
        info!("application shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sable_render::HeadlessBackend;
    use sable_services::SpriteSource;

    #[test]
    fn headless_frames_render_the_demo_scene() {
        let mut backend = HeadlessBackend::new();
        let mut app = Application::new(Settings::default());
        app.init(&mut backend, 16.0 / 9.0).unwrap();
        assert_eq!(app.sprite_count(), DEMO_SPRITE_COUNT);

        app.frame(1.0 / 60.0, &mut backend).unwrap();
        let stats = app.stats();
        assert_eq!(
            (stats.sprites_rendered + stats.sprites_culled) as usize,
            DEMO_SPRITE_COUNT
        );
        assert!(stats.draw_calls >= 1);

        let culling = app.toggle_frustum_culling();
        assert!(!culling);
        app.frame(1.0 / 60.0, &mut backend).unwrap();
        assert_eq!(app.stats().sprites_rendered as usize, DEMO_SPRITE_COUNT);

        app.shutdown(&mut backend);
        assert_eq!(backend.texture_count(), 0);
    }

    #[test]
    fn scroll_and_pan_move_the_camera() {
        let mut backend = HeadlessBackend::new();
        let mut app = Application::new(Settings::default());
        app.init(&mut backend, 1.0).unwrap();
        let camera = app.camera_entity().unwrap();

        app.on_scroll(1.0);
        app.frame(0.016, &mut backend).unwrap();
        let zoom = app.world().get_component::<Camera2D>(camera).unwrap().zoom;
        assert!((zoom - DEMO_ZOOM * 1.1).abs() < 1e-6);

        app.pan_camera(Vec2::new(1.0, 0.0)).unwrap();
        let position = app.world().get_component::<Camera2D>(camera).unwrap().position;
        assert!((position.x - 1.0 / zoom).abs() < 1e-4);
    }

    #[test]
    fn missing_sprite_files_are_skipped() {
        let mut settings = Settings::default();
        settings.atlas.sprites.push(SpriteSource {
            atlas: "files".into(),
            name: "ghost".into(),
            path: "does/not/exist.png".into(),
        });

        let mut backend = HeadlessBackend::new();
        let mut app = Application::new(settings);
        app.init(&mut backend, 1.0).unwrap();
        assert!(app.atlases().resolve("ghost").is_none());
        assert_eq!(app.sprite_count(), DEMO_SPRITE_COUNT);
    }
}
