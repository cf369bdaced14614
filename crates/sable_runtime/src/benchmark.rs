//! Headless render benchmark
//!
//! Each run builds a fresh world with a random sprite field, drives the
//! camera and sprite render systems for a fixed number of frames and
//! summarizes frame times and batcher statistics.

use crate::demo::{self, FieldParams};
use anyhow::{Context, Result};
use glam::Vec2;
use sable_core::ecs::{System, World};
use sable_core::math::DeterministicRng;
use sable_metrics::{FrameTimer, SampleSummary, SampleWindow};
use sable_render::{
    BatcherConfig, Camera2D, CameraSystem2D, RenderBackend, SpriteRenderSystem, SpriteRenderer, TextureAtlasManager,
};
use sable_services::BenchmarkSettings;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

const BENCH_ATLAS: &str = "benchmark";
const SIMULATED_DT: f32 = 1.0 / 60.0;
const SCALABILITY_COUNTS: [usize; 9] = [100, 250, 500, 750, 1000, 1500, 2000, 3000, 5000];
const SCALABILITY_MIN_FPS: f64 = 30.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Extremes {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl From<SampleSummary> for Extremes {
    fn from(summary: SampleSummary) -> Self {
        Self {
            min: summary.min,
            avg: summary.avg,
            max: summary.max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkResults {
    pub label: String,
    pub sprite_count: usize,
    pub frustum_culling: bool,
    pub total_frames: usize,
    pub duration_secs: f64,
    pub fps: Extremes,
    pub frame_time_ms: Extremes,
    pub average_draw_calls: f64,
    pub average_sprites_rendered: f64,
    pub average_sprites_culled: f64,
    pub average_batches: f64,
}

impl BenchmarkResults {
    pub fn log(&self) {
        info!(
            label = %self.label,
            sprites = self.sprite_count,
            culling = self.frustum_culling,
            frames = self.total_frames,
            fps_avg = format_args!("{:.1}", self.fps.avg),
            frame_ms_avg = format_args!("{:.3}", self.frame_time_ms.avg),
            draw_calls = format_args!("{:.1}", self.average_draw_calls),
            rendered = format_args!("{:.1}", self.average_sprites_rendered),
            culled = format_args!("{:.1}", self.average_sprites_culled),
            "benchmark finished"
        );
    }
}

pub struct RenderBenchmark {
    settings: BenchmarkSettings,
    renderer: BatcherConfig,
    aspect_ratio: f32,
}

impl RenderBenchmark {
    pub fn new(settings: BenchmarkSettings, renderer: BatcherConfig, aspect_ratio: f32) -> Self {
        Self {
            settings,
            renderer,
            aspect_ratio,
        }
    }

    /// One run with the configured sprite count and culling setting.
    pub fn run_default(&self, backend: &mut dyn RenderBackend) -> Result<BenchmarkResults> {
        self.run(
            backend,
            "default",
            self.settings.sprite_count,
            self.renderer.frustum_culling,
        )
    }

    /// Same scene with frustum culling off, then on.
    pub fn run_comparison(&self, backend: &mut dyn RenderBackend) -> Result<Vec<BenchmarkResults>> {
        let count = self.settings.sprite_count;
        Ok(vec![
            self.run(backend, "culling off", count, false)?,
            self.run(backend, "culling on", count, true)?,
        ])
    }

    /// Increasing sprite counts until the average FPS drops below 30.
    pub fn run_scalability(&self, backend: &mut dyn RenderBackend) -> Result<Vec<BenchmarkResults>> {
        let mut results = Vec::new();
        for count in SCALABILITY_COUNTS {
            let result = self.run(backend, &format!("{count} sprites"), count, true)?;
            let fps = result.fps.avg;
            results.push(result);
            if sable_metrics::ENABLED && fps < SCALABILITY_MIN_FPS {
                warn!(count, fps, "below 30 FPS, stopping scalability sweep");
                break;
            }
        }
        Ok(results)
    }

    pub fn run(
        &self,
        backend: &mut dyn RenderBackend,
        label: &str,
        sprite_count: usize,
        frustum_culling: bool,
    ) -> Result<BenchmarkResults> {
        info!(label, sprite_count, frustum_culling, "starting benchmark");

        let mut atlases = TextureAtlasManager::new();
        demo::register_demo_sprites(&mut atlases, BENCH_ATLAS, 256, 32)?;
        let report = atlases.generate_all_atlases(backend);
        if let Some((name, err)) = report.failed.into_iter().next() {
            return Err(err).with_context(|| format!("generating atlas '{name}'"));
        }

        let mut world = World::new();
        let camera = SpriteRenderSystem::spawn_camera(
            &mut world,
            Camera2D::new(Vec2::ZERO, self.settings.camera_zoom, self.aspect_ratio),
        )?;
        let mut rng = DeterministicRng::new(self.settings.seed);
        demo::spawn_sprite_field(
            &mut world,
            &mut rng,
            &demo::DEMO_SPRITES,
            BENCH_ATLAS,
            FieldParams {
                count: sprite_count,
                world_size: self.settings.world_size,
                sprite_scale: self.settings.sprite_scale,
                max_layer: 5,
            },
        )?;

        let mut cameras = CameraSystem2D::new();
        let mut sprites = SpriteRenderSystem::new(camera);
        sprites.set_frustum_culling(frustum_culling);
        let mut renderer = SpriteRenderer::new(self.renderer);
        renderer.init(backend);

        let frames = self.settings.frame_count.max(1);
        let mut timer = FrameTimer::new(frames);
        let mut fps = SampleWindow::new();
        let mut frame_ms = SampleWindow::new();
        let mut totals = [0.0f64; 4];
        let started = Instant::now();

        for _ in 0..frames {
            timer.begin();
            if self.settings.moving_camera {
                let cam = world.get_component_mut::<Camera2D>(camera)?;
                let step = self.settings.camera_speed * SIMULATED_DT;
                cam.position += Vec2::new(step, step * 0.5);
            }
            cameras.update(SIMULATED_DT, &mut world)?;
            sprites.render(&world, &mut renderer, &atlases, backend)?;
            let elapsed = timer.end();

            let ms = elapsed.as_secs_f64() * 1000.0;
            frame_ms.push(ms);
            if ms > 0.0 {
                fps.push(1000.0 / ms);
            }
            let stats = renderer.stats();
            totals[0] += f64::from(stats.draw_calls);
            totals[1] += f64::from(stats.sprites_rendered);
            totals[2] += f64::from(stats.sprites_culled);
            totals[3] += f64::from(stats.batches_created);
        }

        let duration_secs = started.elapsed().as_secs_f64();
        renderer.shutdown();
        if let Some(texture) = atlases.atlas(BENCH_ATLAS).and_then(|a| a.texture()) {
            backend.destroy_texture(texture)?;
        }

        let n = frames as f64;
        let mut fps = Extremes::from(fps.summary());
        if duration_secs > 0.0 && sable_metrics::ENABLED {
            fps.avg = n / duration_secs;
        }
        let results = BenchmarkResults {
            label: label.to_string(),
            sprite_count,
            frustum_culling,
            total_frames: frames,
            duration_secs,
            fps,
            frame_time_ms: frame_ms.summary().into(),
            average_draw_calls: totals[0] / n,
            average_sprites_rendered: totals[1] / n,
            average_sprites_culled: totals[2] / n,
            average_batches: totals[3] / n,
        };
        results.log();
        Ok(results)
    }
}

pub fn write_results(results: &[BenchmarkResults], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json).with_context(|| format!("writing benchmark results to {}", path.display()))?;
    info!(path = %path.display(), runs = results.len(), "benchmark results written");
    Ok(())
}
