// windowed.rs - winit event loop driving the wgpu backend
//
// Controls: mouse wheel zooms, arrow keys pan, C toggles frustum culling,
// Escape quits.

use crate::app::Application;
use anyhow::{anyhow, Result};
use glam::Vec2;
use sable_render::window::{create_event_loop, window_attributes, WindowConfig};
use sable_render::WgpuBackend;
use sable_services::Settings;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

const PAN_STEP: f32 = 0.5;
const STATS_INTERVAL: Duration = Duration::from_secs(2);

struct WindowedApp {
    config: WindowConfig,
    clear_color: [f32; 4],
    app: Application,
    window: Option<Arc<Window>>,
    backend: Option<WgpuBackend>,
    last_frame: Instant,
    last_report: Instant,
    error: Option<anyhow::Error>,
}

impl WindowedApp {
    fn new(settings: Settings) -> Self {
        let config = WindowConfig {
            title: settings.window.title.clone(),
            width: settings.window.width,
            height: settings.window.height,
        };
        let clear_color = settings.renderer.clear_color;
        Self {
            config,
            clear_color,
            app: Application::new(settings),
            window: None,
            backend: None,
            last_frame: Instant::now(),
            last_report: Instant::now(),
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = Arc::new(event_loop.create_window(window_attributes(&self.config))?);
        let mut backend = pollster::block_on(WgpuBackend::new(window.clone()))?;
        let aspect_ratio = backend.aspect_ratio();
        self.app.init(&mut backend, aspect_ratio)?;

        info!(title = %self.config.title, size = ?backend.surface_size(), "window ready");
        window.request_redraw();
        self.window = Some(window);
        self.backend = Some(backend);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(backend) = self.backend.as_mut() else {
            return Ok(());
        };
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.app.frame(dt, backend)?;
        backend.present(self.clear_color)?;

        if self.last_report.elapsed() >= STATS_INTERVAL {
            self.last_report = Instant::now();
            let stats = self.app.stats();
            let timing = self.app.frame_stats();
            info!(
                fps = format_args!("{:.1}", timing.fps),
                min_ms = format_args!("{:.2}", timing.min_ms),
                max_ms = format_args!("{:.2}", timing.max_ms),
                draw_calls = stats.draw_calls,
                rendered = stats.sprites_rendered,
                culled = stats.sprites_culled,
                "frame stats"
            );
        }
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: KeyEvent) -> Result<()> {
        if event.state != ElementState::Pressed {
            return Ok(());
        }
        let pan = match event.logical_key.as_ref() {
            Key::Named(NamedKey::Escape) => {
                event_loop.exit();
                return Ok(());
            }
            Key::Named(NamedKey::ArrowLeft) => Vec2::new(-PAN_STEP, 0.0),
            Key::Named(NamedKey::ArrowRight) => Vec2::new(PAN_STEP, 0.0),
            Key::Named(NamedKey::ArrowUp) => Vec2::new(0.0, PAN_STEP),
            Key::Named(NamedKey::ArrowDown) => Vec2::new(0.0, -PAN_STEP),
            Key::Character("c") | Key::Character("C") => {
                self.app.toggle_frustum_culling();
                return Ok(());
            }
            _ => return Ok(()),
        };
        self.app.pan_camera(pan)
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!(error = %err, "stopping event loop");
        self.error.get_or_insert(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for WindowedApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let result = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                Ok(())
            }
            WindowEvent::Resized(size) => match self.backend.as_mut() {
                Some(backend) if size.width > 0 && size.height > 0 => {
                    backend.resize(size.width, size.height);
                    self.app.resize(backend.aspect_ratio())
                }
                _ => Ok(()),
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let offset = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32,
                };
                self.app.on_scroll(offset);
                Ok(())
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, event),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => Ok(()),
        };
        if let Err(e) = result {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(backend) = self.backend.as_mut() {
            self.app.shutdown(backend);
        }
    }
}

pub fn run(settings: Settings) -> Result<()> {
    let event_loop = create_event_loop()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = WindowedApp::new(settings);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None if app.backend.is_none() => Err(anyhow!("window was never created")),
        None => Ok(()),
    }
}
