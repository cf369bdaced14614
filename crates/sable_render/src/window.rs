//! Window management
//!
//! Cross-platform window creation via winit. Windows must be created inside
//! `ApplicationHandler::resumed`; these helpers only build the attributes and
//! the event loop.

use winit::error::EventLoopError;
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowAttributes};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl WindowConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Sable Sprite Demo".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Create window attributes from config
pub fn window_attributes(config: &WindowConfig) -> WindowAttributes {
    Window::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
}

pub fn create_event_loop() -> Result<EventLoop<()>, EventLoopError> {
    EventLoop::new()
}
