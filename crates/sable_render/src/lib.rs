//! Sable Render System
//!
//! Texture-atlas packing and batched sprite rendering on top of a narrow
//! backend seam. The [`HeadlessBackend`] records every upload and draw for
//! tests and benchmarks; the [`WgpuBackend`] puts the same batches on screen.
//!
//! Per-frame flow:
//! 1. [`SpriteRenderer::begin_frame`] resets batches and statistics
//! 2. sprites are submitted by atlas name or by texture handle
//! 3. [`SpriteRenderer::end_frame`] sorts by layer, builds one vertex and
//!    index buffer, and issues one indexed draw per batch

pub mod atlas;
pub mod backend;
pub mod batch;
pub mod components;
mod error;
pub mod headless;
pub mod sprite_renderer;
pub mod systems;
pub mod vertex;
pub mod wgpu_backend;
pub mod window;

pub use atlas::{AtlasStats, PixelRect, SpriteUv, TextureAtlas, TextureAtlasManager};
pub use backend::{MipLevel, RenderBackend, TextureHandle};
pub use batch::{BatcherConfig, Frustum, RenderStats, SpriteBatcher};
pub use components::{Camera2D, Sprite, Transform2D};
pub use error::{AtlasError, RenderError, SystemError};
pub use headless::HeadlessBackend;
pub use sprite_renderer::SpriteRenderer;
pub use systems::{CameraSystem2D, SpriteRenderSystem};
pub use vertex::SpriteVertex;
pub use wgpu_backend::WgpuBackend;

pub use wgpu;
pub use winit;
