use crate::backend::TextureHandle;
use sable_core::ecs::EcsError;
use std::path::PathBuf;
use thiserror::Error;

/// Backend and GPU resource failures.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown texture {0}")]
    UnknownTexture(TextureHandle),

    #[error("texture '{label}' has no pixel data")]
    EmptyTexture { label: String },

    #[error("mip level {level} of '{label}' is {actual} bytes, expected {expected}")]
    MipLevelSize {
        label: String,
        level: usize,
        expected: usize,
        actual: usize,
    },

    #[error("draw binds {count} textures but the backend supports {max}")]
    TooManyTextures { count: usize, max: usize },

    #[error("index range {start}..{end} exceeds the {uploaded} uploaded indices")]
    IndexRange { start: u32, end: u32, uploaded: usize },

    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to open device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Sprite loading and atlas packing failures.
///
/// Each is local to one sprite or one atlas; other atlases stay usable.
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("atlas already generated, cannot add sprite '{sprite}'")]
    AlreadyGenerated { sprite: String },

    #[error("sprite '{sprite}' already exists in this atlas")]
    DuplicateSprite { sprite: String },

    #[error("sprite '{sprite}' already belongs to atlas '{owner}'")]
    SpriteOwnedElsewhere { sprite: String, owner: String },

    #[error("failed to load sprite '{sprite}' from {path:?}: {source}")]
    Load {
        sprite: String,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("sprite '{sprite}' has {channels} channels (expected 1 to 4)")]
    UnsupportedChannels { sprite: String, channels: u32 },

    #[error("sprite '{sprite}' has zero size")]
    EmptySprite { sprite: String },

    #[error("sprite '{sprite}' buffer is {actual} bytes, expected {expected}")]
    PixelDataSize {
        sprite: String,
        expected: usize,
        actual: usize,
    },

    #[error("sprite '{sprite}' ({width}x{height}) does not fit in the {atlas_width}x{atlas_height} atlas")]
    DoesNotFit {
        sprite: String,
        width: u32,
        height: u32,
        atlas_width: u32,
        atlas_height: u32,
    },

    #[error("atlas '{0}' not found")]
    UnknownAtlas(String),

    #[error("atlas '{0}' already exists")]
    DuplicateAtlas(String),

    #[error("atlas dimensions must be non-zero (got {width}x{height})")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("atlas upload failed: {0}")]
    Upload(#[from] RenderError),
}

/// Failures raised by the render systems.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Ecs(#[from] EcsError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
