//! Sable Services Layer
//!
//! Platform-facing services shared by the runtime. Currently engine settings
//! persisted as JSON.

pub mod settings;

pub use settings::{
    AtlasSettings, BenchmarkSettings, RendererSettings, Settings, SettingsError, SpriteSource, WindowSettings,
};
