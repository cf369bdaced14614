//! Texture atlases
//!
//! Binary-tree packing of many sprites into one texture, and a registry that
//! maps sprite names to the atlas (and UV rectangle) that holds them.

mod manager;
pub mod mipmap;
mod packer;
mod texture_atlas;

pub use manager::{GenerationReport, TextureAtlasManager};
pub use packer::{AtlasPacker, PixelRect};
pub use texture_atlas::{AtlasStats, SpriteUv, TextureAtlas, SPRITE_PADDING};
