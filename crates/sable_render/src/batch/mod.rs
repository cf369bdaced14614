//! Sprite batching: commands, batches, culling and frame statistics

mod batcher;
mod frustum;
mod sprite_batch;
mod stats;

pub use batcher::{BatcherConfig, SpriteBatcher};
pub use frustum::Frustum;
pub use sprite_batch::{SpriteBatch, SpriteRenderCommand};
pub use stats::RenderStats;
