//! Sable Engine Core
//!
//! Contains the fundamental simulation building blocks:
//! - Entity Component System (entities, dense component pools, archetype buckets, systems)
//! - Math helpers shared by the renderer and gameplay code

pub mod ecs;
pub mod math;

pub use glam;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
