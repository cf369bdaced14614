// frustum.rs - World-space visible rectangle for 2D culling

use glam::{Vec2, Vec3};

/// Axis-aligned visible area. Sprites whose bounds miss it are culled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub min: Vec2,
    pub max: Vec2,
}

impl Frustum {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle of `view_size` world units centered on `center`, shrunk by
    /// `zoom` (zoom 2 shows half as much).
    pub fn from_view(center: Vec2, view_size: Vec2, zoom: f32) -> Self {
        let half = view_size * 0.5 / zoom;
        Self::new(center - half, center + half)
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Overlap test against a box centered at `position` with full extents
    /// `size`. Touching edges count as visible.
    pub fn intersects(&self, position: Vec3, size: Vec2) -> bool {
        let center = position.truncate();
        let half = size * 0.5;
        !(center.x + half.x < self.min.x
            || center.x - half.x > self.max.x
            || center.y + half.y < self.min.y
            || center.y - half.y > self.max.y)
    }
}

impl Default for Frustum {
    fn default() -> Self {
        Self::new(Vec2::splat(-1000.0), Vec2::splat(1000.0))
    }
}
