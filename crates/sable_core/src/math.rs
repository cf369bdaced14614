//! Math utilities
//!
//! Re-exports glam with the transform helpers used by the sprite pipeline

pub use glam::*;

/// Build a 2D model matrix: translate, rotate around Z (radians), then scale.
pub fn transform_2d(position: Vec3, rotation: f32, scale: Vec2) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        scale.extend(1.0),
        Quat::from_rotation_z(rotation),
        position,
    )
}

/// World-space translation stored in a model matrix.
#[inline]
pub fn translation_of(transform: &Mat4) -> Vec3 {
    transform.w_axis.truncate()
}

/// Per-axis scale of a model matrix (lengths of its basis vectors).
#[inline]
pub fn scale_of(transform: &Mat4) -> Vec3 {
    Vec3::new(
        transform.x_axis.truncate().length(),
        transform.y_axis.truncate().length(),
        transform.z_axis.truncate().length(),
    )
}

/// Deterministic random number generator for benchmarks and demo scenes.
///
/// Same seed, same sequence on every platform.
pub struct DeterministicRng {
    seed: u64,
    state: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self { seed, state: seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rewind to the initial seed.
    pub fn reset(&mut self) {
        self.state = self.seed;
    }

    pub fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG
        const A: u64 = 1664525;
        const C: u64 = 1013904223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        self.state as u32
    }

    /// Uniform sample in `[0, 1]`.
    pub fn next_f32(&mut self) -> f32 {
        self.next_u32() as f32 / u32::MAX as f32
    }

    /// Uniform sample in `[min, max]`.
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        self.next_u32() as usize % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_roundtrips_translation_and_scale() {
        let m = transform_2d(Vec3::new(10.0, -4.0, 0.5), 0.7, Vec2::new(3.0, 2.0));
        let t = translation_of(&m);
        let s = scale_of(&m);

        assert!((t - Vec3::new(10.0, -4.0, 0.5)).length() < 1e-5);
        assert!((s.x - 3.0).abs() < 1e-5);
        assert!((s.y - 2.0).abs() < 1e-5);
        assert!((s.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rng_is_reproducible() {
        let mut a = DeterministicRng::new(42);
        let mut b = DeterministicRng::new(42);
        let xs: Vec<u32> = (0..16).map(|_| a.next_u32()).collect();
        let ys: Vec<u32> = (0..16).map(|_| b.next_u32()).collect();
        assert_eq!(xs, ys);

        a.reset();
        assert_eq!(a.next_u32(), xs[0]);
    }

    #[test]
    fn rng_range_stays_in_bounds() {
        let mut rng = DeterministicRng::new(7);
        for _ in 0..1000 {
            let v = rng.range_f32(-5.0, 5.0);
            assert!((-5.0..=5.0).contains(&v));
            assert!(rng.index(3) < 3);
        }
    }
}
