//! Sable Metrics
//!
//! Frame and benchmark timing for the sprite renderer. Collection sits
//! behind the `metrics` feature. Without it every type below is an empty
//! stand-in that records nothing and reports zeros, so call sites never
//! need their own `cfg` guards.
//!
//! ```ignore
//! use sable_metrics::{FrameTimer, SampleWindow};
//!
//! let mut timer = FrameTimer::new(120);
//! let mut frame_ms = SampleWindow::new();
//! for _ in 0..frames {
//!     timer.begin();
//!     render_sprites();
//!     frame_ms.push(timer.end().as_secs_f64() * 1000.0);
//! }
//! let window = timer.stats(); // last 120 frames
//! let run = frame_ms.summary(); // the whole run
//! ```

#[cfg(feature = "metrics")]
mod frame_timer;
#[cfg(feature = "metrics")]
mod ring_buffer;
#[cfg(feature = "metrics")]
mod sample_window;

#[cfg(feature = "metrics")]
pub use frame_timer::FrameTimer;
#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;
#[cfg(feature = "metrics")]
pub use sample_window::{SampleSummary, SampleWindow};

/// Whether this build collects metrics.
pub const ENABLED: bool = cfg!(feature = "metrics");

/// Rolling view over the frames a [`FrameTimer`] still holds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub fps: f64,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    /// Every frame recorded, including those that left the window.
    pub total_frames: u64,
}

// Stand-ins for builds without the `metrics` feature.

#[cfg(not(feature = "metrics"))]
pub struct FrameTimer;

#[cfg(not(feature = "metrics"))]
impl FrameTimer {
    pub fn new(_window: usize) -> Self { Self }
    pub fn begin(&mut self) {}
    pub fn end(&mut self) -> std::time::Duration { std::time::Duration::ZERO }
    pub fn record(&mut self, _frame_time: std::time::Duration) {}
    pub fn stats(&self) -> FrameStats { FrameStats::default() }
}

#[cfg(not(feature = "metrics"))]
pub struct RingBuffer<T>(std::marker::PhantomData<T>);

#[cfg(not(feature = "metrics"))]
impl<T> RingBuffer<T> {
    pub fn new(_capacity: usize) -> Self { Self(std::marker::PhantomData) }
    pub fn push(&mut self, _value: T) {}
    pub fn len(&self) -> usize { 0 }
    pub fn is_empty(&self) -> bool { true }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleSummary {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
    pub count: usize,
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Clone, Default)]
pub struct SampleWindow;

#[cfg(not(feature = "metrics"))]
impl SampleWindow {
    pub fn new() -> Self { Self }
    pub fn push(&mut self, _sample: f64) {}
    pub fn count(&self) -> usize { 0 }
    pub fn is_empty(&self) -> bool { true }
    pub fn average(&self) -> f64 { 0.0 }
    pub fn summary(&self) -> SampleSummary { SampleSummary::default() }
    pub fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn benchmark_surface_is_available_either_way() {
        let mut timer = FrameTimer::new(60);
        timer.begin();
        let elapsed = timer.end();
        let mut window = SampleWindow::new();
        window.push(elapsed.as_secs_f64() * 1000.0);

        if ENABLED {
            assert_eq!(timer.stats().total_frames, 1);
            assert_eq!(window.count(), 1);
        } else {
            assert_eq!(timer.stats(), FrameStats::default());
            assert_eq!(window.summary(), SampleSummary::default());
        }
    }
}
