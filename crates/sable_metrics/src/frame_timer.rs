//! Rolling frame timing for the sprite loop

use super::ring_buffer::RingBuffer;
use crate::FrameStats;
use std::time::{Duration, Instant};

/// Times `begin`..`end` spans and keeps the most recent `window` of them.
///
/// The windowed demo reads [`FrameTimer::stats`] for its periodic log line;
/// the benchmark only needs the duration returned by [`FrameTimer::end`].
pub struct FrameTimer {
    started: Option<Instant>,
    recent: RingBuffer<Duration>,
    total_frames: u64,
}

impl FrameTimer {
    pub fn new(window: usize) -> Self {
        Self {
            started: None,
            recent: RingBuffer::new(window),
            total_frames: 0,
        }
    }

    pub fn begin(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Close the span opened by `begin`. Without a matching `begin` nothing
    /// is recorded and zero is returned.
    pub fn end(&mut self) -> Duration {
        let Some(started) = self.started.take() else {
            return Duration::ZERO;
        };
        let elapsed = started.elapsed();
        self.record(elapsed);
        elapsed
    }

    /// Record a frame measured elsewhere.
    pub fn record(&mut self, frame_time: Duration) {
        self.recent.push(frame_time);
        self.total_frames += 1;
    }

    /// Summary of the frames still in the window.
    pub fn stats(&self) -> FrameStats {
        let to_ms = |d: Duration| d.as_secs_f64() * 1000.0;
        let avg_ms = to_ms(self.recent.average());
        let (min, max) = self.recent.min_max();
        FrameStats {
            fps: if avg_ms > 0.0 { 1000.0 / avg_ms } else { 0.0 },
            avg_ms,
            min_ms: to_ms(min),
            max_ms: to_ms(max),
            total_frames: self.total_frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_drops_old_frames() {
        let mut timer = FrameTimer::new(2);
        assert_eq!(timer.stats(), FrameStats::default());

        timer.record(Duration::from_millis(100));
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(30));

        let stats = timer.stats();
        assert!((stats.avg_ms - 20.0).abs() < 1e-9);
        assert!((stats.fps - 50.0).abs() < 1e-9);
        assert_eq!((stats.min_ms, stats.max_ms), (10.0, 30.0));
        assert_eq!(stats.total_frames, 3);
    }

    #[test]
    fn end_without_begin_records_nothing() {
        let mut timer = FrameTimer::new(4);
        assert_eq!(timer.end(), Duration::ZERO);
        assert_eq!(timer.stats().total_frames, 0);

        timer.begin();
        timer.end();
        assert_eq!(timer.stats().total_frames, 1);
    }
}
