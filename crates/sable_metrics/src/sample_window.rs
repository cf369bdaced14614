//! Unbounded min/avg/max accumulator for benchmark runs

/// Summary of everything pushed into a [`SampleWindow`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleSummary {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
    pub count: usize,
}

/// Running min, max and mean without storing the samples.
#[derive(Debug, Clone, Default)]
pub struct SampleWindow {
    min: f64,
    max: f64,
    sum: f64,
    count: usize,
}

impl SampleWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-finite samples are dropped.
    pub fn push(&mut self, sample: f64) {
        if !sample.is_finite() {
            return;
        }
        if self.count == 0 {
            self.min = sample;
            self.max = sample;
        } else {
            self.min = self.min.min(sample);
            self.max = self.max.max(sample);
        }
        self.sum += sample;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    pub fn summary(&self) -> SampleSummary {
        SampleSummary {
            min: self.min,
            avg: self.average(),
            max: self.max,
            count: self.count,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
