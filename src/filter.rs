use crate::error::{CaptureError, CaptureResult};
use crate::sample::Sample;

/// Removes the gravity component from accelerometer samples.
///
/// Keeps one exponential moving average per axis as the gravity estimate and
/// returns the raw value minus that estimate. The estimate evolves on every
/// call, so samples must be fed exactly once and in arrival order.
pub struct HighPassFilter {
    alpha: f32,
    gravity: [f32; 3],
}

impl HighPassFilter {
    /// Create a filter with smoothing constant `alpha` in `[0, 1)`
    pub fn new(alpha: f32) -> CaptureResult<Self> {
        if !(0.0..1.0).contains(&alpha) {
            return Err(CaptureError::InvalidConfig(format!(
                "alpha must be in [0, 1), got {}",
                alpha
            )));
        }
        Ok(HighPassFilter {
            alpha,
            gravity: [0.0; 3],
        })
    }

    /// Update the gravity estimate with `raw` and return the filtered sample.
    /// The timestamp is carried over unchanged.
    pub fn filter(&mut self, raw: &Sample) -> Sample {
        let values = [raw.x, raw.y, raw.z];
        let mut filtered = [0.0f32; 3];

        for axis in 0..3 {
            self.gravity[axis] =
                self.alpha * self.gravity[axis] + (1.0 - self.alpha) * values[axis];
            filtered[axis] = values[axis] - self.gravity[axis];
        }

        Sample::new(filtered[0], filtered[1], filtered[2], raw.timestamp_ms)
    }

    pub fn gravity(&self) -> [f32; 3] {
        self.gravity
    }

    pub fn reset(&mut self) {
        self.gravity = [0.0; 3];
    }
}
