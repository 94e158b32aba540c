use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, CaptureResult};
use crate::sample::Sample;

/// Result of observing an accepted sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Magnitude of the filtered sample
    pub magnitude: f64,
    /// Magnitude rounded to 2 decimals, for display
    pub display_magnitude: f64,
    /// 1 if this sample completed a rising edge, else 0
    pub event_count_delta: u32,
}

/// Counts rising-edge motion events ("steps") in high-pass filtered samples.
///
/// Samples below the noise threshold are ignored entirely. The first accepted
/// sample only seeds the previous magnitude. After that an event is counted
/// when the magnitude rises by more than `edge_delta` while the filtered x axis
/// is positive; negative x impulses never count.
pub struct EventDetector {
    threshold: f64,
    edge_delta: f64,
    last_magnitude: Option<f64>,
    event_count: u64,
}

impl EventDetector {
    pub fn new(threshold: f64, edge_delta: f64) -> CaptureResult<Self> {
        if !(threshold >= 0.0) || !(edge_delta >= 0.0) {
            return Err(CaptureError::InvalidConfig(format!(
                "threshold and edge_delta must be non-negative, got {} / {}",
                threshold, edge_delta
            )));
        }
        Ok(Self {
            threshold,
            edge_delta,
            last_magnitude: None,
            event_count: 0,
        })
    }

    /// Observe one filtered sample. Returns `None` when the sample is below
    /// the threshold and must be neither displayed nor recorded.
    pub fn observe(&mut self, filtered: &Sample) -> Option<Detection> {
        let magnitude = filtered.magnitude();

        if magnitude < self.threshold {
            return None;
        }

        let mut delta = 0;
        if let Some(last) = self.last_magnitude {
            if last < magnitude && filtered.x > 0.0 && (last - magnitude).abs() > self.edge_delta
            {
                self.event_count += 1;
                delta = 1;
                log::debug!(
                    "event #{} at {} ms: {:.3} -> {:.3}",
                    self.event_count,
                    filtered.timestamp_ms,
                    last,
                    magnitude
                );
            }
        }
        self.last_magnitude = Some(magnitude);

        Some(Detection {
            magnitude,
            display_magnitude: round_to_hundredths(magnitude),
            event_count_delta: delta,
        })
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn last_magnitude(&self) -> Option<f64> {
        self.last_magnitude
    }

    pub fn reset(&mut self) {
        self.last_magnitude = None;
        self.event_count = 0;
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> EventDetector {
        EventDetector::new(0.06, 0.5).unwrap()
    }

    fn along_x(x: f32) -> Sample {
        Sample::new(x, 0.0, 0.0, 0)
    }

    #[test]
    fn test_below_threshold_is_rejected_without_state_change() {
        let mut det = detector();
        det.observe(&along_x(1.0)).unwrap();

        assert!(det.observe(&Sample::new(0.03, 0.03, 0.0, 0)).is_none());
        assert_eq!(det.last_magnitude(), Some(1.0));
        assert_eq!(det.event_count(), 0);
    }

    #[test]
    fn test_first_accepted_sample_never_counts() {
        let mut det = detector();
        let detection = det.observe(&along_x(5.0)).unwrap();
        assert_eq!(detection.event_count_delta, 0);
        assert_eq!(det.event_count(), 0);
        assert_eq!(det.last_magnitude(), Some(5.0));
    }

    #[test]
    fn test_rising_edges_count_n_minus_one() {
        let mut det = detector();
        for i in 0..10 {
            det.observe(&along_x(1.0 + i as f32)).unwrap();
        }
        assert_eq!(det.event_count(), 9);
    }

    #[test]
    fn test_small_rise_does_not_count() {
        let mut det = detector();
        det.observe(&along_x(1.0)).unwrap();
        let detection = det.observe(&along_x(1.4)).unwrap();
        assert_eq!(detection.event_count_delta, 0);
        // the magnitude is still tracked
        assert!((det.last_magnitude().unwrap() - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_negative_x_rise_is_ignored() {
        let mut det = detector();
        det.observe(&along_x(-1.0)).unwrap();
        det.observe(&along_x(-3.0)).unwrap();
        assert_eq!(det.event_count(), 0);

        // same rise with positive x counts
        det.observe(&along_x(5.0)).unwrap();
        assert_eq!(det.event_count(), 1);
    }

    #[test]
    fn test_falling_magnitude_does_not_count() {
        let mut det = detector();
        det.observe(&along_x(3.0)).unwrap();
        det.observe(&along_x(1.0)).unwrap();
        assert_eq!(det.event_count(), 0);
    }

    #[test]
    fn test_display_magnitude_rounded() {
        let mut det = detector();
        let detection = det.observe(&Sample::new(0.3, 0.4, 0.0, 0)).unwrap();
        assert_eq!(detection.display_magnitude, 0.5);

        let detection = det.observe(&along_x(1.23456)).unwrap();
        assert_eq!(detection.display_magnitude, 1.23);
    }

    #[test]
    fn test_reset_restores_sentinel() {
        let mut det = detector();
        det.observe(&along_x(1.0)).unwrap();
        det.observe(&along_x(2.0)).unwrap();
        det.reset();
        assert_eq!(det.event_count(), 0);
        assert_eq!(det.last_magnitude(), None);
    }
}
