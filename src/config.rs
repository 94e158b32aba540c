use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{CaptureError, CaptureResult};

/// Upper bound on the initial capacity of each log sequence
pub const MAX_LOG_CAPACITY: usize = 1_000_000;

/// Tunables for one capture session.
///
/// Every field has a default, so a JSON file only needs to name the values
/// it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Smoothing constant of the gravity estimate (0.8 = slow tracking)
    pub alpha: f32,
    /// Minimum filtered magnitude for a sample to be accepted
    pub threshold: f64,
    /// Minimum magnitude jump between accepted samples to count an event
    pub edge_delta: f64,
    /// Countdown before recording starts
    pub countdown_ms: u64,
    /// Length of the recording window
    pub capture_ms: u64,
    /// Delay between timer ticks
    pub tick_interval_ms: u64,
    /// Initial capacity of each log sequence
    pub log_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            alpha: 0.8,
            threshold: 0.06,
            edge_delta: 0.5,
            countdown_ms: 10_000,
            capture_ms: 10_000,
            tick_interval_ms: 10,
            log_capacity: 500,
        }
    }
}

impl CaptureConfig {
    /// Load a config from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> CaptureResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CaptureError::Config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        let config: CaptureConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CaptureResult<()> {
        if !(0.0..1.0).contains(&self.alpha) {
            return Err(CaptureError::InvalidConfig(format!(
                "alpha must be in [0, 1), got {}",
                self.alpha
            )));
        }
        if !(self.threshold >= 0.0) {
            return Err(CaptureError::InvalidConfig(format!(
                "threshold must be non-negative, got {}",
                self.threshold
            )));
        }
        if !(self.edge_delta >= 0.0) {
            return Err(CaptureError::InvalidConfig(format!(
                "edge_delta must be non-negative, got {}",
                self.edge_delta
            )));
        }
        if self.countdown_ms == 0 {
            return Err(CaptureError::InvalidConfig(
                "countdown_ms must be positive".to_string(),
            ));
        }
        if self.capture_ms == 0 {
            return Err(CaptureError::InvalidConfig(
                "capture_ms must be positive".to_string(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(CaptureError::InvalidConfig(
                "tick_interval_ms must be positive".to_string(),
            ));
        }
        if self.log_capacity > MAX_LOG_CAPACITY {
            return Err(CaptureError::InvalidConfig(format!(
                "log_capacity must be at most {}, got {}",
                MAX_LOG_CAPACITY, self.log_capacity
            )));
        }
        Ok(())
    }

    pub fn countdown(&self) -> Duration {
        Duration::from_millis(self.countdown_ms)
    }

    pub fn capture(&self) -> Duration {
        Duration::from_millis(self.capture_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
