use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::timer::Phase;

/// Point-in-time snapshot of a capture session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureStatus {
    pub phase: Phase,
    pub event_count: u64,
    pub acceleration_records: usize,
    pub magnetic_records: usize,
    // Last values sent to the display
    pub display_magnitude: Option<f64>,
    pub clock: Option<String>,
    pub recording_ms: u64,
    pub stopped: bool,
}

impl CaptureStatus {
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_json() {
        let status = CaptureStatus {
            phase: Phase::Recording,
            event_count: 3,
            acceleration_records: 120,
            magnetic_records: 140,
            display_magnitude: Some(1.25),
            clock: Some("0:04:250".to_string()),
            recording_ms: 4250,
            stopped: false,
        };

        let json = serde_json::to_string_pretty(&status).unwrap();
        assert!(json.contains("\"Recording\""));
        assert!(json.contains("0:04:250"));

        let back: CaptureStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
    }
}
