use serde::{Deserialize, Serialize};

/// Tri-axis reading as delivered by the sensor source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Arrival time, milliseconds since the Unix epoch
    pub timestamp_ms: i64,
}

impl Sample {
    pub fn new(x: f32, y: f32, z: f32, timestamp_ms: i64) -> Self {
        Self {
            x,
            y,
            z,
            timestamp_ms,
        }
    }

    pub fn magnitude(&self) -> f64 {
        let (x, y, z) = (self.x as f64, self.y as f64, self.z as f64);
        (x * x + y * y + z * z).sqrt()
    }
}

/// Which sensor produced a sample. The two kinds are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorKind {
    Accelerometer,
    MagneticField,
}

/// A sample tagged with its source, as it travels through the event queue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorEvent {
    pub kind: SensorKind,
    pub sample: Sample,
}

impl SensorEvent {
    pub fn accelerometer(sample: Sample) -> Self {
        Self {
            kind: SensorKind::Accelerometer,
            sample,
        }
    }

    pub fn magnetic_field(sample: Sample) -> Self {
        Self {
            kind: SensorKind::MagneticField,
            sample,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude() {
        let sample = Sample::new(3.0, 4.0, 0.0, 0);
        assert_eq!(sample.magnitude(), 5.0);
    }

    #[test]
    fn test_event_constructors_tag_kind() {
        let sample = Sample::new(0.1, 0.2, 0.3, 42);
        assert_eq!(
            SensorEvent::accelerometer(sample).kind,
            SensorKind::Accelerometer
        );
        assert_eq!(
            SensorEvent::magnetic_field(sample).kind,
            SensorKind::MagneticField
        );
    }
}
