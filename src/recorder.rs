use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sample::Sample;

/// One `timestamp,x,y,z` line of a session log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp_ms: i64,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<&Sample> for LogRecord {
    fn from(sample: &Sample) -> Self {
        LogRecord {
            timestamp_ms: sample.timestamp_ms,
            x: sample.x,
            y: sample.y,
            z: sample.z,
        }
    }
}

impl fmt::Display for LogRecord {
    // Debug formatting keeps the decimal point on whole numbers ("9.0", not "9").
    // Values below 1e-4 switch to exponent form ("1e-7"); large ones print in full.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{:?},{:?},{:?}",
            self.timestamp_ms, self.x, self.y, self.z
        )
    }
}

/// Appends accelerometer and magnetic field records in arrival order
pub struct SampleRecorder {
    acceleration: Vec<LogRecord>,
    magnetic_field: Vec<LogRecord>,
}

impl SampleRecorder {
    pub fn with_capacity(capacity: usize) -> Self {
        SampleRecorder {
            acceleration: Vec::with_capacity(capacity),
            magnetic_field: Vec::with_capacity(capacity),
        }
    }

    pub fn record_acceleration(&mut self, sample: &Sample) {
        self.acceleration.push(LogRecord::from(sample));
    }

    pub fn record_magnetic_field(&mut self, sample: &Sample) {
        self.magnetic_field.push(LogRecord::from(sample));
    }

    /// (acceleration, magnetic field) record counts
    pub fn len(&self) -> (usize, usize) {
        (self.acceleration.len(), self.magnetic_field.len())
    }

    pub fn is_empty(&self) -> bool {
        self.acceleration.is_empty() && self.magnetic_field.is_empty()
    }

    /// Consume the recorder and hand back the finished logs
    pub fn flush(self) -> SessionLogs {
        SessionLogs {
            acceleration: self.acceleration,
            magnetic_field: self.magnetic_field,
        }
    }
}

impl Default for SampleRecorder {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

/// The two completed logs of a session. Read-only once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLogs {
    acceleration: Vec<LogRecord>,
    magnetic_field: Vec<LogRecord>,
}

impl SessionLogs {
    pub fn acceleration(&self) -> &[LogRecord] {
        &self.acceleration
    }

    pub fn magnetic_field(&self) -> &[LogRecord] {
        &self.magnetic_field
    }

    /// Acceleration log as CSV text, one newline-terminated line per record
    pub fn acceleration_csv(&self) -> String {
        to_csv(&self.acceleration)
    }

    pub fn magnetic_field_csv(&self) -> String {
        to_csv(&self.magnetic_field)
    }
}

fn to_csv(records: &[LogRecord]) -> String {
    let mut content = String::with_capacity(records.len() * 48);
    for record in records {
        content.push_str(&record.to_string());
        content.push('\n');
    }
    content
}

pub fn acceleration_filename(stopped_at_ms: i64) -> String {
    format!("acceleration-log-{}.csv", stopped_at_ms)
}

pub fn magnetic_field_filename(stopped_at_ms: i64) -> String {
    format!("magnetic-log-{}.csv", stopped_at_ms)
}
