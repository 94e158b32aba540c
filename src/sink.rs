use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::error::CaptureResult;
use crate::timer::ClockDisplay;

/// Durable storage for finished session logs
pub trait LogSink {
    fn persist(&self, content: &str, filename: &str) -> CaptureResult<()>;
}

/// Receives values for on-screen display. Purely observational.
pub trait DisplaySink {
    fn show_magnitude(&self, magnitude: f64);
    fn show_clock(&self, clock: &ClockDisplay);
}

/// Reports the hand-off and writes nothing
pub struct LogOnlySink;

impl LogSink for LogOnlySink {
    fn persist(&self, content: &str, filename: &str) -> CaptureResult<()> {
        log::info!(
            "would write {} ({} lines, {} bytes)",
            filename,
            content.lines().count(),
            content.len()
        );
        Ok(())
    }
}

/// Appends each log to `<dir>/<filename>`, creating the directory on first use
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl LogSink for DirectorySink {
    fn persist(&self, content: &str, filename: &str) -> CaptureResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", content)?;
        file.flush()?;

        log::info!("wrote {}", path.display());
        Ok(())
    }
}

/// Sends display updates to the debug log
pub struct LogDisplay;

impl DisplaySink for LogDisplay {
    fn show_magnitude(&self, magnitude: f64) {
        log::debug!("acceleration {}", magnitude);
    }

    fn show_clock(&self, clock: &ClockDisplay) {
        log::debug!("timer {}", clock);
    }
}
