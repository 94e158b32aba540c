// Accelerometer and magnetic field event logger
// Countdown, fixed capture window, high-pass filtered step detection

pub mod config;
pub mod detector;
pub mod error;
pub mod filter;
pub mod recorder;
pub mod runner;
pub mod sample;
pub mod sensors;
pub mod session;
pub mod sink;
pub mod status;
pub mod timer;

pub use config::CaptureConfig;
pub use detector::{Detection, EventDetector};
pub use error::{CaptureError, CaptureResult};
pub use filter::HighPassFilter;
pub use recorder::{LogRecord, SampleRecorder, SessionLogs};
pub use sample::{Sample, SensorEvent, SensorKind};
pub use session::{CaptureSession, SessionSummary, TickOutcome};
pub use sink::{DirectorySink, DisplaySink, LogDisplay, LogOnlySink, LogSink};
pub use status::CaptureStatus;
pub use timer::{Clock, ClockDisplay, Phase, SessionTimer, SystemClock, Tick};
