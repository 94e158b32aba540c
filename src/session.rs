use serde::{Deserialize, Serialize};

use crate::config::CaptureConfig;
use crate::detector::{Detection, EventDetector};
use crate::error::{CaptureError, CaptureResult};
use crate::filter::HighPassFilter;
use crate::recorder::{acceleration_filename, magnetic_field_filename, SampleRecorder, SessionLogs};
use crate::sample::{Sample, SensorKind};
use crate::sink::{DisplaySink, LogSink};
use crate::status::CaptureStatus;
use crate::timer::{Clock, ClockDisplay, Phase, SessionTimer, Tick};

/// What `stop` handed to the persistence sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub stopped_at_ms: i64,
    pub acceleration_file: String,
    pub magnetic_file: String,
    pub acceleration_records: usize,
    pub magnetic_records: usize,
    pub event_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No session is running
    Inactive,
    Running(Tick),
    /// The deferred stop ran on this tick
    Stopped(SessionSummary),
}

/// One countdown-then-capture session.
///
/// Owns the filter, detector, recorder and timer; every mutation goes through
/// `&mut self`, so callers that receive sensor and timer callbacks on
/// different threads must funnel them through one owner (see `runner`).
pub struct CaptureSession {
    config: CaptureConfig,
    filter: HighPassFilter,
    detector: EventDetector,
    timer: SessionTimer,
    // Some between start and stop
    recorder: Option<SampleRecorder>,
    logs: Option<SessionLogs>,
    stop_pending: bool,
    last_magnitude: Option<f64>,
    last_clock: Option<ClockDisplay>,
    sink: Box<dyn LogSink + Send>,
    display: Box<dyn DisplaySink + Send>,
    clock: Box<dyn Clock + Send>,
}

impl CaptureSession {
    pub fn new(
        config: CaptureConfig,
        sink: Box<dyn LogSink + Send>,
        display: Box<dyn DisplaySink + Send>,
        clock: Box<dyn Clock + Send>,
    ) -> CaptureResult<Self> {
        config.validate()?;

        Ok(CaptureSession {
            filter: HighPassFilter::new(config.alpha)?,
            detector: EventDetector::new(config.threshold, config.edge_delta)?,
            timer: SessionTimer::new(config.countdown(), config.capture())?,
            config,
            recorder: None,
            logs: None,
            stop_pending: false,
            last_magnitude: None,
            last_clock: None,
            sink,
            display,
            clock,
        })
    }

    /// Reset all pipeline state and begin the countdown
    pub fn start(&mut self) -> CaptureResult<()> {
        if self.is_running() {
            return Err(CaptureError::AlreadyRunning);
        }

        self.filter.reset();
        self.detector.reset();
        self.recorder = Some(SampleRecorder::with_capacity(self.config.log_capacity));
        self.logs = None;
        self.stop_pending = false;
        self.last_magnitude = None;
        self.last_clock = None;
        self.timer.start(self.clock.now());

        log::info!(
            "session started: {} ms countdown, {} ms capture",
            self.config.countdown_ms,
            self.config.capture_ms
        );
        Ok(())
    }

    /// Start when idle, stop when running
    pub fn toggle(&mut self) -> CaptureResult<Option<SessionSummary>> {
        if self.is_running() {
            Ok(self.stop())
        } else {
            self.start()?;
            Ok(None)
        }
    }

    /// Feed one sample. Samples are only processed while recording.
    ///
    /// Accelerometer samples go through the high-pass filter and the event
    /// detector; only accepted ones are displayed and recorded. Magnetic field
    /// samples are recorded as-is. Returns the detection for accepted
    /// accelerometer samples.
    pub fn ingest(&mut self, kind: SensorKind, sample: Sample) -> Option<Detection> {
        if self.timer.phase() != Phase::Recording {
            return None;
        }
        let recorder = self.recorder.as_mut()?;

        match kind {
            SensorKind::Accelerometer => {
                let filtered = self.filter.filter(&sample);
                let detection = self.detector.observe(&filtered)?;

                self.display.show_magnitude(detection.display_magnitude);
                self.last_magnitude = Some(detection.display_magnitude);
                recorder.record_acceleration(&filtered);
                Some(detection)
            }
            SensorKind::MagneticField => {
                recorder.record_magnetic_field(&sample);
                None
            }
        }
    }

    /// Like `ingest`, but stamps the sample with the wall clock at arrival
    pub fn ingest_arrival(&mut self, kind: SensorKind, sample: Sample) -> Option<Detection> {
        let stamped = Sample {
            timestamp_ms: self.clock.epoch_millis(),
            ..sample
        };
        self.ingest(kind, stamped)
    }

    /// Advance the timer and update the display.
    ///
    /// The tick that closes the capture window only raises the stop; the
    /// flush and hand-off happen on the next tick so the final clock value
    /// reaches the display first.
    pub fn tick(&mut self) -> TickOutcome {
        if self.stop_pending {
            return match self.stop() {
                Some(summary) => TickOutcome::Stopped(summary),
                None => TickOutcome::Inactive,
            };
        }

        let tick = match self.timer.tick(self.clock.now()) {
            Some(tick) => tick,
            None => return TickOutcome::Inactive,
        };

        self.display.show_clock(&tick.display);
        self.last_clock = Some(tick.display);
        if tick.stop_requested {
            self.stop_pending = true;
        }
        TickOutcome::Running(tick)
    }

    /// Halt ingestion, flush the logs and hand them to the sink.
    /// Returns `None` if no session is running.
    pub fn stop(&mut self) -> Option<SessionSummary> {
        let recorder = self.recorder.take()?;
        self.timer.finish();
        self.stop_pending = false;

        let logs = recorder.flush();
        let stopped_at_ms = self.clock.epoch_millis();
        log::info!(
            "session stopped: {} acceleration records, {} magnetic records, {} events",
            logs.acceleration().len(),
            logs.magnetic_field().len(),
            self.detector.event_count()
        );

        let summary = SessionSummary {
            stopped_at_ms,
            acceleration_file: acceleration_filename(stopped_at_ms),
            magnetic_file: magnetic_field_filename(stopped_at_ms),
            acceleration_records: logs.acceleration().len(),
            magnetic_records: logs.magnetic_field().len(),
            event_count: self.detector.event_count(),
        };

        // Storage failures stay with the sink; the logs are already final
        if let Err(e) = self
            .sink
            .persist(&logs.acceleration_csv(), &summary.acceleration_file)
        {
            log::warn!("failed to persist {}: {}", summary.acceleration_file, e);
        }
        if let Err(e) = self
            .sink
            .persist(&logs.magnetic_field_csv(), &summary.magnetic_file)
        {
            log::warn!("failed to persist {}: {}", summary.magnetic_file, e);
        }

        self.logs = Some(logs);
        Some(summary)
    }

    /// True between `start` and `stop`
    pub fn is_running(&self) -> bool {
        self.recorder.is_some()
    }

    pub fn phase(&self) -> Phase {
        self.timer.phase()
    }

    pub fn event_count(&self) -> u64 {
        self.detector.event_count()
    }

    /// Logs of the last stopped session
    pub fn logs(&self) -> Option<&SessionLogs> {
        self.logs.as_ref()
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn status(&self) -> CaptureStatus {
        let (acceleration_records, magnetic_records) = match (&self.recorder, &self.logs) {
            (Some(recorder), _) => recorder.len(),
            (None, Some(logs)) => (logs.acceleration().len(), logs.magnetic_field().len()),
            (None, None) => (0, 0),
        };

        CaptureStatus {
            phase: self.timer.phase(),
            event_count: self.detector.event_count(),
            acceleration_records,
            magnetic_records,
            display_magnitude: self.last_magnitude,
            clock: self.last_clock.map(|c| c.to_string()),
            recording_ms: self.timer.elapsed_recording().as_millis() as u64,
            stopped: self.logs.is_some(),
        }
    }
}
