use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::error::{CaptureError, CaptureResult};

/// Time source for the session: monotonic for phase accounting, wall clock
/// for record timestamps and log filenames.
pub trait Clock {
    fn now(&self) -> Instant;
    fn epoch_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Session timer phases. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Countdown,
    Recording,
    Finished,
}

/// Displayed timer value, rendered as `minutes:SS:mmm`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockDisplay {
    pub millis: u64,
}

impl ClockDisplay {
    pub fn from_millis(millis: u64) -> Self {
        Self { millis }
    }
}

impl fmt::Display for ClockDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_seconds = self.millis / 1000;
        write!(
            f,
            "{}:{:02}:{:03}",
            total_seconds / 60,
            total_seconds % 60,
            self.millis % 1000
        )
    }
}

/// What a single tick produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub phase: Phase,
    pub display: ClockDisplay,
    /// Set on the tick that finished the capture window
    pub stop_requested: bool,
}

/// Countdown-then-record state machine.
///
/// While counting down the displayed value runs from the countdown length to
/// zero; once the countdown has elapsed it runs upward from zero, measuring
/// time spent recording. All accounting uses the monotonic clock passed to
/// `tick`, never the number of ticks.
pub struct SessionTimer {
    countdown_ms: u64,
    capture_ms: u64,
    started_at: Option<Instant>,
    elapsed_recording_ms: u64,
    phase: Phase,
}

impl SessionTimer {
    pub fn new(countdown: Duration, capture: Duration) -> CaptureResult<Self> {
        let countdown_ms = countdown.as_millis() as u64;
        let capture_ms = capture.as_millis() as u64;
        if countdown_ms == 0 || capture_ms == 0 {
            return Err(CaptureError::InvalidConfig(format!(
                "timer durations must be positive, got countdown {} ms / capture {} ms",
                countdown_ms, capture_ms
            )));
        }

        Ok(SessionTimer {
            countdown_ms,
            capture_ms,
            started_at: None,
            elapsed_recording_ms: 0,
            phase: Phase::Idle,
        })
    }

    /// Begin the countdown at `now`, discarding any previous run
    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.elapsed_recording_ms = 0;
        self.phase = Phase::Countdown;
    }

    /// Advance to `now`. Returns `None` when idle or finished.
    pub fn tick(&mut self, now: Instant) -> Option<Tick> {
        let started_at = match (self.phase, self.started_at) {
            (Phase::Countdown | Phase::Recording, Some(t)) => t,
            _ => return None,
        };

        let elapsed_ms = now.saturating_duration_since(started_at).as_millis() as u64;

        let shown_ms = if self.countdown_ms > elapsed_ms {
            self.countdown_ms - elapsed_ms
        } else {
            if self.phase == Phase::Countdown {
                self.phase = Phase::Recording;
                log::info!("countdown complete, recording for {} ms", self.capture_ms);
            }
            let recording_ms = elapsed_ms - self.countdown_ms;
            self.elapsed_recording_ms = recording_ms;
            recording_ms
        };

        let mut stop_requested = false;
        if self.phase == Phase::Recording && shown_ms > self.capture_ms {
            self.phase = Phase::Finished;
            stop_requested = true;
            log::info!("capture window elapsed after {} ms", shown_ms);
        }

        Some(Tick {
            phase: self.phase,
            display: ClockDisplay::from_millis(shown_ms),
            stop_requested,
        })
    }

    /// Force the terminal phase (manual stop)
    pub fn finish(&mut self) {
        self.phase = Phase::Finished;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Time spent in the recording phase as of the latest tick
    pub fn elapsed_recording(&self) -> Duration {
        Duration::from_millis(self.elapsed_recording_ms)
    }

    pub fn countdown(&self) -> Duration {
        Duration::from_millis(self.countdown_ms)
    }

    pub fn capture(&self) -> Duration {
        Duration::from_millis(self.capture_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer() -> SessionTimer {
        SessionTimer::new(Duration::from_millis(10_000), Duration::from_millis(10_000)).unwrap()
    }

    fn at(start: Instant, ms: u64) -> Instant {
        start + Duration::from_millis(ms)
    }

    #[test]
    fn test_idle_timer_does_not_tick() {
        let mut t = timer();
        assert_eq!(t.phase(), Phase::Idle);
        assert!(t.tick(Instant::now()).is_none());
    }

    #[test]
    fn test_countdown_then_recording_then_finished() {
        let mut t = timer();
        let start = Instant::now();
        t.start(start);

        let tick = t.tick(start).unwrap();
        assert_eq!(tick.phase, Phase::Countdown);
        assert_eq!(tick.display.millis, 10_000);

        let tick = t.tick(at(start, 2_500)).unwrap();
        assert_eq!(tick.phase, Phase::Countdown);
        assert_eq!(tick.display.millis, 7_500);

        let tick = t.tick(at(start, 10_000)).unwrap();
        assert_eq!(tick.phase, Phase::Recording);
        assert_eq!(tick.display.millis, 0);

        let tick = t.tick(at(start, 15_250)).unwrap();
        assert_eq!(tick.phase, Phase::Recording);
        assert_eq!(tick.display.millis, 5_250);
        assert_eq!(t.elapsed_recording(), Duration::from_millis(5_250));

        // exactly at the end of the window is still recording
        let tick = t.tick(at(start, 20_000)).unwrap();
        assert_eq!(tick.phase, Phase::Recording);
        assert!(!tick.stop_requested);

        let tick = t.tick(at(start, 20_001)).unwrap();
        assert_eq!(tick.phase, Phase::Finished);
        assert_eq!(tick.display.to_string(), "0:10:001");
        assert!(tick.stop_requested);

        assert!(t.tick(at(start, 20_002)).is_none());
    }

    #[test]
    fn test_late_first_tick_skips_straight_to_finished() {
        let mut t = timer();
        let start = Instant::now();
        t.start(start);

        let tick = t.tick(at(start, 25_000)).unwrap();
        assert_eq!(tick.phase, Phase::Finished);
        assert!(tick.stop_requested);
    }

    #[test]
    fn test_finish_is_terminal() {
        let mut t = timer();
        let start = Instant::now();
        t.start(start);
        t.finish();
        assert_eq!(t.phase(), Phase::Finished);
        assert!(t.tick(at(start, 12_000)).is_none());
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(SessionTimer::new(Duration::ZERO, Duration::from_secs(1)).is_err());
        assert!(SessionTimer::new(Duration::from_secs(1), Duration::ZERO).is_err());
    }

    #[test]
    fn test_clock_display_format() {
        assert_eq!(ClockDisplay::from_millis(10_000).to_string(), "0:10:000");
        assert_eq!(ClockDisplay::from_millis(7).to_string(), "0:00:007");
        assert_eq!(ClockDisplay::from_millis(61_042).to_string(), "1:01:042");
        assert_eq!(ClockDisplay::from_millis(3_600_000).to_string(), "60:00:000");
    }
}
