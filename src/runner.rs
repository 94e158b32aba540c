use tokio::sync::mpsc::Receiver;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::error::CaptureResult;
use crate::sample::SensorEvent;
use crate::session::{CaptureSession, SessionSummary, TickOutcome};

/// Drive one session to completion.
///
/// Timer ticks and sensor events are handled in a single loop, so the
/// session state is only ever touched from here. Returns the summary once the
/// session has stopped, either because the capture window elapsed or because
/// `shutdown` resolved first.
pub async fn run_session<F>(
    session: &mut CaptureSession,
    mut events: Receiver<SensorEvent>,
    tick_every: Duration,
    shutdown: F,
) -> CaptureResult<Option<SessionSummary>>
where
    F: std::future::Future<Output = ()>,
{
    session.start()?;

    let mut ticker = interval(tick_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);
    let mut sensors_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match session.tick() {
                    TickOutcome::Stopped(summary) => return Ok(Some(summary)),
                    TickOutcome::Inactive => return Ok(None),
                    TickOutcome::Running(_) => {}
                }
            }
            event = events.recv(), if sensors_open => {
                match event {
                    Some(event) => {
                        session.ingest_arrival(event.kind, event.sample);
                    }
                    None => {
                        log::warn!("sensor channel closed, continuing on timer only");
                        sensors_open = false;
                    }
                }
            }
            _ = &mut shutdown => {
                log::info!("shutdown requested");
                return Ok(session.stop());
            }
        }
    }
}
