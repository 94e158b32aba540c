//! Simulated sensor sources.
//!
//! Samples carry the time they were generated. They can wait in the channel
//! before the session sees them; `runner` restamps each one with the arrival
//! time via `CaptureSession::ingest_arrival`.

use std::f32::consts::PI;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tokio::time::{interval, Duration};

use crate::sample::{Sample, SensorEvent};

/// Simulated accelerometer: a device at rest with a forward (+x) jolt every
/// `step_every` samples.
pub async fn accel_loop(tx: Sender<SensorEvent>, period: Duration, step_every: u64) {
    let mut interval = interval(period);
    let mut sample_count = 0u64;

    loop {
        interval.tick().await;

        let sample = mock_accel_sample(sample_count, step_every, now_millis());
        if !forward(&tx, SensorEvent::accelerometer(sample), "accel", &mut sample_count) {
            break;
        }
    }
}

/// Simulated magnetometer with a slowly rotating field
pub async fn magnetometer_loop(tx: Sender<SensorEvent>, period: Duration) {
    let mut interval = interval(period);
    let mut sample_count = 0u64;

    loop {
        interval.tick().await;

        let sample = mock_magnetic_sample(sample_count, now_millis());
        if !forward(&tx, SensorEvent::magnetic_field(sample), "mag", &mut sample_count) {
            break;
        }
    }
}

/// Returns false once the receiver is gone
fn forward(tx: &Sender<SensorEvent>, event: SensorEvent, name: &str, count: &mut u64) -> bool {
    match tx.try_send(event) {
        Ok(_) => {
            *count += 1;
            if *count % 500 == 0 {
                log::debug!("[{}] {} samples", name, count);
            }
            true
        }
        Err(TrySendError::Closed(_)) => {
            log::debug!("[{}] channel closed after {} samples", name, count);
            false
        }
        Err(TrySendError::Full(_)) => {
            // Consumer is behind, drop this sample
            *count += 1;
            true
        }
    }
}

fn mock_accel_sample(seq: u64, step_every: u64, timestamp_ms: i64) -> Sample {
    let t = seq as f32 * 0.02;
    let jolt = if step_every > 0 && seq % step_every == 0 {
        6.0
    } else {
        0.0
    };

    Sample::new(
        jolt + (t * 2.0 * PI).sin() * 0.02,
        (t * 2.0 * PI).cos() * 0.02,
        9.81,
        timestamp_ms,
    )
}

fn mock_magnetic_sample(seq: u64, timestamp_ms: i64) -> Sample {
    let t = seq as f32 * 0.01;
    Sample::new(
        22.0 * t.cos(),
        22.0 * t.sin(),
        -41.5,
        timestamp_ms,
    )
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SensorKind;
    use tokio::sync::mpsc;

    #[test]
    fn test_mock_accel_jolts_on_schedule() {
        assert!(mock_accel_sample(0, 25, 0).x > 5.0);
        assert!(mock_accel_sample(1, 25, 0).x.abs() < 0.1);
        assert!(mock_accel_sample(50, 25, 0).x > 5.0);
        assert!(mock_accel_sample(3, 0, 0).x.abs() < 0.1);
    }

    #[test]
    fn test_mock_magnetic_field_strength_constant() {
        let a = mock_magnetic_sample(0, 0);
        let b = mock_magnetic_sample(400, 0);
        assert!((a.magnitude() - b.magnitude()).abs() < 1e-3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accel_loop_stops_when_receiver_dropped() {
        let (tx, mut rx) = mpsc::channel(8);
        let handle = tokio::spawn(accel_loop(tx, Duration::from_millis(5), 10));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, SensorKind::Accelerometer);
        drop(rx);

        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_channel_drops_samples() {
        let (tx, mut rx) = mpsc::channel(2);
        let handle = tokio::spawn(magnetometer_loop(tx, Duration::from_millis(5)));

        tokio::time::sleep(Duration::from_millis(100)).await;
        let mut received = 0;
        while let Ok(event) = rx.try_recv() {
            assert_eq!(event.kind, SensorKind::MagneticField);
            received += 1;
        }
        assert_eq!(received, 2);

        handle.abort();
    }
}
