use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::time::Duration;

use event_logger::runner::run_session;
use event_logger::sensors;
use event_logger::{
    CaptureConfig, CaptureSession, DirectorySink, LogDisplay, LogOnlySink, LogSink, SensorEvent,
    SystemClock,
};

#[derive(Parser, Debug)]
#[command(name = "event_logger")]
#[command(about = "Timed accelerometer/magnetometer capture with step counting", long_about = None)]
struct Args {
    /// JSON config file (fields not given keep their defaults)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Countdown before recording, in milliseconds
    #[arg(long)]
    countdown_ms: Option<u64>,

    /// Recording window, in milliseconds
    #[arg(long)]
    capture_ms: Option<u64>,

    /// Timer tick interval, in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Period of the simulated sensors, in milliseconds
    #[arg(long, default_value = "5")]
    sample_period_ms: u64,

    /// Output directory for the CSV logs
    #[arg(long, default_value = "event_logs")]
    output_dir: PathBuf,

    /// Log the hand-off instead of writing files
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CaptureConfig::load(path)?,
        None => CaptureConfig::default(),
    };
    if let Some(ms) = args.countdown_ms {
        config.countdown_ms = ms;
    }
    if let Some(ms) = args.capture_ms {
        config.capture_ms = ms;
    }
    if let Some(ms) = args.tick_ms {
        config.tick_interval_ms = ms;
    }
    config.validate()?;

    log::info!("Event Logger starting");
    log::info!("  Countdown: {} ms", config.countdown_ms);
    log::info!("  Capture: {} ms", config.capture_ms);
    log::info!("  Output Dir: {}", args.output_dir.display());

    let sink: Box<dyn LogSink + Send> = if args.dry_run {
        Box::new(LogOnlySink)
    } else {
        Box::new(DirectorySink::new(&args.output_dir))
    };
    let tick_every = config.tick_interval();
    let mut session = CaptureSession::new(config, sink, Box::new(LogDisplay), Box::new(SystemClock))?;

    // Single queue for both sensors; the session loop is its only consumer
    let (tx, rx) = mpsc::channel::<SensorEvent>(500);
    let period = Duration::from_millis(args.sample_period_ms.max(1));
    let step_every = (500 / args.sample_period_ms.max(1)).max(1);
    let accel_handle = tokio::spawn(sensors::accel_loop(tx.clone(), period, step_every));
    let mag_handle = tokio::spawn(sensors::magnetometer_loop(tx.clone(), period));
    drop(tx);

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let summary = run_session(&mut session, rx, tick_every, shutdown).await?;
    accel_handle.abort();
    mag_handle.abort();

    if !args.dry_run {
        std::fs::create_dir_all(&args.output_dir)?;
        let status_path = args.output_dir.join("capture_status.json");
        session.status().save(&status_path)?;
    }

    println!("\n=== Session Summary ===");
    match summary {
        Some(summary) => {
            println!("Steps detected: {}", summary.event_count);
            println!(
                "Acceleration records: {} ({})",
                summary.acceleration_records, summary.acceleration_file
            );
            println!(
                "Magnetic records: {} ({})",
                summary.magnetic_records, summary.magnetic_file
            );
        }
        None => println!("Session ended without recording"),
    }

    Ok(())
}
