//! sniffserpent CLI entry point.

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sniffserpent::cli::{interface_source, write_details, Args, Command, ScanArgs, TerminalSink};
use sniffserpent_core::{
    CaptureEngine, CaptureRequest, CaptureSession, CaptureSource, ReplayEngine, SessionConfig,
};

/// Granularity of the wait between ticks, so Ctrl-C is noticed quickly.
const POLL_STEP: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    match args.command {
        Command::Interfaces => list_interfaces(),
        Command::Replay { file, scan } => {
            if !file.exists() {
                bail!("Capture file not found: {}", file.display());
            }
            run_scan(Arc::new(ReplayEngine), CaptureSource::File(file), &scan)
        }
        Command::Live { interface, scan } => {
            run_scan(live_engine()?, interface_source(interface.as_deref()), &scan)
        }
    }
}

#[cfg(feature = "live")]
fn list_interfaces() -> Result<()> {
    use sniffserpent::cli::interface_label;

    let names = sniffserpent_core::pipeline::list_interfaces()
        .context("Failed to list capture interfaces")?;
    if names.is_empty() {
        eprintln!("No capture interfaces found");
    }
    for name in &names {
        println!("{}", interface_label(name));
    }
    Ok(())
}

#[cfg(not(feature = "live"))]
fn list_interfaces() -> Result<()> {
    bail!("Built without live capture support. Rebuild with --features live")
}

#[cfg(feature = "live")]
fn live_engine() -> Result<Arc<dyn CaptureEngine>> {
    Ok(Arc::new(sniffserpent_core::pipeline::LiveEngine::new()))
}

#[cfg(not(feature = "live"))]
fn live_engine() -> Result<Arc<dyn CaptureEngine>> {
    bail!("Built without live capture support. Rebuild with --features live")
}

fn run_scan(engine: Arc<dyn CaptureEngine>, source: CaptureSource, scan: &ScanArgs) -> Result<()> {
    let request = CaptureRequest::new(source)
        .with_protocols(scan.protocol_filter()?)
        .with_address(scan.address_filter()?);

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("Failed to install Ctrl-C handler")?;

    let config = SessionConfig::default();
    let tick_interval = config.tick_interval;
    let mut session = CaptureSession::new(engine, config);
    info!(source = %request.source, "starting scan");
    session
        .start(request)
        .context("Failed to start capture")?;

    let mut sink = TerminalSink::new(io::stdout().lock());
    loop {
        session.tick(&mut sink);
        sink.check().context("Failed to write output")?;
        if sink.is_finished() {
            break;
        }
        if wait_tick(tick_interval, &interrupted) {
            eprintln!("Stopping scan...");
            session.stop();
            break;
        }
    }
    // Flush whatever the last batches left behind
    while session.pending() > 0 || !sink.is_finished() {
        if session.tick(&mut sink) == 0 && !session.is_running() {
            break;
        }
    }
    sink.check().context("Failed to write output")?;
    let permission_denied = sink.permission_denied();
    let errors = sink.errors().to_vec();
    drop(sink);

    if permission_denied {
        bail!("Permission denied. Please run again with administrative privileges.");
    }
    for reason in &errors {
        eprintln!("An error occurred while sniffing: {reason}");
    }
    info!(packets = session.len(), "scan finished");

    if scan.details {
        write_details(&session.records(), &mut io::stdout().lock())
            .context("Failed to write packet details")?;
    }
    if let Some(path) = &scan.save {
        save(&session, path)?;
    }
    Ok(())
}

/// Sleep for one tick. Returns true if Ctrl-C was pressed meanwhile.
fn wait_tick(interval: Duration, interrupted: &AtomicBool) -> bool {
    let deadline = Instant::now() + interval;
    while Instant::now() < deadline {
        if interrupted.load(Ordering::SeqCst) {
            return true;
        }
        thread::sleep(POLL_STEP);
    }
    interrupted.load(Ordering::SeqCst)
}

fn save(session: &CaptureSession, path: &Path) -> Result<()> {
    session
        .save(path)
        .with_context(|| format!("Failed to save scan to {}", path.display()))?;
    eprintln!("Saved {} packets to {}", session.len(), path.display());
    Ok(())
}
