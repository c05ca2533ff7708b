mod config;

use anyhow::{anyhow, Context, Result};
use config::StationConfig;
use rangelink_control::Commander;
use rangelink_link::{Link, RadioTransport, SerialTransport, Transport};
use rangelink_roster::StationContext;
use rangelink_scheduler::{PollScheduler, TelemetryReceiver};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Read window of the telemetry receiver between scheduler slots.
const RECEIVER_IDLE: Duration = Duration::from_millis(20);

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = parse_config_path(&args)?;
    let config = StationConfig::load(&config_path)?;
    init_logging(&config.log_level);
    info!(config = %config_path.display(), session = config.session, "station starting");

    let transport = open_transport(&config)?;
    let link = Arc::new(Link::new(transport));
    let context = Arc::new(StationContext::new(config.session));
    for (id, address) in config.addresses()? {
        match context.roster.lock(id) {
            Some(mut record) => record.address = Some(address),
            None => return Err(anyhow!("robot id {id} outside the roster")),
        }
    }

    let timeout = Duration::from_millis(config.link_timeout_ms);
    let commander = Commander::new(Arc::clone(&link), config.session, timeout);
    roll_call(&context, &commander);

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .context("installing signal handler")?;
    }

    let scheduler = PollScheduler::new(
        Arc::clone(&link),
        Arc::clone(&context),
        Duration::from_millis(config.poll_period_ms),
        timeout,
    );
    let receiver = TelemetryReceiver::new(Arc::clone(&link), Arc::clone(&context), RECEIVER_IDLE);
    let scheduler_thread = scheduler
        .spawn(Arc::clone(&stop))
        .context("spawning poll scheduler")?;
    let receiver_thread = receiver
        .spawn(Arc::clone(&stop))
        .context("spawning telemetry receiver")?;
    info!("station running");

    while !stop.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(200));
    }
    info!("shutdown requested, waiting for in-flight round trips");
    scheduler_thread
        .join()
        .map_err(|_| anyhow!("poll scheduler panicked"))?;
    receiver_thread
        .join()
        .map_err(|_| anyhow!("telemetry receiver panicked"))?;
    info!("station stopped");
    Ok(())
}

/// Query every addressed robot once to seed the roster before polling starts.
fn roll_call(context: &StationContext, commander: &Commander) {
    for id in 1..=context.roster.len() as u8 {
        let address = context.roster.lock(id).and_then(|record| record.address);
        let Some(address) = address else { continue };
        commander.set_target(Some(address));
        context.set_reply_slot(id);
        match commander.query_system() {
            Ok(status) => {
                info!(robot = id, state = status.state, "roll call reply");
                if let Some(mut record) = context.roster.lock(id) {
                    record.apply_system(&status);
                    record.note_reply();
                }
            }
            Err(e) => info!(robot = id, error = %e, "no roll call reply"),
        }
    }
}

fn open_transport(config: &StationConfig) -> Result<Box<dyn Transport>> {
    let port = if config.port == "auto" {
        let ports = SerialTransport::available_usb_ports()?;
        let port = ports
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("no USB serial port found"))?;
        info!(port = %port, "autodiscovered serial port");
        port
    } else {
        config.port.clone()
    };
    Ok(if config.api_mode {
        Box::new(RadioTransport::open(&port, config.baud)?)
    } else {
        Box::new(SerialTransport::open(&port, config.baud)?)
    })
}

fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_env("RANGELINK_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn parse_config_path(args: &[String]) -> Result<PathBuf> {
    let mut args_iter = args.iter();
    while let Some(arg) = args_iter.next() {
        if arg == "--config" {
            if let Some(path) = args_iter.next() {
                return Ok(PathBuf::from(path));
            }
            return Err(anyhow!("--config was provided without a path"));
        }
    }
    Err(anyhow!("missing required --config <path> argument"))
}
