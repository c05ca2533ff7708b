//! Unsolicited telemetry intake.

use rangelink_codec::{BatteryStatus, CommandType, GpsStatus, HitStatus, SystemStatus};
use rangelink_link::{Link, LinkError};
use rangelink_roster::StationContext;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Drains telemetry frames that arrive outside a request/reply round trip.
///
/// Robots stream cyclic telemetry during their granted reply windows; frames
/// that land while no request is in flight are picked up here and merged
/// into the roster. Malformed frames are logged and dropped, never fatal.
pub struct TelemetryReceiver {
    link: Arc<Link>,
    context: Arc<StationContext>,
    idle: Duration,
}

impl TelemetryReceiver {
    /// Receiver over a link; `idle` bounds each guarded read.
    pub fn new(link: Arc<Link>, context: Arc<StationContext>, idle: Duration) -> TelemetryReceiver {
        TelemetryReceiver {
            link,
            context,
            idle,
        }
    }

    /// Poll the channel until the stop flag is raised.
    pub fn run(&self, stop: &AtomicBool) {
        while !stop.load(Ordering::SeqCst) {
            match self.link.recv_unsolicited(self.idle) {
                Ok(bytes) => dispatch(&self.context, &bytes),
                Err(LinkError::Timeout) => {}
                Err(e) => {
                    warn!(error = %e, "telemetry read failed");
                    thread::sleep(self.idle);
                }
            }
        }
        debug!("telemetry receiver stopped");
    }

    /// Run the receiver on its own named thread.
    pub fn spawn(self, stop: Arc<AtomicBool>) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("telemetry-receiver".to_string())
            .spawn(move || self.run(&stop))
    }
}

/// Merge one raw telemetry frame into the roster.
///
/// Frames are typed by the echoed command code in byte 0. System status
/// carries its robot id inline; the remaining telemetry types are attributed
/// to whichever robot currently holds the reply window.
pub fn dispatch(context: &StationContext, bytes: &[u8]) {
    let code = match bytes.first() {
        Some(&code) => code,
        None => return,
    };
    let command = match CommandType::from_code(code) {
        Ok(command) => command,
        Err(e) => {
            debug!(error = %e, len = bytes.len(), "unattributable frame dropped");
            return;
        }
    };
    match command {
        CommandType::System => match SystemStatus::decode(bytes) {
            Ok(status) => {
                if let Some(mut record) = context.roster.lock(status.client_id) {
                    record.apply_system(&status);
                    record.note_reply();
                } else {
                    debug!(client = status.client_id, "system status for unknown robot");
                }
            }
            Err(e) => debug!(error = %e, "malformed system status dropped"),
        },
        CommandType::Gps => match GpsStatus::decode(bytes) {
            Ok(status) => merge_slot(context, "gps", |record| record.apply_gps(&status)),
            Err(e) => debug!(error = %e, "malformed gps status dropped"),
        },
        CommandType::Hit => match HitStatus::decode(bytes) {
            Ok(status) => merge_slot(context, "hit", |record| record.apply_hit(&status)),
            Err(e) => debug!(error = %e, "malformed hit status dropped"),
        },
        CommandType::Battery1 | CommandType::Battery2 => match BatteryStatus::decode(bytes) {
            Ok(status) => merge_slot(context, "battery", |record| record.apply_battery(&status)),
            Err(e) => debug!(error = %e, "malformed battery status dropped"),
        },
        other => {
            // Stale acks and command echoes surface here between round
            // trips; nothing to merge.
            trace!(command = ?other, "non-telemetry frame ignored");
        }
    }
}

fn merge_slot<F>(context: &StationContext, kind: &'static str, merge: F)
where
    F: FnOnce(&mut rangelink_roster::RobotRecord),
{
    let slot = context.reply_slot();
    match context.roster.lock(slot) {
        Some(mut record) => {
            merge(&mut record);
            record.note_reply();
        }
        None => debug!(slot, kind, "telemetry with no reply slot holder"),
    }
}
