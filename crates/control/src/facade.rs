//! Operator command facade.
//!
//! One thin method per operator action. Every method builds a frame, runs a
//! single round trip through the link and decodes the paired reply; errors
//! and timeouts propagate to the caller unmodified, with no retry layer.

use crate::error::ControlResult;
use rangelink_codec::{
    BatteryStatus, CommandType, Frame, GpsStatus, HitStatus, ScenarioInfo, SystemStatus,
    UploadRequestInfo,
};
use rangelink_link::{Link, LinkAddress};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Cycle byte stamped into one-shot commands.
const COMMAND_CYCLE: u8 = 1;

/// Cycle byte marking an inventory query as out-of-schedule.
const INVENTORY_CYCLE: u8 = 255;

/// Upload announcements carry the null session until a slot is granted.
const ANNOUNCE_SESSION: u16 = 0;

/// Pause after a power toggle before the drive electronics settle.
const POWER_SETTLE: Duration = Duration::from_secs(5);

/// Direct command interface to one pinned robot.
///
/// The target address is latched with [`Commander::set_target`] and stamped
/// onto every request this facade issues, independent of whatever the
/// polling scheduler is addressing at the time.
pub struct Commander {
    link: Arc<Link>,
    session: u16,
    timeout: Duration,
    settle: Duration,
    sent_zero: AtomicBool,
    target: Mutex<Option<LinkAddress>>,
}

impl Commander {
    /// Facade over a link with the default reply window and settle pause.
    pub fn new(link: Arc<Link>, session: u16, timeout: Duration) -> Commander {
        Commander {
            link,
            session,
            timeout,
            settle: POWER_SETTLE,
            sent_zero: AtomicBool::new(false),
            target: Mutex::new(None),
        }
    }

    /// Override the post-power-toggle settle pause (shortened in tests).
    pub fn with_settle(mut self, settle: Duration) -> Commander {
        self.settle = settle;
        self
    }

    /// Session id stamped into every frame this facade builds.
    pub fn session(&self) -> u16 {
        self.session
    }

    /// Pin the robot every subsequent command is addressed to.
    ///
    /// `None` falls back to the transport's broadcast behavior.
    pub fn set_target(&self, target: Option<LinkAddress>) {
        *self.target.lock().unwrap() = target;
    }

    fn target(&self) -> Option<LinkAddress> {
        *self.target.lock().unwrap()
    }

    fn command(&self, command: CommandType) -> ControlResult<Vec<u8>> {
        let frame = Frame::command(command, self.session, COMMAND_CYCLE);
        Ok(self.link.send_and_await(&frame, self.target(), self.timeout)?)
    }

    /// Query system status: reported state and fault bitmask.
    pub fn query_system(&self) -> ControlResult<SystemStatus> {
        Ok(SystemStatus::decode(&self.command(CommandType::System)?)?)
    }

    /// Query the GPS position.
    pub fn query_gps(&self) -> ControlResult<GpsStatus> {
        Ok(GpsStatus::decode(&self.command(CommandType::Gps)?)?)
    }

    /// Query the hit-detection settings.
    pub fn query_hit(&self) -> ControlResult<HitStatus> {
        Ok(HitStatus::decode(&self.command(CommandType::Hit)?)?)
    }

    /// Query battery telemetry.
    pub fn query_battery(&self) -> ControlResult<BatteryStatus> {
        Ok(BatteryStatus::decode(&self.command(CommandType::Battery1)?)?)
    }

    /// Query the stored scenario inventory.
    pub fn query_paths(&self) -> ControlResult<ScenarioInfo> {
        let frame = Frame::command(CommandType::GetScenarioInfo, self.session, INVENTORY_CYCLE);
        let reply = self.link.send_and_await(&frame, self.target(), self.timeout)?;
        Ok(ScenarioInfo::decode(&reply)?)
    }

    /// Announce an upcoming upload and ask for an inventory slot.
    pub fn query_upload_slot(&self) -> ControlResult<UploadRequestInfo> {
        let frame = Frame::command(CommandType::PutScenarioInfo, ANNOUNCE_SESSION, COMMAND_CYCLE);
        let reply = self.link.send_and_await(&frame, self.target(), self.timeout)?;
        Ok(UploadRequestInfo::decode(&reply)?)
    }

    /// Raise the target mast.
    pub fn riser_up(&self) -> ControlResult<()> {
        self.command(CommandType::Up).map(drop)
    }

    /// Lower the target mast.
    pub fn riser_down(&self) -> ControlResult<()> {
        self.command(CommandType::Down).map(drop)
    }

    /// Raise the target mast halfway.
    pub fn riser_half(&self) -> ControlResult<()> {
        self.command(CommandType::HalfRaise).map(drop)
    }

    /// Toggle drive power, then wait for the electronics to settle.
    pub fn power_toggle(&self) -> ControlResult<()> {
        self.command(CommandType::PowerToggle)?;
        thread::sleep(self.settle);
        Ok(())
    }

    /// Send a joystick drive frame.
    ///
    /// Consecutive all-zero inputs are suppressed after the first so a
    /// centred stick does not occupy the channel; returns whether a frame
    /// actually went out.
    pub fn drive(&self, x: i16, y: i16, z: i16, buttons: u8) -> ControlResult<bool> {
        if x == 0 && y == 0 && z == 0 {
            if self.sent_zero.swap(true, Ordering::SeqCst) {
                return Ok(false);
            }
        } else {
            self.sent_zero.store(false, Ordering::SeqCst);
        }
        let frame = Frame::joystick(self.session, COMMAND_CYCLE, x, y, z, buttons);
        self.link.send_and_await(&frame, self.target(), self.timeout)?;
        Ok(true)
    }

    /// Rotate in place: full deflection on the rotational axis only.
    pub fn twist(&self, direction: i16) -> ControlResult<()> {
        let z = direction.signum() * 100;
        let frame = Frame::joystick(self.session, COMMAND_CYCLE, 0, 0, z, 0);
        self.link.send_and_await(&frame, self.target(), self.timeout)?;
        Ok(())
    }

    /// Press or release the selection button via the joystick channel.
    pub fn select_button(&self, pressed: bool) -> ControlResult<()> {
        let frame = Frame::joystick(self.session, COMMAND_CYCLE, 0, 0, 0, pressed as u8);
        self.link.send_and_await(&frame, self.target(), self.timeout)?;
        Ok(())
    }

    /// Emergency stop: flush the queue and force a zeroed drive frame out.
    pub fn stop(&self) -> ControlResult<()> {
        let frame = Frame::joystick(self.session, COMMAND_CYCLE, 0, 0, 0, 0);
        self.link.drain_pending(&frame, self.target(), self.timeout)?;
        Ok(())
    }

    /// Select a target, jumping the queue like a stop.
    pub fn select_target(&self, target: u8) -> ControlResult<()> {
        let frame = Frame::select_target(self.session, COMMAND_CYCLE, target);
        self.link.drain_pending(&frame, self.target(), self.timeout)?;
        Ok(())
    }
}
