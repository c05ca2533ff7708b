//! The fixed-period polling loop.

use crate::receiver::dispatch;
use rangelink_codec::Frame;
use rangelink_link::{Link, LinkError};
use rangelink_roster::{JoystickInput, RadioState, StationContext};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Default slot period of the polling cycle.
pub const POLL_PERIOD: Duration = Duration::from_millis(100);

/// Round-robin poller giving every roster member one command slot and one
/// reply slot per eight-tick cycle.
///
/// Each tick addresses the active robot with the current control frame and
/// grants the next roster member the reply window. A silent robot costs one
/// missed slot in its comm window and nothing else; the cycle never stalls
/// on a single member.
pub struct PollScheduler {
    link: Arc<Link>,
    context: Arc<StationContext>,
    period: Duration,
    timeout: Duration,
    cycle: u64,
}

impl PollScheduler {
    /// Scheduler over a link; `timeout` bounds each round trip and must be
    /// shorter than `period` for the loop to hold its rate.
    pub fn new(
        link: Arc<Link>,
        context: Arc<StationContext>,
        period: Duration,
        timeout: Duration,
    ) -> PollScheduler {
        PollScheduler {
            link,
            context,
            period,
            timeout,
            cycle: 0,
        }
    }

    /// Run ticks at the fixed period until the stop flag is raised.
    ///
    /// Non-reentrant: an overrunning tick delays the next one, two ticks
    /// never overlap.
    pub fn run(&mut self, stop: &AtomicBool) {
        let mut next = Instant::now();
        while !stop.load(Ordering::SeqCst) {
            self.tick();
            next += self.period;
            let now = Instant::now();
            if next <= now {
                trace!(behind = ?(now - next), "tick overran its slot");
                next = now;
            } else {
                thread::sleep(next - now);
            }
        }
        debug!("poll scheduler stopped");
    }

    /// Run the scheduler on its own named thread.
    pub fn spawn(mut self, stop: Arc<AtomicBool>) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("poll-scheduler".to_string())
            .spawn(move || self.run(&stop))
    }

    /// One scheduling slot.
    pub fn tick(&mut self) {
        let radio_state = self.context.radio_state();
        if self.context.transfer_held() || !radio_state.is_cyclic() {
            return;
        }
        let roster = &self.context.roster;
        let position = self.cycle as usize;
        let active = roster.id_at(position);
        let responder = roster.id_at(position + 1);
        self.cycle += 1;

        let (frame, destination) = {
            let record = match roster.lock(active) {
                Some(record) => record,
                None => return,
            };
            let frame = match radio_state {
                RadioState::Formation => Frame::formation_poll(
                    self.context.session,
                    active,
                    responder,
                    self.cycle as u16,
                    record.state.code(),
                    record.formation_offset[0],
                    record.formation_offset[1],
                ),
                _ => {
                    let stick = if self.context.menu_mode() {
                        JoystickInput::default()
                    } else {
                        self.context.joystick()
                    };
                    Frame::control_poll(
                        self.context.session,
                        active,
                        responder,
                        self.cycle as u16,
                        record.state.code(),
                        record.hit_threshold,
                        record.hit_time_limit,
                        stick.x,
                        stick.y,
                        stick.z,
                        stick.buttons,
                    )
                }
            };
            (frame, record.address)
        };

        // A transfer may have claimed the channel while the frame was built.
        if self.context.transfer_held() {
            return;
        }
        self.context.set_reply_slot(responder);
        match self.link.send_and_await(&frame, destination, self.timeout) {
            Ok(bytes) => dispatch(&self.context, &bytes),
            Err(LinkError::Timeout) => {
                trace!(robot = active, "no traffic in this slot")
            }
            Err(e) => warn!(robot = active, error = %e, "poll round trip failed"),
        }

        if let Some(mut record) = roster.lock(responder) {
            record.note_polled();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangelink_codec::CommandType;
    use rangelink_link::{LinkAddress, MockHandle, MockTransport};
    use rangelink_roster::ReportedState;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn scheduler() -> (PollScheduler, Arc<StationContext>, MockHandle) {
        let (transport, handle) = MockTransport::new();
        let link = Arc::new(Link::new(Box::new(transport)));
        let context = Arc::new(StationContext::new(1204));
        let scheduler = PollScheduler::new(link, Arc::clone(&context), ms(1), ms(5));
        (scheduler, context, handle)
    }

    #[test]
    fn test_round_robin_over_eight_ticks() {
        let (mut scheduler, context, handle) = scheduler();
        for id in 1..=8u8 {
            context.roster.lock(id).unwrap().address = Some(LinkAddress([0, 0, id]));
        }
        for _ in 0..8 {
            scheduler.tick();
        }
        // Every member was addressed exactly once, in roster order.
        let destinations: Vec<_> = handle.destinations();
        assert_eq!(destinations.len(), 8);
        for (index, destination) in destinations.iter().enumerate() {
            assert_eq!(*destination, Some(LinkAddress([0, 0, index as u8 + 1])));
        }
        // And every member held the reply slot exactly once.
        for id in 1..=8u8 {
            assert_eq!(context.roster.lock(id).unwrap().messages_sent, 1);
        }
    }

    #[test]
    fn test_control_frame_carries_joystick() {
        let (mut scheduler, context, handle) = scheduler();
        context.set_joystick(JoystickInput {
            x: 50,
            y: -25,
            z: 0,
            buttons: 1,
        });
        scheduler.tick();
        let frame = &handle.writes()[0];
        assert_eq!(frame[4], CommandType::Request.code());
        // Axes ride as 16-bit little-endian words after the state block.
        assert_eq!(&frame[12..14], &50i16.to_le_bytes());
        assert_eq!(&frame[14..16], &(-25i16).to_le_bytes());
    }

    #[test]
    fn test_menu_mode_zeroes_axes() {
        let (mut scheduler, context, handle) = scheduler();
        context.set_joystick(JoystickInput {
            x: 80,
            y: 80,
            z: 80,
            buttons: 0,
        });
        context.set_menu_mode(true);
        scheduler.tick();
        let frame = &handle.writes()[0];
        assert_eq!(&frame[12..14], &0i16.to_le_bytes());
        assert_eq!(&frame[14..16], &0i16.to_le_bytes());
        assert_eq!(&frame[16..18], &0i16.to_le_bytes());
    }

    #[test]
    fn test_formation_frame_carries_offsets() {
        let (mut scheduler, context, handle) = scheduler();
        context.set_radio_state(RadioState::Formation);
        context.roster.lock(1).unwrap().formation_offset = [2.5, -4.0];
        scheduler.tick();
        let frame = &handle.writes()[0];
        assert_eq!(&frame[10..14], &2.5f32.to_le_bytes());
        assert_eq!(&frame[14..18], &(-4.0f32).to_le_bytes());
    }

    #[test]
    fn test_transfer_hold_suspends_polling() {
        let (mut scheduler, context, handle) = scheduler();
        context.set_transfer_hold(true);
        scheduler.tick();
        assert_eq!(handle.write_count(), 0);
        context.set_transfer_hold(false);
        scheduler.tick();
        assert_eq!(handle.write_count(), 1);
    }

    #[test]
    fn test_non_cyclic_state_suspends_polling() {
        let (mut scheduler, context, handle) = scheduler();
        context.set_radio_state(RadioState::Upload);
        scheduler.tick();
        assert_eq!(handle.write_count(), 0);
    }

    #[test]
    fn test_slot_reply_merged_and_counted() {
        let (mut scheduler, context, handle) = scheduler();
        // Tick 0 grants robot 2 the reply slot; it answers with its system
        // status during the round trip.
        handle.push_reply(vec![
            CommandType::System.code(),
            5,
            0xB4,
            0x04,
            2,
            2,
            0,
            0,
        ]);
        scheduler.tick();
        let record = context.roster.lock(2).unwrap();
        assert_eq!(record.reported_state, ReportedState::RemoteControl);
        assert_eq!(record.messages_received, 1);
        assert_eq!(record.messages_sent, 1);
        // The reply landed inside robot 2's slot, so its window records a hit.
        assert!(record.comm_quality() > 0.0);
    }

    #[test]
    fn test_silent_slot_recorded_as_miss() {
        let (mut scheduler, context, _handle) = scheduler();
        for _ in 0..8 {
            scheduler.tick();
        }
        for id in 1..=8u8 {
            assert_eq!(context.roster.lock(id).unwrap().comm_quality(), 0.0);
        }
    }
}
