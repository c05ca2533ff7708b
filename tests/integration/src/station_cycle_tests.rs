//! The periodic polling cycle over the assembled stack.

use crate::test_utils::*;
use rangelink_codec::{CommandType, FaultFlag};
use rangelink_roster::{JoystickInput, ReportedState};
use rangelink_scheduler::{PollScheduler, TelemetryReceiver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn scheduler(
    link: &Arc<rangelink_link::Link>,
    context: &Arc<rangelink_roster::StationContext>,
) -> PollScheduler {
    PollScheduler::new(Arc::clone(link), Arc::clone(context), ms(1), ms(5))
}

#[test]
fn test_three_full_cycles_poll_everyone_equally() {
    let (link, context, handle) = test_stack();
    let mut scheduler = scheduler(&link, &context);

    for _ in 0..24 {
        scheduler.tick();
    }

    assert_eq!(handle.write_count(), 24);
    // Byte 5 of the control frame names the active robot; ids repeat in
    // strict roster order.
    let actives: Vec<u8> = handle.writes().iter().map(|frame| frame[5]).collect();
    for (tick, active) in actives.iter().enumerate() {
        assert_eq!(*active, (tick % 8) as u8 + 1);
    }
    for id in 1..=8u8 {
        assert_eq!(context.roster.lock(id).unwrap().messages_sent, 3);
    }
}

#[test]
fn test_reply_in_slot_accrues_comm_quality() {
    let (link, context, handle) = test_stack();
    let mut scheduler = scheduler(&link, &context);

    // Robot 2 answers during its granted window on the first tick; everyone
    // else stays silent for the whole cycle.
    handle.push_reply(system_reply(2, 2, 0));
    for _ in 0..8 {
        scheduler.tick();
    }

    let record = context.roster.lock(2).unwrap();
    assert_eq!(record.reported_state, ReportedState::RemoteControl);
    assert_eq!(record.messages_received, 1);
    assert!(record.comm_quality() > 0.0);
    drop(record);

    for id in [1u8, 3, 4, 5, 6, 7, 8] {
        let record = context.roster.lock(id).unwrap();
        assert_eq!(record.messages_received, 0);
        assert_eq!(record.comm_quality(), 0.0);
    }
}

#[test]
fn test_reported_faults_reach_the_roster() {
    let (link, context, handle) = test_stack();
    let mut scheduler = scheduler(&link, &context);

    // Bit 0 is the first drive motor, bit 4 the radio hardware fault.
    handle.push_reply(system_reply(2, 2, 0x0011));
    scheduler.tick();

    let record = context.roster.lock(2).unwrap();
    assert_eq!(
        record.faults,
        vec![FaultFlag::Motor1, FaultFlag::RadioHardware]
    );
}

#[test]
fn test_control_frame_carries_current_joystick() {
    let (link, context, handle) = test_stack();
    let mut scheduler = scheduler(&link, &context);

    context.set_joystick(JoystickInput {
        x: 40,
        y: -60,
        z: 5,
        buttons: 2,
    });
    scheduler.tick();

    let frame = &handle.writes()[0];
    assert_eq!(frame[4], CommandType::Request.code());
    assert_eq!(&frame[12..14], &40i16.to_le_bytes());
    assert_eq!(&frame[14..16], &(-60i16).to_le_bytes());
    assert_eq!(&frame[16..18], &5i16.to_le_bytes());
    assert_eq!(frame[18], 2);
}

#[test]
fn test_scheduler_and_receiver_stop_cooperatively() {
    let (link, context, handle) = test_stack();
    handle.set_responder(agreeable_robot(4));

    let stop = Arc::new(AtomicBool::new(false));
    let scheduler = scheduler(&link, &context);
    let receiver = TelemetryReceiver::new(Arc::clone(&link), Arc::clone(&context), ms(2));

    let scheduler_thread = scheduler.spawn(Arc::clone(&stop)).unwrap();
    let receiver_thread = receiver.spawn(Arc::clone(&stop)).unwrap();
    thread::sleep(ms(50));
    stop.store(true, Ordering::SeqCst);
    scheduler_thread.join().unwrap();
    receiver_thread.join().unwrap();

    // The responding robot was credited with its replies.
    assert!(context.roster.lock(4).unwrap().messages_received > 0);
    assert!(handle.write_count() > 0);
}
