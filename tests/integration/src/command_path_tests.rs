//! Operator command paths through the assembled stack.

use crate::test_utils::*;
use rangelink_codec::{CommandType, STATION_TAG};
use rangelink_control::Commander;
use rangelink_link::{LinkAddress, LinkError};
use rangelink_roster::ReportedState;
use rangelink_scheduler::PollScheduler;
use std::sync::Arc;

fn commander(link: &Arc<rangelink_link::Link>) -> Commander {
    Commander::new(Arc::clone(link), TEST_SESSION, ms(50)).with_settle(ms(1))
}

#[test]
fn test_system_query_round_trip() {
    let (link, _context, handle) = test_stack();
    handle.push_reply(system_reply(3, 2, 0));
    let commander = commander(&link);

    let status = commander.query_system().unwrap();
    assert_eq!(status.client_id, 3);
    assert_eq!(ReportedState::from_code(status.state), ReportedState::RemoteControl);

    let frame = &handle.writes()[0];
    assert_eq!(frame[0], STATION_TAG);
    assert_eq!(frame[1], 2);
    assert_eq!(frame[2], (TEST_SESSION & 0xFF) as u8);
    assert_eq!(frame[3], (TEST_SESSION >> 8) as u8);
    assert_eq!(frame[4], CommandType::System.code());
}

#[test]
fn test_drive_frame_axis_encoding() {
    let (link, _context, handle) = test_stack();
    handle.set_responder(agreeable_robot(1));
    let commander = commander(&link);

    assert!(commander.drive(50, -25, 0, 1).unwrap());
    let frame = &handle.writes()[0];
    assert_eq!(frame[4], CommandType::Joystick.code());
    // Axes offset by +100 into single bytes, buttons verbatim.
    assert_eq!(&frame[6..], &[150, 75, 100, 1]);
}

#[test]
fn test_query_timeout_leaves_clean_link() {
    let (link, _context, handle) = test_stack();
    handle.push_timeout();
    let commander = commander(&link);

    let err = commander.query_battery().unwrap_err();
    assert!(matches!(
        err,
        rangelink_control::ControlError::Link(LinkError::Timeout)
    ));
    assert_eq!(handle.write_count(), 1);
    assert_eq!(link.pending_requests(), 0);
}

#[test]
fn test_stop_forces_zeroed_drive_frame() {
    let (link, _context, handle) = test_stack();
    handle.set_responder(agreeable_robot(1));
    let commander = commander(&link);

    commander.drive(90, 90, 0, 0).unwrap();
    commander.stop().unwrap();

    let writes = handle.writes();
    let stop_frame = writes.last().unwrap();
    assert_eq!(stop_frame[4], CommandType::Joystick.code());
    assert_eq!(&stop_frame[6..], &[100, 100, 100, 0]);
    assert_eq!(link.pending_requests(), 0);
}

#[test]
fn test_stop_keeps_pinned_target_while_scheduler_rotates() {
    let (link, context, handle) = test_stack();
    handle.set_responder(agreeable_robot(1));
    for id in 1..=8u8 {
        context.roster.lock(id).unwrap().address = Some(LinkAddress([0, 0, id]));
    }
    let commander = commander(&link);
    commander.set_target(Some(LinkAddress([0, 0, 1])));

    // The scheduler walks the roster while the operator is pinned to
    // robot 1.
    let mut scheduler = PollScheduler::new(Arc::clone(&link), Arc::clone(&context), ms(1), ms(5));
    for _ in 0..3 {
        scheduler.tick();
    }
    commander.stop().unwrap();

    let destinations = handle.destinations();
    // Three polls went to robots 1..3; the stop still goes to robot 1.
    assert_eq!(destinations[2], Some(LinkAddress([0, 0, 3])));
    assert_eq!(*destinations.last().unwrap(), Some(LinkAddress([0, 0, 1])));
}

#[test]
fn test_select_target_layout_on_wire() {
    let (link, _context, handle) = test_stack();
    handle.set_responder(agreeable_robot(1));
    let commander = commander(&link);

    commander.select_target(5).unwrap();
    let frame = &handle.writes()[0];
    assert_eq!(frame[4], CommandType::SelectTarget.code());
    assert_eq!(frame[6], 5);
}

#[test]
fn test_riser_commands_round_trip() {
    let (link, _context, handle) = test_stack();
    handle.set_responder(agreeable_robot(1));
    let commander = commander(&link);

    commander.riser_up().unwrap();
    commander.riser_half().unwrap();
    commander.riser_down().unwrap();

    let codes: Vec<u8> = handle.writes().iter().map(|frame| frame[4]).collect();
    assert_eq!(
        codes,
        vec![
            CommandType::Up.code(),
            CommandType::HalfRaise.code(),
            CommandType::Down.code(),
        ]
    );
}
