//! Complete route upload sessions over the assembled stack.

use crate::test_utils::*;
use rangelink_codec::CommandType;
use rangelink_control::{ControlError, Route, UploadEngine, Waypoint, RETRY_BUDGET};
use rangelink_scheduler::PollScheduler;
use std::sync::Arc;

fn test_route(waypoints: usize) -> Route {
    let points = (0..waypoints)
        .map(|i| Waypoint {
            x: i as f32 * 10.0,
            y: i as f32 * -5.0,
            flag: 0.0,
        })
        .collect();
    Route::new(
        "perimeter",
        20260830,
        101500,
        [41.9, 12.4, 350.5, 4642.0],
        points,
    )
    .unwrap()
}

#[test]
fn test_full_session_against_agreeable_robot() {
    let (link, context, handle) = test_stack();
    handle.set_responder(agreeable_robot(1));
    let engine = UploadEngine::new(&link, &context, ms(20));

    engine.run(&test_route(3)).unwrap();

    let writes = handle.writes();
    // Nine header chunks, three waypoints, and the final chunk confirmed
    // twice once the payload stream is under way.
    let indices: Vec<u8> = writes.iter().map(|frame| frame[7]).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 11]);
    for frame in &writes {
        assert_eq!(frame[4], CommandType::UploadScenario.code());
        assert_eq!(frame[5], 12, "total chunk count");
        assert_eq!(frame[6], 11, "final chunk index");
    }
    // The channel hold is released once the session ends.
    assert!(!context.transfer_held());
}

#[test]
fn test_route_header_content_on_the_wire() {
    let (link, context, handle) = test_stack();
    handle.set_responder(agreeable_robot(1));
    let engine = UploadEngine::new(&link, &context, ms(20));

    engine.run(&test_route(3)).unwrap();

    let writes = handle.writes();
    // Name halves, padded to six bytes each.
    assert_eq!(&writes[0][8..], b"perime");
    assert_eq!(&writes[1][8..], b"ter\0\0\0");
    // Date and time words.
    assert_eq!(&writes[2][8..12], &20260830u32.to_le_bytes());
    assert_eq!(&writes[2][12..16], &101500u32.to_le_bytes());
    // Waypoint count in the ninth chunk.
    assert_eq!(&writes[8][8..], &[3, 0, 0, 0]);
}

#[test]
fn test_rejection_storm_exhausts_budget() {
    let (link, context, handle) = test_stack();
    handle.set_responder(|_| Some(upload_ack(false, 0)));
    let engine = UploadEngine::new(&link, &context, ms(20));

    let err = engine.run(&test_route(0)).unwrap_err();
    assert!(matches!(
        err,
        ControlError::RetryBudgetExhausted {
            chunk: 0,
            retries: RETRY_BUDGET,
            ..
        }
    ));
    // One transmission per consumed retry, nothing more.
    assert_eq!(handle.write_count(), RETRY_BUDGET as usize);
    assert!(!context.transfer_held());
}

#[test]
fn test_polling_suspended_while_transfer_holds_channel() {
    let (link, context, handle) = test_stack();
    let mut scheduler = PollScheduler::new(Arc::clone(&link), Arc::clone(&context), ms(1), ms(5));

    context.set_transfer_hold(true);
    scheduler.tick();
    assert_eq!(handle.write_count(), 0);

    // A busy channel also refuses a second transfer outright.
    let engine = UploadEngine::new(&link, &context, ms(20));
    assert!(matches!(
        engine.run(&test_route(0)).unwrap_err(),
        ControlError::ChannelBusy
    ));

    context.set_transfer_hold(false);
    scheduler.tick();
    assert_eq!(handle.write_count(), 1);
}

#[test]
fn test_scheduler_resumes_after_session() {
    let (link, context, handle) = test_stack();
    handle.set_responder(agreeable_robot(1));
    let mut scheduler = PollScheduler::new(Arc::clone(&link), Arc::clone(&context), ms(1), ms(5));

    let engine = UploadEngine::new(&link, &context, ms(20));
    engine.run(&test_route(0)).unwrap();
    let uploads = handle.write_count();

    scheduler.tick();
    assert_eq!(handle.write_count(), uploads + 1);
    let poll = handle.writes().pop().unwrap();
    assert_eq!(poll[4], CommandType::Request.code());
}
