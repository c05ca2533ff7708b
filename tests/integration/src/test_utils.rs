//! Test utilities shared by the integration suites.

use rangelink_codec::CommandType;
use rangelink_link::{Link, MockHandle, MockTransport};
use rangelink_roster::StationContext;
use std::sync::Arc;
use std::time::Duration;

/// Session id stamped into every frame the fixtures build.
pub const TEST_SESSION: u16 = 1204;

/// Millisecond shorthand.
pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Assemble a full station stack over a scripted transport.
pub fn test_stack() -> (Arc<Link>, Arc<StationContext>, MockHandle) {
    let (transport, handle) = MockTransport::new();
    let link = Arc::new(Link::new(Box::new(transport)));
    let context = Arc::new(StationContext::new(TEST_SESSION));
    (link, context, handle)
}

/// Raw reply frame with the standard header and an echoed command code.
pub fn reply_frame(command: CommandType, session: u16, payload: &[u8]) -> Vec<u8> {
    let mut buf = vec![command.code(), (payload.len() + 1) as u8];
    buf.push((session & 0xFF) as u8);
    buf.push((session >> 8) as u8);
    buf.extend_from_slice(payload);
    buf
}

/// System status reply from one robot.
pub fn system_reply(client_id: u8, state: u8, faults: u16) -> Vec<u8> {
    reply_frame(
        CommandType::System,
        TEST_SESSION,
        &[client_id, state, (faults & 0xFF) as u8, (faults >> 8) as u8],
    )
}

/// Upload chunk acknowledgment; a zero session word signals acceptance.
pub fn upload_ack(accepted: bool, next_chunk: u8) -> Vec<u8> {
    let session = if accepted { 0 } else { 1 };
    reply_frame(CommandType::UploadScenario, session, &[0, next_chunk])
}

/// Responder closure emulating a robot that accepts every upload chunk and
/// answers other commands with its system status.
pub fn agreeable_robot(client_id: u8) -> impl FnMut(&[u8]) -> Option<Vec<u8>> + Send + 'static {
    move |request: &[u8]| {
        let code = *request.get(4)?;
        match CommandType::from_code(code).ok()? {
            CommandType::UploadScenario => {
                let index = *request.get(7)?;
                Some(upload_ack(true, index.wrapping_add(1)))
            }
            _ => Some(system_reply(client_id, 2, 0)),
        }
    }
}
