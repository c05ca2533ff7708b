//! Chunked route upload state machine.
//!
//! The upload claims the channel through the shared context, streams the
//! route's chunks in order and tracks a retry budget. Header chunks advance
//! on a single acceptance; once the waypoint stream is under way each chunk
//! after the first must be confirmed twice before the next one goes out.
//! Any acceptance clears the retry count, so the budget bounds consecutive
//! failures rather than total failures.

use crate::error::{ControlError, ControlResult};
use crate::route::Route;
use rangelink_codec::UploadAck;
use rangelink_link::{Link, LinkAddress, LinkError};
use rangelink_roster::StationContext;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Consecutive failures tolerated before the session is abandoned.
pub const RETRY_BUDGET: u32 = 20;

/// Chunk index where double-confirmation begins.
///
/// One past the first waypoint chunk: the opening waypoint still rides on
/// header acknowledgment rules.
const PAYLOAD_PHASE_START: usize = 10;

/// Buffered reads dropped after a rejected header chunk.
const STRAY_FLUSH_READS: usize = 2;

/// Streams one route to a pinned robot.
pub struct UploadEngine<'a> {
    link: &'a Link,
    context: &'a StationContext,
    timeout: Duration,
    destination: Option<LinkAddress>,
}

/// Releases the channel hold when the engine returns, early or not.
struct HoldGuard<'a>(&'a StationContext);

impl Drop for HoldGuard<'_> {
    fn drop(&mut self) {
        self.0.set_transfer_hold(false);
    }
}

impl<'a> UploadEngine<'a> {
    /// Engine over a link and the shared context whose channel hold it claims.
    pub fn new(link: &'a Link, context: &'a StationContext, timeout: Duration) -> UploadEngine<'a> {
        UploadEngine {
            link,
            context,
            timeout,
            destination: None,
        }
    }

    /// Pin the robot every chunk of this session is addressed to.
    pub fn with_destination(mut self, destination: LinkAddress) -> UploadEngine<'a> {
        self.destination = Some(destination);
        self
    }

    /// Upload the whole route.
    ///
    /// Succeeds only when the final chunk went out with no retries
    /// outstanding; a session that limps over the line on its last retry
    /// reports [`ControlError::UploadIncomplete`] so the operator re-sends
    /// rather than trusting a half-confirmed scenario.
    pub fn run(&self, route: &Route) -> ControlResult<()> {
        if self.context.transfer_held() {
            return Err(ControlError::ChannelBusy);
        }
        self.context.set_transfer_hold(true);
        let _hold = HoldGuard(self.context);

        let frames = route.chunks(self.context.session)?;
        let total = frames.len();
        info!(route = route.name(), chunks = total, "starting route upload");

        let mut index = 0usize;
        let mut retries = 0u32;
        let mut confirmed = false;
        while index < total && retries < RETRY_BUDGET {
            let ack = match self.link.send_and_await(&frames[index], self.destination, self.timeout) {
                Ok(bytes) => UploadAck::decode(&bytes).ok(),
                Err(LinkError::Timeout) | Err(LinkError::Unanswered) => None,
                Err(e) => return Err(e.into()),
            };
            let payload_phase = index >= PAYLOAD_PHASE_START;
            match ack {
                None if index == total - 1 => {
                    // The closing acknowledgment is routinely lost while the
                    // robot commits the scenario; tolerate it.
                    debug!(chunk = index, "no readable ack for final chunk, closing session");
                    index += 1;
                    break;
                }
                None => {
                    retries += 1;
                    confirmed = false;
                    warn!(chunk = index, retries, "chunk unacknowledged, resending");
                }
                Some(ack) if !ack.accepted() => {
                    retries += 1;
                    confirmed = false;
                    warn!(chunk = index, retries, ack = ack.ack, "chunk rejected, resending");
                    if !payload_phase {
                        self.link.discard_stray(STRAY_FLUSH_READS, self.timeout);
                    }
                }
                Some(_) if payload_phase && confirmed => {
                    // Second acknowledgment of the pair; re-send for the
                    // robot to bank the chunk before the next one.
                    confirmed = false;
                }
                Some(_) => {
                    retries = 0;
                    confirmed = payload_phase;
                    index += 1;
                }
            }
        }

        if retries == 0 {
            info!(route = route.name(), chunks = total, "route upload complete");
            Ok(())
        } else if index < total {
            Err(ControlError::RetryBudgetExhausted {
                chunk: index,
                total,
                retries,
            })
        } else {
            Err(ControlError::UploadIncomplete { retries })
        }
    }
}
