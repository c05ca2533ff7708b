//! Request/reply correlation over the half-duplex channel.
//!
//! All transport access funnels through one mutex so a write and its paired
//! read form a single atomic region; at most one frame is in flight at any
//! time. Every outgoing request receives a correlation id from a monotonic
//! counter and a slot in the completion map, which the servicing thread
//! fulfils after the round trip. The id is removed from the map exactly
//! once, by the caller blocked on it.
//!
//! The link-layer destination travels with each request and is latched into
//! the transport inside the locked round-trip region, so concurrent callers
//! polling different robots can never re-address one another's frames.

use crate::error::{LinkError, LinkResult};
use crate::transport::{LinkAddress, Transport};
use rangelink_codec::Frame;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Largest reply frame the robots produce, with headroom.
const MAX_REPLY: usize = 64;

/// State of one correlated request.
enum CorrelationEntry {
    /// Queued or in flight
    Pending,
    /// Reply received
    Answered(Vec<u8>),
    /// Round trip completed without a reply
    TimedOut,
    /// Discarded by a flush before transmission
    Unanswered,
    /// Transport failed while this request was being serviced
    Failed(String),
}

/// One queued request: frame plus the destination it must go out with.
struct QueuedRequest {
    id: u32,
    frame: Frame,
    destination: Option<LinkAddress>,
}

#[derive(Default)]
struct Inner {
    queue: VecDeque<QueuedRequest>,
    entries: HashMap<u32, CorrelationEntry>,
}

/// The serialized request/reply layer over one transport.
pub struct Link {
    transport: Mutex<Box<dyn Transport>>,
    counter: AtomicU32,
    inner: Mutex<Inner>,
    resolved: Condvar,
}

impl Link {
    /// Wrap a transport.
    pub fn new(transport: Box<dyn Transport>) -> Link {
        Link {
            transport: Mutex::new(transport),
            counter: AtomicU32::new(0),
            inner: Mutex::new(Inner::default()),
            resolved: Condvar::new(),
        }
    }

    /// Number of correlation ids issued so far.
    ///
    /// Strictly increasing, including requests later discarded by
    /// [`Link::drain_pending`].
    pub fn requests_issued(&self) -> u32 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Number of requests still awaiting resolution.
    pub fn pending_requests(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    /// Send a frame to a destination and block for its paired reply.
    ///
    /// The destination rides with the request and is latched into the
    /// transport inside the locked round trip, never out-of-band. The reply
    /// window is `timeout`; expiry yields [`LinkError::Timeout`] and the
    /// correlation entry is removed either way.
    pub fn send_and_await(
        &self,
        frame: &Frame,
        destination: Option<LinkAddress>,
        timeout: Duration,
    ) -> LinkResult<Vec<u8>> {
        let id = self.enqueue(frame, destination);
        trace!(id, frame = %hex::encode(frame.as_bytes()), "request enqueued");
        self.pump(timeout);
        self.wait_reply(id, timeout)
    }

    /// Discard every queued-but-unsent request, then round trip `frame`.
    ///
    /// Discarded requests resolve to [`LinkError::Unanswered`] for their
    /// waiters. Used to clear a backlog ahead of a priority command such as
    /// an emergency stop.
    pub fn drain_pending(
        &self,
        frame: &Frame,
        destination: Option<LinkAddress>,
        timeout: Duration,
    ) -> LinkResult<Vec<u8>> {
        let id = self.enqueue(frame, destination);
        let mut transport = self.transport.lock().unwrap();
        let ours = {
            let mut inner = self.inner.lock().unwrap();
            let mut ours = None;
            let mut discarded = 0usize;
            while let Some(queued) = inner.queue.pop_front() {
                if queued.id == id {
                    ours = Some(queued);
                } else {
                    if let Some(slot) = inner.entries.get_mut(&queued.id) {
                        *slot = CorrelationEntry::Unanswered;
                    }
                    discarded += 1;
                }
            }
            if discarded > 0 {
                warn!(discarded, "flushed queued requests for priority frame");
            }
            self.resolved.notify_all();
            ours
        };
        if let Some(queued) = ours {
            let outcome = round_trip(transport.as_mut(), &queued.frame, queued.destination, timeout);
            self.complete(id, outcome);
        }
        drop(transport);
        self.wait_reply(id, timeout)
    }

    /// One guarded read for traffic not tied to an outstanding request.
    ///
    /// Used by the telemetry receiver while the channel is idle.
    pub fn recv_unsolicited(&self, timeout: Duration) -> LinkResult<Vec<u8>> {
        let mut transport = self.transport.lock().unwrap();
        let bytes = transport.read(MAX_REPLY, timeout)?;
        if bytes.is_empty() {
            Err(LinkError::Timeout)
        } else {
            Ok(bytes)
        }
    }

    /// Read and discard up to `reads` buffered frames.
    ///
    /// The upload engine uses this to drop stale acknowledgments after a
    /// rejected chunk.
    pub fn discard_stray(&self, reads: usize, timeout: Duration) {
        let mut transport = self.transport.lock().unwrap();
        for _ in 0..reads {
            match transport.read(MAX_REPLY, timeout) {
                Ok(bytes) if !bytes.is_empty() => {
                    debug!(len = bytes.len(), "discarded stray frame")
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "transport error while discarding stray frames");
                    break;
                }
            }
        }
    }

    fn enqueue(&self, frame: &Frame, destination: Option<LinkAddress>) -> u32 {
        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let mut inner = self.inner.lock().unwrap();
        inner.entries.insert(id, CorrelationEntry::Pending);
        inner.queue.push_back(QueuedRequest {
            id,
            frame: frame.clone(),
            destination,
        });
        id
    }

    /// Service the queue front-to-back while holding the transport.
    fn pump(&self, timeout: Duration) {
        let mut transport = self.transport.lock().unwrap();
        loop {
            let next = self.inner.lock().unwrap().queue.pop_front();
            let queued = match next {
                Some(entry) => entry,
                None => break,
            };
            let outcome = round_trip(transport.as_mut(), &queued.frame, queued.destination, timeout);
            self.complete(queued.id, outcome);
        }
    }

    fn complete(&self, id: u32, outcome: LinkResult<Vec<u8>>) {
        let mut inner = self.inner.lock().unwrap();
        // The waiter may have given up already; drop the result then.
        if let Some(slot) = inner.entries.get_mut(&id) {
            *slot = match outcome {
                Ok(bytes) if bytes.is_empty() => CorrelationEntry::TimedOut,
                Ok(bytes) => CorrelationEntry::Answered(bytes),
                Err(e) => CorrelationEntry::Failed(e.to_string()),
            };
        }
        self.resolved.notify_all();
    }

    fn wait_reply(&self, id: u32, timeout: Duration) -> LinkResult<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock().unwrap();
        loop {
            match inner.entries.get(&id) {
                Some(CorrelationEntry::Pending) => {}
                Some(_) => break,
                None => return Err(LinkError::Unanswered),
            }
            let now = Instant::now();
            if now >= deadline {
                inner.entries.remove(&id);
                return Err(LinkError::Timeout);
            }
            let (guard, _) = self
                .resolved
                .wait_timeout(inner, deadline - now)
                .unwrap();
            inner = guard;
        }
        match inner.entries.remove(&id) {
            Some(CorrelationEntry::Answered(bytes)) => Ok(bytes),
            Some(CorrelationEntry::TimedOut) => Err(LinkError::Timeout),
            Some(CorrelationEntry::Unanswered) => Err(LinkError::Unanswered),
            Some(CorrelationEntry::Failed(message)) => Err(LinkError::Transport(message)),
            Some(CorrelationEntry::Pending) | None => Err(LinkError::Timeout),
        }
    }
}

fn round_trip(
    transport: &mut dyn Transport,
    frame: &Frame,
    destination: Option<LinkAddress>,
    timeout: Duration,
) -> LinkResult<Vec<u8>> {
    transport.set_destination(destination);
    transport.write(frame.as_bytes())?;
    transport.read(MAX_REPLY, timeout)
}
