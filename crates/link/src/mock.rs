//! Scripted transport for tests.
//!
//! Lives in the library (not behind `cfg(test)`) so downstream crates and
//! the integration suite can drive the full stack without hardware.

use crate::error::LinkResult;
use crate::transport::{LinkAddress, Transport};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = Box<dyn FnMut(&[u8]) -> Option<Vec<u8>> + Send>;

#[derive(Default)]
struct MockState {
    writes: Vec<Vec<u8>>,
    destinations: Vec<Option<LinkAddress>>,
    replies: VecDeque<Option<Vec<u8>>>,
    responder: Option<Responder>,
    pending_reply: VecDeque<Vec<u8>>,
    destination: Option<LinkAddress>,
}

/// Transport whose replies are scripted by the test.
///
/// Reply resolution order on each read: queued scripted replies first, then
/// the responder closure applied to the most recent write, otherwise a
/// timeout (empty read).
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

/// Inspection handle kept by the test after the link takes the transport.
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a mock transport and its inspection handle.
    pub fn new() -> (MockTransport, MockHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (
            MockTransport {
                state: Arc::clone(&state),
            },
            MockHandle { state },
        )
    }
}

impl MockHandle {
    /// Queue a scripted reply for the next read.
    pub fn push_reply(&self, bytes: Vec<u8>) {
        self.state.lock().unwrap().replies.push_back(Some(bytes));
    }

    /// Queue a timeout (empty read) for the next read.
    pub fn push_timeout(&self) {
        self.state.lock().unwrap().replies.push_back(None);
    }

    /// Install a closure that derives a reply from each written frame.
    pub fn set_responder<F>(&self, responder: F)
    where
        F: FnMut(&[u8]) -> Option<Vec<u8>> + Send + 'static,
    {
        self.state.lock().unwrap().responder = Some(Box::new(responder));
    }

    /// All frames written so far.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().writes.clone()
    }

    /// Number of frames written so far.
    pub fn write_count(&self) -> usize {
        self.state.lock().unwrap().writes.len()
    }

    /// Destination tag active at each write.
    pub fn destinations(&self) -> Vec<Option<LinkAddress>> {
        self.state.lock().unwrap().destinations.clone()
    }
}

impl Transport for MockTransport {
    fn write(&mut self, bytes: &[u8]) -> LinkResult<()> {
        let mut state = self.state.lock().unwrap();
        state.writes.push(bytes.to_vec());
        let destination = state.destination;
        state.destinations.push(destination);
        if state.replies.is_empty() {
            if let Some(mut responder) = state.responder.take() {
                if let Some(reply) = responder(bytes) {
                    state.pending_reply.push_back(reply);
                }
                state.responder = Some(responder);
            }
        }
        Ok(())
    }

    fn read(&mut self, max: usize, _timeout: Duration) -> LinkResult<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        if let Some(scripted) = state.replies.pop_front() {
            let mut bytes = scripted.unwrap_or_default();
            bytes.truncate(max);
            return Ok(bytes);
        }
        if let Some(mut bytes) = state.pending_reply.pop_front() {
            bytes.truncate(max);
            return Ok(bytes);
        }
        Ok(Vec::new())
    }

    fn set_destination(&mut self, destination: Option<LinkAddress>) {
        self.state.lock().unwrap().destination = destination;
    }
}
