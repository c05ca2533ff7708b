//! RangeLink Link Layer - Serialized half-duplex request/reply over one radio
//!
//! The radio channel is strictly half-duplex: one frame goes out, its reply
//! comes back, and nothing else may touch the port in between. This crate
//! owns that discipline.
//!
//! # Core Components
//!
//! - **Transport**: byte-oriented boundary to the serial port or radio driver
//! - **Link**: correlation ids, the single in-flight round trip, and the
//!   flush-before-priority-command path
//! - **SerialTransport / RadioTransport**: concrete transports for a wired
//!   serial port and a CL4790-class radio in API mode
//! - **MockTransport**: scripted transport for tests across the workspace

#![warn(missing_docs)]

pub mod error;
pub mod link;
pub mod mock;
pub mod radio;
pub mod serial;
pub mod transport;

pub use error::{LinkError, LinkResult};
pub use link::Link;
pub use mock::{MockHandle, MockTransport};
pub use radio::RadioTransport;
pub use serial::SerialTransport;
pub use transport::{LinkAddress, Transport};
