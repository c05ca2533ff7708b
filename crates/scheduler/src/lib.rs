//! RangeLink Scheduler - Round-robin polling and telemetry intake
//!
//! Two long-running roles over one shared link: [`PollScheduler`] drives the
//! fixed-period command cycle across the eight-slot roster, and
//! [`TelemetryReceiver`] drains unsolicited telemetry while the channel is
//! idle. Both run on plain named threads and stop cooperatively through a
//! shared flag; in-flight round trips finish before a thread exits.

#![warn(missing_docs)]

pub mod receiver;
pub mod scheduler;

pub use receiver::{dispatch, TelemetryReceiver};
pub use scheduler::{PollScheduler, POLL_PERIOD};
