//! Integration tests for the full station stack
//!
//! This test suite drives the assembled stack (codec, link, roster, control,
//! scheduler) over a scripted transport and validates:
//! - The round-robin polling cycle and comm-quality bookkeeping
//! - Complete route upload sessions, including retry exhaustion
//! - Operator command paths through the facade, including the flush-ahead
//!   emergency stop

pub mod test_utils;

#[cfg(test)]
mod command_path_tests;

#[cfg(test)]
mod station_cycle_tests;

#[cfg(test)]
mod upload_session_tests;
