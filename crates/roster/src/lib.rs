//! RangeLink Roster - Per-robot state, telemetry and comm-quality tracking
//!
//! One record per robot in the fixed eight-slot roster, each behind its own
//! lock. Two writer roles touch a record concurrently - the polling
//! scheduler and the unsolicited-telemetry receiver - but no update ever
//! spans multiple fields transactionally, so per-record locking is enough.
//!
//! Also home to [`StationContext`], the explicit shared-state object passed
//! to every component (no process-wide singletons).

#![warn(missing_docs)]

pub mod comm;
pub mod context;
pub mod robot;
pub mod state;

pub use comm::CommWindow;
pub use context::{JoystickInput, StationContext};
pub use robot::{RobotRecord, Roster, ROSTER_SIZE};
pub use state::{RadioState, ReportedState, RobotState};
