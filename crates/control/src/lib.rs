//! Operator-facing control layer.
//!
//! [`Commander`] exposes one method per operator action over a single
//! addressed robot, [`Route`] models a scenario route and its wire chunking,
//! and [`UploadEngine`] drives the chunked transfer with its retry budget.
//! All traffic goes through the correlation layer in `rangelink-link`; this
//! crate adds no I/O of its own.

#![warn(missing_docs)]

mod error;
mod facade;
mod geo;
mod route;
mod upload;

pub use error::{ControlError, ControlResult};
pub use facade::Commander;
pub use geo::GeoProjector;
pub use route::{Route, Waypoint, HEADER_CHUNKS, NAME_MAX};
pub use upload::{UploadEngine, RETRY_BUDGET};
