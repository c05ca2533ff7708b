//! RangeLink Frame Codec - Fixed-layout binary frames for the target link
//!
//! Encodes typed commands into the fixed wire layout spoken by the target
//! robots and decodes their reply frames into typed telemetry.
//!
//! # Wire layout
//!
//! Every frame starts with a four byte header followed by the command code
//! and a type-specific parameter block:
//!
//! - byte 0: source tag (`STATION_TAG` for frames built by the station)
//! - byte 1: payload length (command code byte plus parameters)
//! - bytes 2-3: 16-bit session id, little-endian
//! - byte 4: command code (see [`CommandType`])
//! - bytes 5..: parameters
//!
//! Multi-byte reply fields are reconstructed with explicit shift-and-mask
//! arithmetic; a reply shorter than its type's minimum length is a decode
//! error, never a partial result.

#![warn(missing_docs)]

pub mod command;
pub mod decode;
pub mod error;
pub mod fault;
pub mod frame;

pub use command::CommandType;
pub use decode::{
    BatteryStatus, GpsStatus, HitStatus, ReplyHeader, ScenarioInfo, SystemStatus, UploadAck,
    UploadRequestInfo,
};
pub use error::{CodecError, CodecResult};
pub use fault::FaultFlag;
pub use frame::{Frame, STATION_TAG};
