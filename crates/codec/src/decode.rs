//! Typed decoding of reply frames.
//!
//! Each reply type declares a minimum layout length; a shorter buffer is a
//! [`CodecError::Truncated`] failure rather than a partial result.

use crate::error::{CodecError, CodecResult};
use crate::fault::FaultFlag;
use serde::{Deserialize, Serialize};

fn ensure_len(buf: &[u8], min: usize, command: &'static str) -> CodecResult<()> {
    if buf.len() < min {
        return Err(CodecError::Truncated {
            command,
            len: buf.len(),
            min,
        });
    }
    Ok(())
}

fn u16_le(buf: &[u8], at: usize) -> u16 {
    ((buf[at + 1] as u16) << 8) | (buf[at] as u16 & 0xFF)
}

fn u32_le(buf: &[u8], at: usize) -> u32 {
    ((buf[at + 3] as u32) << 24)
        | ((buf[at + 2] as u32) << 16)
        | ((buf[at + 1] as u32) << 8)
        | (buf[at] as u32 & 0xFF)
}

/// Common header fields present on every reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyHeader {
    /// Source/role tag from byte 0
    pub source: u8,
    /// Declared payload length from byte 1
    pub payload_len: u8,
    /// Echoed session id from bytes 2-3
    pub session: u16,
}

impl ReplyHeader {
    /// Parse the four byte header shared by all replies.
    pub fn parse(buf: &[u8]) -> CodecResult<ReplyHeader> {
        ensure_len(buf, 4, "header")?;
        Ok(ReplyHeader {
            source: buf[0],
            payload_len: buf[1],
            session: u16_le(buf, 2),
        })
    }
}

/// System status reply: robot identity, reported state and fault bitmask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// Reply header
    pub header: ReplyHeader,
    /// Robot identity (1-based roster id)
    pub client_id: u8,
    /// Reported state code (raw; mapped by the roster layer)
    pub state: u8,
    /// Decoded fault flags from the 16-bit error bitmask
    pub faults: Vec<FaultFlag>,
}

impl SystemStatus {
    /// Decode a system status reply.
    pub fn decode(buf: &[u8]) -> CodecResult<SystemStatus> {
        ensure_len(buf, 8, "system")?;
        Ok(SystemStatus {
            header: ReplyHeader::parse(buf)?,
            client_id: buf[4],
            state: buf[5],
            faults: FaultFlag::from_bits(u16_le(buf, 6)),
        })
    }
}

/// Hit-detection settings reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitStatus {
    /// Reply header
    pub header: ReplyHeader,
    /// Hits required to drop the target
    pub threshold: u8,
    /// Time window for counting hits, seconds
    pub time_limit: u8,
    /// Hit sensor sensitivity
    pub sensitivity: u8,
    /// Pause after a registered hit, seconds
    pub pause_time: u8,
    /// Raw hit zone bitfield
    pub zone_data: u8,
    /// Whether zone discrimination is enabled
    pub zones_enabled: bool,
}

impl HitStatus {
    /// Decode a hit-detection settings reply.
    pub fn decode(buf: &[u8]) -> CodecResult<HitStatus> {
        ensure_len(buf, 10, "hit")?;
        Ok(HitStatus {
            header: ReplyHeader::parse(buf)?,
            threshold: buf[4],
            time_limit: buf[5],
            sensitivity: buf[6],
            pause_time: buf[7],
            zone_data: buf[8],
            zones_enabled: buf[9] != 0,
        })
    }
}

/// GPS position reply.
///
/// Easting/northing arrive as decimetres and are scaled to metres here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsStatus {
    /// Reply header
    pub header: ReplyHeader,
    /// UTM easting in metres
    pub utm_x: f64,
    /// UTM northing in metres
    pub utm_y: f64,
    /// Raw UTM zone designator bytes
    pub utm_zone: [u8; 4],
    /// Satellites in view
    pub num_sat: u8,
    /// Fix quality code
    pub fix: u8,
    /// Course over ground
    pub cog: u8,
    /// Ground speed
    pub speed: u8,
}

impl GpsStatus {
    /// Decode a GPS position reply.
    pub fn decode(buf: &[u8]) -> CodecResult<GpsStatus> {
        ensure_len(buf, 20, "gps")?;
        Ok(GpsStatus {
            header: ReplyHeader::parse(buf)?,
            utm_x: u32_le(buf, 4) as f64 / 10.0,
            utm_y: u32_le(buf, 8) as f64 / 10.0,
            utm_zone: [buf[12], buf[13], buf[14], buf[15]],
            num_sat: buf[16],
            fix: buf[17],
            cog: buf[18],
            speed: buf[19],
        })
    }
}

/// Battery telemetry reply (page 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryStatus {
    /// Reply header
    pub header: ReplyHeader,
    /// Pack voltages, millivolts
    pub volts: [u16; 2],
    /// Remaining capacity per cell group, percent
    pub capacity: [u8; 3],
    /// Pack currents, milliamps
    pub current: [u16; 3],
}

impl BatteryStatus {
    /// Decode a battery telemetry reply.
    pub fn decode(buf: &[u8]) -> CodecResult<BatteryStatus> {
        ensure_len(buf, 17, "battery")?;
        Ok(BatteryStatus {
            header: ReplyHeader::parse(buf)?,
            volts: [u16_le(buf, 4), u16_le(buf, 6)],
            capacity: [buf[8], buf[9], buf[10]],
            current: [u16_le(buf, 11), u16_le(buf, 13), u16_le(buf, 15)],
        })
    }
}

/// Stored scenario inventory reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioInfo {
    /// Reply header
    pub header: ReplyHeader,
    /// Echoed cycle byte
    pub cycle: u8,
    /// Number of stored scenario paths
    pub path_count: u8,
}

impl ScenarioInfo {
    /// Decode a scenario inventory reply.
    pub fn decode(buf: &[u8]) -> CodecResult<ScenarioInfo> {
        ensure_len(buf, 6, "scenario info")?;
        Ok(ScenarioInfo {
            header: ReplyHeader::parse(buf)?,
            cycle: buf[4],
            path_count: buf[5],
        })
    }
}

/// Reply to an upload announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequestInfo {
    /// Reply header
    pub header: ReplyHeader,
    /// Request type echoed by the robot
    pub request_type: u8,
    /// Echoed cycle byte
    pub cycle: u8,
}

impl UploadRequestInfo {
    /// Decode an upload announcement reply.
    pub fn decode(buf: &[u8]) -> CodecResult<UploadRequestInfo> {
        ensure_len(buf, 6, "upload request")?;
        Ok(UploadRequestInfo {
            header: ReplyHeader::parse(buf)?,
            request_type: buf[4],
            cycle: buf[5],
        })
    }
}

/// Acknowledgment for one upload chunk.
///
/// The 16-bit acknowledgment field rides in the reply's session id slot:
/// zero means the chunk was accepted, anything else is a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAck {
    /// Reply header
    pub header: ReplyHeader,
    /// Acknowledgment value; 0 = accepted
    pub ack: u16,
    /// Scenario inventory slot the robot is writing into
    pub inventory_index: u8,
    /// Chunk index the robot expects next
    pub next_chunk: u8,
}

impl UploadAck {
    /// Decode an upload chunk acknowledgment.
    pub fn decode(buf: &[u8]) -> CodecResult<UploadAck> {
        ensure_len(buf, 6, "upload ack")?;
        let header = ReplyHeader::parse(buf)?;
        Ok(UploadAck {
            header,
            ack: header.session,
            inventory_index: buf[4],
            next_chunk: buf[5],
        })
    }

    /// Whether the robot accepted the chunk.
    pub fn accepted(&self) -> bool {
        self.ack == 0
    }
}
