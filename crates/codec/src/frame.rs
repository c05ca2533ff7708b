//! Outgoing frame construction.

use crate::command::CommandType;
use crate::error::{CodecError, CodecResult};

/// Source tag identifying frames originating from the operator station.
pub const STATION_TAG: u8 = 0x0D;

/// Fixed header length: tag, payload length, session id (2 bytes).
const HEADER_LEN: usize = 4;

/// Maximum data bytes carried by one upload chunk (one waypoint record).
const CHUNK_DATA_MAX: usize = 12;

/// One immutable fixed-layout frame, constructed on send and consumed by
/// whichever decoder handles the paired reply.
///
/// The session id is written little-endian across bytes 2-3, full bytes on
/// both halves, so `session_id` always returns what was encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
}

impl Frame {
    fn with_payload(command: CommandType, session: u16, params: &[u8]) -> Frame {
        let paylen = 1 + params.len();
        let mut bytes = Vec::with_capacity(HEADER_LEN + paylen);
        bytes.push(STATION_TAG);
        bytes.push(paylen as u8);
        bytes.push((session & 0xFF) as u8);
        bytes.push((session >> 8) as u8);
        bytes.push(command.code());
        bytes.extend_from_slice(params);
        Frame { bytes }
    }

    /// Build a plain command frame carrying only the cycle byte.
    ///
    /// Used for every command without extra parameters: telemetry queries,
    /// mast movement, power toggle and the generic poll request.
    pub fn command(command: CommandType, session: u16, cycle: u8) -> Frame {
        Frame::with_payload(command, session, &[cycle])
    }

    /// Build a joystick drive frame.
    ///
    /// Axis values are clamped to the -100..=100 stick range and encoded
    /// offset by +100 into a single byte each.
    pub fn joystick(session: u16, cycle: u8, x: i16, y: i16, z: i16, buttons: u8) -> Frame {
        let params = [
            cycle,
            axis_byte(x),
            axis_byte(y),
            axis_byte(z),
            buttons,
        ];
        Frame::with_payload(CommandType::Joystick, session, &params)
    }

    /// Build a target-selection frame.
    pub fn select_target(session: u16, cycle: u8, target: u8) -> Frame {
        Frame::with_payload(CommandType::SelectTarget, session, &[cycle, target])
    }

    /// Build one chunk of a scenario upload.
    ///
    /// `total` is the chunk count of the whole session, `last_index` the
    /// index of its final chunk and `index` this chunk's position. `data`
    /// holds at most one waypoint record (12 bytes).
    pub fn upload_chunk(
        session: u16,
        total: u8,
        last_index: u8,
        index: u8,
        data: &[u8],
    ) -> CodecResult<Frame> {
        if data.len() > CHUNK_DATA_MAX {
            return Err(CodecError::ChunkTooLong(data.len()));
        }
        let mut params = Vec::with_capacity(3 + data.len());
        params.push(total);
        params.push(last_index);
        params.push(index);
        params.extend_from_slice(data);
        Ok(Frame::with_payload(CommandType::UploadScenario, session, &params))
    }

    /// Build the cyclic control frame the scheduler addresses to one robot.
    ///
    /// Carries the robot's commanded state, its hit-detection thresholds and
    /// the current joystick axes (16-bit little-endian, as the drive loop on
    /// the robot expects them).
    #[allow(clippy::too_many_arguments)]
    pub fn control_poll(
        session: u16,
        active: u8,
        responder: u8,
        cycle: u16,
        state_code: u8,
        hit_threshold: u8,
        hit_time_limit: u8,
        x: i16,
        y: i16,
        z: i16,
        buttons: u8,
    ) -> Frame {
        let mut params = Vec::with_capacity(14);
        params.push(active);
        params.push(responder);
        params.extend_from_slice(&cycle.to_le_bytes());
        params.push(state_code);
        params.push(hit_threshold);
        params.push(hit_time_limit);
        params.extend_from_slice(&x.to_le_bytes());
        params.extend_from_slice(&y.to_le_bytes());
        params.extend_from_slice(&z.to_le_bytes());
        params.push(buttons);
        Frame::with_payload(CommandType::Request, session, &params)
    }

    /// Build the formation-mode control frame.
    ///
    /// Structurally the same as [`Frame::control_poll`] but carries the
    /// formation offset instead of joystick axes.
    pub fn formation_poll(
        session: u16,
        active: u8,
        responder: u8,
        cycle: u16,
        state_code: u8,
        offset_x: f32,
        offset_y: f32,
    ) -> Frame {
        let mut params = Vec::with_capacity(13);
        params.push(active);
        params.push(responder);
        params.extend_from_slice(&cycle.to_le_bytes());
        params.push(state_code);
        params.extend_from_slice(&offset_x.to_le_bytes());
        params.extend_from_slice(&offset_y.to_le_bytes());
        Frame::with_payload(CommandType::Request, session, &params)
    }

    /// Raw wire bytes of this frame.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total frame length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the frame is empty (never true for constructed frames).
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Command code carried in byte 4.
    pub fn command_code(&self) -> u8 {
        self.bytes[4]
    }

    /// Session id carried in bytes 2-3.
    pub fn session_id(&self) -> u16 {
        ((self.bytes[3] as u16) << 8) | (self.bytes[2] as u16 & 0xFF)
    }

    /// Declared payload length from byte 1.
    pub fn payload_len(&self) -> u8 {
        self.bytes[1]
    }

    /// Parameter bytes following the command code.
    pub fn params(&self) -> &[u8] {
        &self.bytes[HEADER_LEN + 1..]
    }
}

fn axis_byte(value: i16) -> u8 {
    (value.clamp(-100, 100) + 100) as u8
}
