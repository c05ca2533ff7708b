//! Command codes shared by outgoing frames and their replies.

use crate::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};

/// Closed set of command types with stable wire codes.
///
/// The code is carried in byte 4 of every frame and echoed by the robot in
/// its reply, so the same enumeration names both the outgoing command and
/// the layout of the decoded response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandType {
    /// Generic poll request
    Request,
    /// System status query (state + fault bitmask)
    System,
    /// Hit-detection settings query
    Hit,
    /// GPS position query
    Gps,
    /// Battery pack telemetry, page 1
    Battery1,
    /// Battery pack telemetry, page 2
    Battery2,
    /// Query stored scenario inventory
    GetScenarioInfo,
    /// Announce an upcoming scenario upload
    PutScenarioInfo,
    /// One chunk of a scenario upload
    UploadScenario,
    /// Raise the target mast
    Up,
    /// Lower the target mast
    Down,
    /// Raise the target mast halfway
    HalfRaise,
    /// Joystick drive command
    Joystick,
    /// Toggle drive power
    PowerToggle,
    /// Select the addressed target
    SelectTarget,
}

impl CommandType {
    /// Stable wire code for this command.
    pub fn code(self) -> u8 {
        match self {
            CommandType::Request => 0,
            CommandType::System => 1,
            CommandType::Hit => 2,
            CommandType::Gps => 3,
            CommandType::Battery1 => 4,
            CommandType::Battery2 => 5,
            CommandType::GetScenarioInfo => 6,
            CommandType::PutScenarioInfo => 8,
            CommandType::UploadScenario => 9,
            CommandType::Up => 10,
            CommandType::Down => 11,
            CommandType::HalfRaise => 12,
            CommandType::Joystick => 13,
            CommandType::PowerToggle => 14,
            CommandType::SelectTarget => 15,
        }
    }

    /// Look up a command by its wire code.
    ///
    /// Code 7 is unassigned in the target firmware and rejected here like
    /// any other unknown value.
    pub fn from_code(code: u8) -> CodecResult<Self> {
        match code {
            0 => Ok(CommandType::Request),
            1 => Ok(CommandType::System),
            2 => Ok(CommandType::Hit),
            3 => Ok(CommandType::Gps),
            4 => Ok(CommandType::Battery1),
            5 => Ok(CommandType::Battery2),
            6 => Ok(CommandType::GetScenarioInfo),
            8 => Ok(CommandType::PutScenarioInfo),
            9 => Ok(CommandType::UploadScenario),
            10 => Ok(CommandType::Up),
            11 => Ok(CommandType::Down),
            12 => Ok(CommandType::HalfRaise),
            13 => Ok(CommandType::Joystick),
            14 => Ok(CommandType::PowerToggle),
            15 => Ok(CommandType::SelectTarget),
            other => Err(CodecError::UnknownCommand(other)),
        }
    }
}
