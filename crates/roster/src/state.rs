//! State enumerations used both on the wire and in memory.

use serde::{Deserialize, Serialize};

/// Commanded robot state.
///
/// Transitions are driven by the operator, never computed internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotState {
    /// Not a valid operating state
    Invalid,
    /// Power-on initialisation
    Init,
    /// Direct remote control
    RemoteControl,
    /// Leading a formation
    FormationLeader,
    /// Following a formation leader
    FormationFollower,
}

impl RobotState {
    /// Stable wire code.
    pub fn code(self) -> u8 {
        match self {
            RobotState::Invalid => 0,
            RobotState::Init => 1,
            RobotState::RemoteControl => 2,
            RobotState::FormationLeader => 3,
            RobotState::FormationFollower => 4,
        }
    }
}

/// State last reported by a robot.
///
/// Distinct from [`RobotState`]: it carries an `Unknown` initial value for
/// robots that have never answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportedState {
    /// No report received yet
    Unknown,
    /// Robot reports an invalid state
    Invalid,
    /// Robot is initialising
    Init,
    /// Robot is under remote control
    RemoteControl,
    /// Robot is leading a formation
    FormationLeader,
    /// Robot is following a formation leader
    FormationFollower,
}

impl ReportedState {
    /// Map a wire code to a reported state.
    ///
    /// Codes outside the known range collapse to `Unknown` rather than
    /// failing: a garbled state byte should not discard the whole reply.
    pub fn from_code(code: u8) -> ReportedState {
        match code {
            0 => ReportedState::Invalid,
            1 => ReportedState::Init,
            2 => ReportedState::RemoteControl,
            3 => ReportedState::FormationLeader,
            4 => ReportedState::FormationFollower,
            _ => ReportedState::Unknown,
        }
    }
}

/// Operating mode of the radio scheduler.
///
/// Only `Normal` and `Formation` drive the periodic polling loop; the
/// remaining modes are reserved command modes issued through the command
/// facade outside the cyclic loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadioState {
    /// Cyclic polling with joystick control
    Normal,
    /// Cyclic polling with formation offsets
    Formation,
    /// Bulk upload holds the channel
    Upload,
    /// Inverse-direction bulk upload
    UploadInverse,
    /// Bulk download holds the channel
    Download,
    /// One command, one robot
    SingleCommand,
    /// Timed command burst to several robots
    TimedMultiCommand,
    /// Two-integer parameter command
    TwoIntCommand,
    /// Single request/reply transaction
    SingleTransaction,
    /// Ping every roster member once
    PingAll,
}

impl RadioState {
    /// Stable code for this mode.
    pub fn code(self) -> u8 {
        match self {
            RadioState::Normal => 0,
            RadioState::Formation => 1,
            RadioState::Upload => 2,
            RadioState::UploadInverse => 3,
            RadioState::Download => 4,
            RadioState::SingleCommand => 5,
            RadioState::TimedMultiCommand => 6,
            RadioState::TwoIntCommand => 7,
            RadioState::SingleTransaction => 8,
            RadioState::PingAll => 9,
        }
    }

    /// Whether this mode drives the periodic polling loop.
    pub fn is_cyclic(self) -> bool {
        matches!(self, RadioState::Normal | RadioState::Formation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reported_state_from_code() {
        assert_eq!(ReportedState::from_code(2), ReportedState::RemoteControl);
        assert_eq!(ReportedState::from_code(4), ReportedState::FormationFollower);
        assert_eq!(ReportedState::from_code(99), ReportedState::Unknown);
    }

    #[test]
    fn test_only_normal_and_formation_are_cyclic() {
        assert!(RadioState::Normal.is_cyclic());
        assert!(RadioState::Formation.is_cyclic());
        assert!(!RadioState::Upload.is_cyclic());
        assert!(!RadioState::PingAll.is_cyclic());
    }
}
