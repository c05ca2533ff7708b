//! Robot-reported fault bitmask decoding.
//!
//! System status replies carry a 16-bit error bitmask. Each known bit maps
//! to a named fault flag; bits with no assignment are ignored so newer
//! firmware can add faults without breaking older stations.

use serde::{Deserialize, Serialize};

/// One named fault reported by a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultFlag {
    /// No response from motor 1
    Motor1,
    /// No response from motor 2
    Motor2,
    /// No response from motor 3
    Motor3,
    /// No response from motor 4
    Motor4,
    /// No hardware response from the radio
    RadioHardware,
    /// Protocol error in an incoming radio packet
    RadioProtocol,
    /// Top cooling fan fault
    FanTop,
    /// Bottom cooling fan fault
    FanBottom,
    /// No battery detected
    NoBattery,
    /// Hit-detection board not responding
    NoHitDetector,
    /// Riser mast not responding
    NoRiser,
    /// GPS receiver 1 not responding
    NoGps1,
    /// GPS receiver 2 not responding
    NoGps2,
    /// Motor controller reports not-ready
    MotorNotReady,
    /// Power distribution board fan fault
    FanPdb,
}

/// Static bit-to-flag assignment table.
const FAULT_TABLE: &[(u16, FaultFlag)] = &[
    (0x0001, FaultFlag::Motor1),
    (0x0002, FaultFlag::Motor2),
    (0x0004, FaultFlag::Motor3),
    (0x0008, FaultFlag::Motor4),
    (0x0010, FaultFlag::RadioHardware),
    (0x0020, FaultFlag::RadioProtocol),
    (0x0040, FaultFlag::FanTop),
    (0x0080, FaultFlag::FanBottom),
    (0x0100, FaultFlag::NoBattery),
    (0x0200, FaultFlag::NoHitDetector),
    (0x0400, FaultFlag::NoRiser),
    (0x0800, FaultFlag::NoGps1),
    (0x1000, FaultFlag::NoGps2),
    (0x2000, FaultFlag::MotorNotReady),
    (0x4000, FaultFlag::FanPdb),
];

impl FaultFlag {
    /// Expand an error bitmask into the set of named faults.
    ///
    /// Unknown bits are ignored.
    pub fn from_bits(bits: u16) -> Vec<FaultFlag> {
        FAULT_TABLE
            .iter()
            .filter(|(bit, _)| bits & bit != 0)
            .map(|(_, flag)| *flag)
            .collect()
    }

    /// Wire name of this fault as the firmware documents it.
    pub fn name(self) -> &'static str {
        match self {
            FaultFlag::Motor1 => "ERR_MOT1",
            FaultFlag::Motor2 => "ERR_MOT2",
            FaultFlag::Motor3 => "ERR_MOT3",
            FaultFlag::Motor4 => "ERR_MOT4",
            FaultFlag::RadioHardware => "ERR_RADIO_HW",
            FaultFlag::RadioProtocol => "ERR_RADIO_PROTO",
            FaultFlag::FanTop => "ERR_FAN_TOP",
            FaultFlag::FanBottom => "ERR_FAN_BOT",
            FaultFlag::NoBattery => "ERR_NO_BATTERY",
            FaultFlag::NoHitDetector => "ERR_NO_HITDET",
            FaultFlag::NoRiser => "ERR_NO_RISER",
            FaultFlag::NoGps1 => "ERR_NO_GPS1",
            FaultFlag::NoGps2 => "ERR_NO_GPS2",
            FaultFlag::MotorNotReady => "ERR_MOT_NOTRDY",
            FaultFlag::FanPdb => "ERR_FAN_PDB",
        }
    }

    /// Operator-facing description of the fault.
    pub fn description(self) -> &'static str {
        match self {
            FaultFlag::Motor1 => "No response from motor 1",
            FaultFlag::Motor2 => "No response from motor 2",
            FaultFlag::Motor3 => "No response from motor 3",
            FaultFlag::Motor4 => "No response from motor 4",
            FaultFlag::RadioHardware => "No hardware response from radio",
            FaultFlag::RadioProtocol => "Protocol error in incoming radio packet",
            FaultFlag::FanTop => "Top cooling fan failure",
            FaultFlag::FanBottom => "Bottom cooling fan failure",
            FaultFlag::NoBattery => "No battery detected",
            FaultFlag::NoHitDetector => "Hit-detection board offline",
            FaultFlag::NoRiser => "Riser mast offline",
            FaultFlag::NoGps1 => "GPS receiver 1 offline",
            FaultFlag::NoGps2 => "GPS receiver 2 offline",
            FaultFlag::MotorNotReady => "Motor controller not ready",
            FaultFlag::FanPdb => "Power distribution board fan failure",
        }
    }
}
