//! Per-robot records and the fixed roster.

use crate::comm::CommWindow;
use crate::state::{ReportedState, RobotState};
use rangelink_codec::{BatteryStatus, FaultFlag, GpsStatus, HitStatus, SystemStatus};
use rangelink_link::LinkAddress;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Fixed roster size: the radio schedule addresses eight robots.
pub const ROSTER_SIZE: usize = 8;

/// Message counters reset to zero together once either passes this value.
const COUNTER_WRAP: u16 = 9999;

/// Everything the station tracks about one robot.
///
/// Mutated only by the polling scheduler and the telemetry receiver; each
/// field has a single writer role and no update spans multiple fields, so
/// the per-record lock in [`Roster`] is the only synchronisation needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotRecord {
    /// Roster id, 1-based
    pub id: u8,
    /// Commanded state
    pub state: RobotState,
    /// State last reported by the robot
    pub reported_state: ReportedState,
    /// Link-layer destination tag, if the transport is addressed
    pub address: Option<LinkAddress>,

    /// UTM easting, metres
    pub utm_x: f64,
    /// UTM northing, metres
    pub utm_y: f64,
    /// Raw UTM zone designator
    pub utm_zone: [u8; 4],
    /// Ground speed
    pub speed: u8,
    /// Course over ground
    pub cog: u8,
    /// Satellites in view per receiver
    pub num_sat: [u8; 2],
    /// Fix quality per receiver
    pub gps_fix: [u8; 2],

    /// Battery pack voltages, millivolts
    pub battery_volts: [u16; 2],
    /// Battery pack currents, milliamps
    pub battery_current: [u16; 3],
    /// Remaining capacity per cell group, percent
    pub battery_capacity: [u8; 3],
    /// Enclosure temperatures
    pub temperatures: [i16; 5],
    /// Cooling fan speeds
    pub fans: [u16; 5],
    /// Drive motor RPM
    pub motor_rpm: [u16; 4],
    /// Formation-mode offset from the leader, metres (x, y)
    pub formation_offset: [f32; 2],

    /// Hits required to drop the target
    pub hit_threshold: u8,
    /// Time window for counting hits, seconds
    pub hit_time_limit: u8,
    /// Hit sensor sensitivity
    pub hd_sensitivity: u8,
    /// Raw hit zone bitfield
    pub hit_zone_data: u8,
    /// Whether zone discrimination is enabled
    pub zones_enabled: bool,
    /// Faults from the latest system status
    pub faults: Vec<FaultFlag>,

    /// Frames addressed to this robot
    pub messages_sent: u16,
    /// Replies and unsolicited frames received from it
    pub messages_received: u16,
    /// Hit/miss record of recent polling slots
    pub comm: CommWindow,
    /// Set when a frame from this robot arrives; consumed at its next slot
    pub got_packet_flag: bool,
}

impl RobotRecord {
    /// Fresh record with firmware-default hit settings.
    pub fn new(id: u8) -> RobotRecord {
        RobotRecord {
            id,
            state: RobotState::RemoteControl,
            reported_state: ReportedState::Unknown,
            address: None,
            utm_x: 0.0,
            utm_y: 0.0,
            utm_zone: [0; 4],
            speed: 0,
            cog: 0,
            num_sat: [0; 2],
            gps_fix: [0; 2],
            battery_volts: [0; 2],
            battery_current: [0; 3],
            battery_capacity: [0; 3],
            temperatures: [0; 5],
            fans: [0; 5],
            motor_rpm: [0; 4],
            formation_offset: [0.0; 2],
            hit_threshold: 1,
            hit_time_limit: 3,
            hd_sensitivity: 5,
            hit_zone_data: 0,
            zones_enabled: false,
            faults: Vec::new(),
            messages_sent: 0,
            messages_received: 0,
            comm: CommWindow::default(),
            got_packet_flag: false,
        }
    }

    /// Bookkeeping for one polling slot addressed at this robot's window.
    ///
    /// Pushes the accumulated `got_packet_flag` into the comm window,
    /// clears it and counts the outgoing frame.
    pub fn note_polled(&mut self) {
        self.comm.push(self.got_packet_flag);
        self.got_packet_flag = false;
        self.messages_sent = self.messages_sent.saturating_add(1);
        self.wrap_counters();
    }

    /// Bookkeeping for one frame received from this robot.
    pub fn note_reply(&mut self) {
        self.got_packet_flag = true;
        self.messages_received = self.messages_received.saturating_add(1);
        self.wrap_counters();
    }

    /// Both counters reset together once either passes the wrap threshold,
    /// never independently.
    fn wrap_counters(&mut self) {
        if self.messages_sent > COUNTER_WRAP || self.messages_received > COUNTER_WRAP {
            self.messages_sent = 0;
            self.messages_received = 0;
        }
    }

    /// Fraction of recent polling slots with a reply observed.
    pub fn comm_quality(&self) -> f64 {
        self.comm.quality()
    }

    /// Merge a system status reply into the record.
    pub fn apply_system(&mut self, status: &SystemStatus) {
        self.reported_state = ReportedState::from_code(status.state);
        self.faults = status.faults.clone();
        if !status.faults.is_empty() {
            debug!(robot = self.id, faults = ?status.faults, "robot reports faults");
        }
    }

    /// Merge a GPS reply into the record.
    pub fn apply_gps(&mut self, status: &GpsStatus) {
        self.utm_x = status.utm_x;
        self.utm_y = status.utm_y;
        self.utm_zone = status.utm_zone;
        self.num_sat[0] = status.num_sat;
        self.gps_fix[0] = status.fix;
        self.cog = status.cog;
        self.speed = status.speed;
    }

    /// Merge a hit-detection settings reply into the record.
    pub fn apply_hit(&mut self, status: &HitStatus) {
        self.hit_threshold = status.threshold;
        self.hit_time_limit = status.time_limit;
        self.hd_sensitivity = status.sensitivity;
        self.hit_zone_data = status.zone_data;
        self.zones_enabled = status.zones_enabled;
    }

    /// Merge a battery reply into the record.
    pub fn apply_battery(&mut self, status: &BatteryStatus) {
        self.battery_volts = status.volts;
        self.battery_current = status.current;
        self.battery_capacity = status.capacity;
    }
}

/// The fixed ordered set of robots the scheduler polls round-robin.
pub struct Roster {
    records: Vec<Mutex<RobotRecord>>,
}

impl Default for Roster {
    fn default() -> Self {
        Roster::new()
    }
}

impl Roster {
    /// Roster with eight fresh records, ids 1 through 8.
    pub fn new() -> Roster {
        let records = (1..=ROSTER_SIZE as u8)
            .map(|id| Mutex::new(RobotRecord::new(id)))
            .collect();
        Roster { records }
    }

    /// Number of roster slots.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false: the roster has fixed size.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lock the record for a 1-based robot id.
    pub fn lock(&self, id: u8) -> Option<MutexGuard<'_, RobotRecord>> {
        if id == 0 || id as usize > self.records.len() {
            return None;
        }
        Some(self.records[id as usize - 1].lock().unwrap())
    }

    /// Robot id at a roster position (cycle counter modulo roster size).
    pub fn id_at(&self, position: usize) -> u8 {
        (position % self.records.len()) as u8 + 1
    }

    /// Clone every record for external consumers (dashboard JSON).
    pub fn snapshot(&self) -> Vec<RobotRecord> {
        self.records
            .iter()
            .map(|record| record.lock().unwrap().clone())
            .collect()
    }

    /// Comm quality for one robot, 0.0 when the id is out of range.
    pub fn comm_quality(&self, id: u8) -> f64 {
        self.lock(id).map(|record| record.comm_quality()).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_polled_consumes_flag() {
        let mut record = RobotRecord::new(1);
        record.got_packet_flag = true;
        record.note_polled();
        assert!(!record.got_packet_flag);
        assert_eq!(record.messages_sent, 1);
        assert!(record.comm_quality() > 0.0);
    }

    #[test]
    fn test_counters_wrap_together() {
        let mut record = RobotRecord::new(1);
        record.messages_sent = 9999;
        record.messages_received = 4321;
        record.note_polled();
        assert_eq!(record.messages_sent, 0);
        assert_eq!(record.messages_received, 0);
    }

    #[test]
    fn test_receive_counter_wraps_both() {
        let mut record = RobotRecord::new(1);
        record.messages_received = 9999;
        record.messages_sent = 17;
        record.note_reply();
        assert_eq!(record.messages_sent, 0);
        assert_eq!(record.messages_received, 0);
    }

    #[test]
    fn test_wrap_isolated_to_one_robot() {
        let roster = Roster::new();
        {
            let mut record = roster.lock(3).unwrap();
            record.messages_sent = 9999;
            record.note_polled();
        }
        {
            let mut record = roster.lock(4).unwrap();
            record.messages_sent = 500;
            record.note_polled();
        }
        assert_eq!(roster.lock(3).unwrap().messages_sent, 0);
        assert_eq!(roster.lock(4).unwrap().messages_sent, 501);
    }

    #[test]
    fn test_roster_ids_are_one_based() {
        let roster = Roster::new();
        assert!(roster.lock(0).is_none());
        assert_eq!(roster.lock(1).unwrap().id, 1);
        assert_eq!(roster.lock(8).unwrap().id, 8);
        assert!(roster.lock(9).is_none());
    }

    #[test]
    fn test_id_at_wraps_round_robin() {
        let roster = Roster::new();
        assert_eq!(roster.id_at(0), 1);
        assert_eq!(roster.id_at(7), 8);
        assert_eq!(roster.id_at(8), 1);
    }
}
