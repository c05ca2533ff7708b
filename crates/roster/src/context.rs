//! Shared station context.
//!
//! All mutable cross-component state lives here as one explicit object
//! owned by the controller instance and handed to every component
//! constructor. Nothing in the workspace reaches for a global.

use crate::robot::Roster;
use crate::state::RadioState;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Mutex;

/// Current operator joystick input, station-side units (-100..=100).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoystickInput {
    /// Lateral axis
    pub x: i16,
    /// Longitudinal axis
    pub y: i16,
    /// Rotational axis
    pub z: i16,
    /// Button bitfield
    pub buttons: u8,
}

impl JoystickInput {
    /// Whether every axis and button is at rest.
    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0 && self.z == 0 && self.buttons == 0
    }
}

/// Shared state for one controller instance.
pub struct StationContext {
    /// The eight-slot robot roster
    pub roster: Roster,
    /// Session id stamped into every frame this station builds
    pub session: u16,
    radio_state: Mutex<RadioState>,
    joystick: Mutex<JoystickInput>,
    menu_mode: AtomicBool,
    transfer_hold: AtomicBool,
    reply_slot: AtomicU8,
}

impl StationContext {
    /// Fresh context in `Normal` mode.
    pub fn new(session: u16) -> StationContext {
        StationContext {
            roster: Roster::new(),
            session,
            radio_state: Mutex::new(RadioState::Normal),
            joystick: Mutex::new(JoystickInput::default()),
            menu_mode: AtomicBool::new(false),
            transfer_hold: AtomicBool::new(false),
            reply_slot: AtomicU8::new(0),
        }
    }

    /// Current scheduler mode.
    pub fn radio_state(&self) -> RadioState {
        *self.radio_state.lock().unwrap()
    }

    /// Switch scheduler mode.
    pub fn set_radio_state(&self, state: RadioState) {
        *self.radio_state.lock().unwrap() = state;
    }

    /// Latest operator joystick input.
    pub fn joystick(&self) -> JoystickInput {
        *self.joystick.lock().unwrap()
    }

    /// Update the operator joystick input.
    pub fn set_joystick(&self, input: JoystickInput) {
        *self.joystick.lock().unwrap() = input;
    }

    /// Whether the operator is in a menu (axes forced to zero on the wire).
    pub fn menu_mode(&self) -> bool {
        self.menu_mode.load(Ordering::SeqCst)
    }

    /// Enter or leave menu mode.
    pub fn set_menu_mode(&self, on: bool) {
        self.menu_mode.store(on, Ordering::SeqCst)
    }

    /// Whether a bulk transfer currently holds the channel.
    pub fn transfer_held(&self) -> bool {
        self.transfer_hold.load(Ordering::SeqCst)
    }

    /// Claim or release the channel for a bulk transfer.
    ///
    /// The scheduler skips its tick while the hold is set.
    pub fn set_transfer_hold(&self, held: bool) {
        self.transfer_hold.store(held, Ordering::SeqCst)
    }

    /// Robot id currently granted the reply window, 0 when none is.
    ///
    /// Telemetry frames that carry no robot id of their own are attributed
    /// to this slot.
    pub fn reply_slot(&self) -> u8 {
        self.reply_slot.load(Ordering::SeqCst)
    }

    /// Publish the robot id granted the next reply window.
    pub fn set_reply_slot(&self, id: u8) {
        self.reply_slot.store(id, Ordering::SeqCst)
    }
}
