//! Communication-quality window.

use serde::{Deserialize, Serialize};

/// Polling cycles remembered per robot.
pub const COMM_WINDOW: usize = 20;

/// Fixed-size circular hit/miss buffer over the most recent polling cycles.
///
/// Each slot records whether the robot's reply was observed for one of its
/// polling slots. Old entries are overwritten, never averaged in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommWindow {
    slots: [bool; COMM_WINDOW],
    cursor: usize,
}

impl Default for CommWindow {
    fn default() -> Self {
        CommWindow {
            slots: [false; COMM_WINDOW],
            cursor: 0,
        }
    }
}

impl CommWindow {
    /// Record one hit (reply seen) or miss at the cursor and advance it.
    pub fn push(&mut self, hit: bool) {
        self.slots[self.cursor] = hit;
        self.cursor = (self.cursor + 1) % COMM_WINDOW;
    }

    /// Fraction of hits across the window, 0.0 to 1.0.
    pub fn quality(&self) -> f64 {
        let hits = self.slots.iter().filter(|&&slot| slot).count();
        hits as f64 / COMM_WINDOW as f64
    }
}
