//! Shared status storage for the firmware target.
//!
//! Button tasks publish levels here and the face task samples them once per
//! second, so neither side holds the other's GPIO.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};
use tally_core::hal::{ButtonSampler, HoldButton};

static LIGHT_HELD: AtomicBool = AtomicBool::new(false);
static ALARM_HELD: AtomicBool = AtomicBool::new(false);
/// Whether the face currently owns the display.
static FACE_FOCUSED: AtomicBool = AtomicBool::new(false);
/// Whole-second ticks delivered since boot.
static TICKS: AtomicU32 = AtomicU32::new(0);
/// Button-up edges lost to a full queue.
static DROPPED_EDGES: AtomicU32 = AtomicU32::new(0);

fn level_for(button: HoldButton) -> &'static AtomicBool {
    match button {
        HoldButton::Primary => &LIGHT_HELD,
        HoldButton::Secondary => &ALARM_HELD,
    }
}

pub fn record_button_level(button: HoldButton, pressed: bool) {
    level_for(button).store(pressed, Ordering::Relaxed);
}

pub fn record_focus(focused: bool) {
    FACE_FOCUSED.store(focused, Ordering::Relaxed);
}

#[must_use]
pub fn focused() -> bool {
    FACE_FOCUSED.load(Ordering::Relaxed)
}

/// Counts one tick and returns the new total.
#[must_use]
pub fn record_tick() -> u32 {
    TICKS.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
}

pub fn record_dropped_edge() {
    DROPPED_EDGES.fetch_add(1, Ordering::Relaxed);
}

#[must_use]
pub fn dropped_edges() -> u32 {
    DROPPED_EDGES.load(Ordering::Relaxed)
}

/// Button sampler backed by the levels the button tasks publish.
#[derive(Copy, Clone, Debug, Default)]
pub struct LatchedLevels;

impl ButtonSampler for LatchedLevels {
    fn is_pressed(&self, button: HoldButton) -> bool {
        level_for(button).load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_round_trip_through_the_sampler() {
        record_button_level(HoldButton::Primary, true);
        assert!(LatchedLevels.is_pressed(HoldButton::Primary));
        record_button_level(HoldButton::Primary, false);
        assert!(!LatchedLevels.is_pressed(HoldButton::Primary));
    }

    #[test]
    fn ticks_count_up() {
        let first = record_tick();
        let second = record_tick();
        assert!(second > first);
    }
}
