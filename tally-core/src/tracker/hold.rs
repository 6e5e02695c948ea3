//! Per-button hold timers sampled once per second.

use crate::config::TrackerConfig;

/// Action produced when a hold crosses a threshold.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HoldAction {
    Increment,
    Reset,
}

/// Tracks how long one button has been held and whether it already acted.
///
/// One physical hold performs at most one action. The increment fires when
/// the hold reaches the increment threshold; the reset only fires when the
/// reset threshold is reached no later than the increment one. Sampled
/// once per second with the default thresholds, a continuous hold therefore
/// increments and then does nothing further until released.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct HoldTimer {
    seconds: u8,
    action_done: bool,
}

impl HoldTimer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            seconds: 0,
            action_done: false,
        }
    }

    /// Whole seconds the button has been observed held.
    #[must_use]
    pub const fn seconds(&self) -> u8 {
        self.seconds
    }

    /// Returns `true` once this hold has performed its action.
    #[must_use]
    pub const fn is_spent(&self) -> bool {
        self.action_done
    }

    /// Feeds one whole-second sample of the button level.
    pub fn sample(&mut self, pressed: bool, config: &TrackerConfig) -> Option<HoldAction> {
        if !pressed {
            self.release();
            return None;
        }

        self.seconds = self.seconds.saturating_add(1);
        if self.action_done {
            return None;
        }

        let action = if self.seconds >= config.reset_hold_seconds() {
            HoldAction::Reset
        } else if self.seconds >= config.inc_hold_seconds() {
            HoldAction::Increment
        } else {
            return None;
        };
        self.action_done = true;
        Some(action)
    }

    /// Forgets the current hold.
    pub fn release(&mut self) {
        *self = Self::new();
    }
}
