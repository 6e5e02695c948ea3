//! Timing thresholds, counter limits, and defaults for the tally face.
//!
//! The constants mirror the behaviour users learn on the wrist: hold a button
//! for two seconds to count, five seconds to clear, tap three times to edit
//! goals. [`TrackerConfig`] bundles the timing values so hosts and tests can
//! run the state machine with different windows without touching the logic.

use core::fmt;

/// Largest value tally A (and goal A) may take. Three display digits.
pub const MAX_TALLY_A: u16 = 999;
/// Largest value tally B (and goal B) may take. Two display digits.
pub const MAX_TALLY_B: u16 = 99;
/// Smallest goal accepted for either counter.
pub const MIN_GOAL: u16 = 1;
/// Goal A used on first run or when the stored value is out of range.
pub const GOAL_A_DEFAULT: u16 = 12;
/// Goal B used on first run or when the stored value is out of range.
pub const GOAL_B_DEFAULT: u16 = 4;

/// Seconds a button must be held before its counter increments.
pub const INC_HOLD_SECONDS: u8 = 2;
/// Seconds a button must be held before its counter resets to zero.
pub const RESET_HOLD_SECONDS: u8 = 5;
/// Seconds the catch-up deficit stays on screen after a tap.
pub const GET_SHOW_SECONDS: u8 = 3;

/// Maximum spacing between taps that still extends a multi-tap run.
pub const TRIPLE_TAP_WINDOW_MS: u32 = 1_500;
/// Minimum spacing between two accepted gestures.
pub const TAP_DEBOUNCE_MS: u32 = 250;

/// Amount the face clock advances on every whole-second tick.
pub const TICK_STEP_MS: u32 = 1_000;
/// Tick rate requested from the host while the face is active.
pub const TICK_FREQUENCY_HZ: u8 = 1;

/// Deficits at or below this value count as "goal met".
pub const DEFICIT_EPSILON: f32 = 0.0001;

/// Identifies one of the two tracked counters.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Counter {
    A,
    B,
}

impl Counter {
    /// Returns the range and default applied to this counter.
    #[must_use]
    pub const fn limits(self) -> GoalLimits {
        match self {
            Counter::A => LIMITS_A,
            Counter::B => LIMITS_B,
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Counter::A => f.write_str("A"),
            Counter::B => f.write_str("B"),
        }
    }
}

/// Range and default shared by a tally and its goal.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GoalLimits {
    pub max: u16,
    pub min_goal: u16,
    pub default_goal: u16,
}

impl GoalLimits {
    /// Creates limits with the shared [`MIN_GOAL`] floor.
    #[must_use]
    pub const fn new(max: u16, default_goal: u16) -> Self {
        Self {
            max,
            min_goal: MIN_GOAL,
            default_goal,
        }
    }

    /// Saturates a tally at the counter maximum.
    #[must_use]
    pub const fn clamp_tally(&self, value: u16) -> u16 {
        if value > self.max { self.max } else { value }
    }

    /// Clamps a goal into `[min_goal, max]`.
    #[must_use]
    pub const fn clamp_goal(&self, value: u16) -> u16 {
        if value < self.min_goal {
            self.min_goal
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Returns `true` when a stored goal can be used as-is.
    #[must_use]
    pub const fn goal_in_range(&self, value: u16) -> bool {
        value >= self.min_goal && value <= self.max
    }

    /// Accepts a stored goal or substitutes the default when it is out of range.
    #[must_use]
    pub const fn goal_or_default(&self, stored: u16) -> u16 {
        if self.goal_in_range(stored) {
            stored
        } else {
            self.default_goal
        }
    }
}

/// Limits for counter A.
pub const LIMITS_A: GoalLimits = GoalLimits::new(MAX_TALLY_A, GOAL_A_DEFAULT);
/// Limits for counter B.
pub const LIMITS_B: GoalLimits = GoalLimits::new(MAX_TALLY_B, GOAL_B_DEFAULT);

/// Timing thresholds driving holds, taps, and the deficit countdown.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TrackerConfig {
    inc_hold_seconds: u8,
    reset_hold_seconds: u8,
    show_seconds: u8,
    triple_tap_window_ms: u32,
    debounce_ms: u32,
}

impl TrackerConfig {
    /// Creates a configuration from explicit thresholds.
    #[must_use]
    pub const fn new(
        inc_hold_seconds: u8,
        reset_hold_seconds: u8,
        show_seconds: u8,
        triple_tap_window_ms: u32,
        debounce_ms: u32,
    ) -> Self {
        Self {
            inc_hold_seconds,
            reset_hold_seconds,
            show_seconds,
            triple_tap_window_ms,
            debounce_ms,
        }
    }

    /// Returns a copy with different hold thresholds.
    #[must_use]
    pub const fn with_hold_seconds(mut self, increment: u8, reset: u8) -> Self {
        self.inc_hold_seconds = increment;
        self.reset_hold_seconds = reset;
        self
    }

    /// Seconds of hold that trigger an increment.
    #[must_use]
    pub const fn inc_hold_seconds(&self) -> u8 {
        self.inc_hold_seconds
    }

    /// Seconds of hold that trigger a reset.
    #[must_use]
    pub const fn reset_hold_seconds(&self) -> u8 {
        self.reset_hold_seconds
    }

    /// Seconds the deficit screen stays up.
    #[must_use]
    pub const fn show_seconds(&self) -> u8 {
        self.show_seconds
    }

    /// Window in which successive taps extend a run.
    #[must_use]
    pub const fn triple_tap_window_ms(&self) -> u32 {
        self.triple_tap_window_ms
    }

    /// Minimum spacing between accepted gestures.
    #[must_use]
    pub const fn debounce_ms(&self) -> u32 {
        self.debounce_ms
    }

    /// Checks that the thresholds describe a usable state machine.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.inc_hold_seconds == 0 {
            return Err(ConfigError::ZeroIncrementHold);
        }
        if self.inc_hold_seconds >= self.reset_hold_seconds {
            return Err(ConfigError::ResetNotAfterIncrement {
                increment: self.inc_hold_seconds,
                reset: self.reset_hold_seconds,
            });
        }
        if self.show_seconds == 0 {
            return Err(ConfigError::ZeroShowSeconds);
        }
        if self.triple_tap_window_ms == 0 {
            return Err(ConfigError::ZeroTapWindow);
        }
        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new(
            INC_HOLD_SECONDS,
            RESET_HOLD_SECONDS,
            GET_SHOW_SECONDS,
            TRIPLE_TAP_WINDOW_MS,
            TAP_DEBOUNCE_MS,
        )
    }
}

/// Reasons a [`TrackerConfig`] is rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    ZeroIncrementHold,
    ResetNotAfterIncrement { increment: u8, reset: u8 },
    ZeroShowSeconds,
    ZeroTapWindow,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroIncrementHold => f.write_str("increment hold must be at least 1s"),
            ConfigError::ResetNotAfterIncrement { increment, reset } => write!(
                f,
                "reset hold ({reset}s) must be longer than increment hold ({increment}s)"
            ),
            ConfigError::ZeroShowSeconds => f.write_str("deficit display time must be at least 1s"),
            ConfigError::ZeroTapWindow => f.write_str("tap window must be non-zero"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TrackerConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.inc_hold_seconds(), INC_HOLD_SECONDS);
        assert_eq!(config.reset_hold_seconds(), RESET_HOLD_SECONDS);
        assert_eq!(config.debounce_ms(), TAP_DEBOUNCE_MS);
    }

    #[test]
    fn reset_must_follow_increment() {
        let config = TrackerConfig::default().with_hold_seconds(4, 4);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ResetNotAfterIncrement {
                increment: 4,
                reset: 4
            })
        );
        assert_eq!(
            TrackerConfig::default().with_hold_seconds(0, 3).validate(),
            Err(ConfigError::ZeroIncrementHold)
        );
    }

    #[test]
    fn goal_limits_clamp_and_default() {
        assert_eq!(LIMITS_A.clamp_goal(0), MIN_GOAL);
        assert_eq!(LIMITS_A.clamp_goal(1_200), MAX_TALLY_A);
        assert_eq!(LIMITS_B.clamp_tally(150), MAX_TALLY_B);
        assert_eq!(LIMITS_A.goal_or_default(0), GOAL_A_DEFAULT);
        assert_eq!(LIMITS_B.goal_or_default(100), GOAL_B_DEFAULT);
        assert_eq!(LIMITS_B.goal_or_default(99), 99);
    }
}
