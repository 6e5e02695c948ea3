//! Tap gesture classification from the accelerometer interrupt-source register.
//!
//! The LIS2DW reports single and double taps as independent latched bits, and
//! the register is only sampled once per second. A physical triple tap shows
//! up as a run of single-tap samples, so classification happens in stages:
//! double taps are accepted immediately, single taps accumulate into a run, a
//! run of three becomes a triple, and a run that goes quiet for longer than the
//! tap window is confirmed as a single tap. Every accepted gesture starts a
//! debounce window during which further flags are ignored.

use core::fmt;

use crate::config::{TAP_DEBOUNCE_MS, TRIPLE_TAP_WINDOW_MS};

/// Number of taps that completes a triple-tap run.
pub const TRIPLE_TAP_COUNT: u8 = 3;

/// Sampled interrupt-source bits relevant to tap detection.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TapFlags(u8);

impl TapFlags {
    /// `TAP_SRC` bit reporting a double tap.
    pub const DOUBLE_TAP_BIT: u8 = 1 << 5;
    /// `TAP_SRC` bit reporting a single tap.
    pub const SINGLE_TAP_BIT: u8 = 1 << 6;
    /// No tap reported.
    pub const NONE: Self = Self(0);
    /// Only the single-tap bit.
    pub const SINGLE: Self = Self(Self::SINGLE_TAP_BIT);
    /// Only the double-tap bit.
    pub const DOUBLE: Self = Self(Self::DOUBLE_TAP_BIT);

    /// Wraps a raw register value. Unrelated bits are kept but ignored.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Combines two samples.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn single_tap(self) -> bool {
        self.0 & Self::SINGLE_TAP_BIT != 0
    }

    #[must_use]
    pub const fn double_tap(self) -> bool {
        self.0 & Self::DOUBLE_TAP_BIT != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.single_tap() && !self.double_tap()
    }
}

/// Classified tap pattern.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Gesture {
    Single,
    Double,
    Triple,
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gesture::Single => f.write_str("single-tap"),
            Gesture::Double => f.write_str("double-tap"),
            Gesture::Triple => f.write_str("triple-tap"),
        }
    }
}

/// Debounces tap flags into at most one [`Gesture`] per sample.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GestureDebouncer {
    window_ms: u32,
    debounce_ms: u32,
    tap_count: u8,
    last_tap_ms: u32,
    last_gesture_ms: Option<u32>,
}

impl GestureDebouncer {
    /// Creates a debouncer with the default tap window and debounce time.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_timing(TRIPLE_TAP_WINDOW_MS, TAP_DEBOUNCE_MS)
    }

    /// Creates a debouncer with explicit timing.
    #[must_use]
    pub const fn with_timing(window_ms: u32, debounce_ms: u32) -> Self {
        Self {
            window_ms,
            debounce_ms,
            tap_count: 0,
            last_tap_ms: 0,
            last_gesture_ms: None,
        }
    }

    /// Number of taps in the run currently accumulating.
    #[must_use]
    pub const fn tap_count(&self) -> u8 {
        self.tap_count
    }

    /// Timestamp of the latest tap in the current run, if one is accumulating.
    #[must_use]
    pub const fn last_tap_ms(&self) -> Option<u32> {
        if self.tap_count > 0 {
            Some(self.last_tap_ms)
        } else {
            None
        }
    }

    /// Timestamp of the most recently accepted gesture.
    #[must_use]
    pub const fn last_gesture_ms(&self) -> Option<u32> {
        self.last_gesture_ms
    }

    /// Returns `true` while a single-tap run is waiting to resolve.
    #[must_use]
    pub const fn is_accumulating(&self) -> bool {
        self.tap_count > 0
    }

    /// Feeds one register sample taken at `now` (milliseconds).
    pub fn observe(&mut self, flags: TapFlags, now: u32) -> Option<Gesture> {
        if flags.double_tap() && self.debounce_elapsed(now) {
            self.accept(now);
            self.clear_run();
            return Some(Gesture::Double);
        }

        if flags.single_tap() && self.debounce_elapsed(now) {
            self.register_tap(now);
            if self.tap_count >= TRIPLE_TAP_COUNT {
                let accepted = self.debounce_elapsed(now);
                self.clear_run();
                if accepted {
                    self.accept(now);
                    return Some(Gesture::Triple);
                }
            }
        }

        if self.tap_count > 0 && now.wrapping_sub(self.last_tap_ms) > self.window_ms {
            let accepted = self.debounce_elapsed(now);
            self.clear_run();
            if accepted {
                self.accept(now);
                return Some(Gesture::Single);
            }
        }

        None
    }

    fn register_tap(&mut self, now: u32) {
        if self.tap_count == 0 || now.wrapping_sub(self.last_tap_ms) > self.window_ms {
            self.tap_count = 1;
        } else {
            self.tap_count = self.tap_count.saturating_add(1);
        }
        self.last_tap_ms = now;
    }

    fn debounce_elapsed(&self, now: u32) -> bool {
        match self.last_gesture_ms {
            Some(previous) => now.wrapping_sub(previous) > self.debounce_ms,
            None => true,
        }
    }

    fn accept(&mut self, now: u32) {
        self.last_gesture_ms = Some(now);
    }

    fn clear_run(&mut self) {
        self.tap_count = 0;
        self.last_tap_ms = 0;
    }
}

impl Default for GestureDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_quick_taps_make_one_triple() {
        let mut taps = GestureDebouncer::new();

        assert_eq!(taps.observe(TapFlags::SINGLE, 0), None);
        assert_eq!(taps.observe(TapFlags::SINGLE, 500), None);
        assert_eq!(taps.tap_count(), 2);
        assert_eq!(taps.observe(TapFlags::SINGLE, 900), Some(Gesture::Triple));
        assert!(!taps.is_accumulating());

        // The run is gone, so nothing resolves later as a single.
        assert_eq!(taps.observe(TapFlags::NONE, 5_000), None);
    }

    #[test]
    fn quiet_run_confirms_single_tap() {
        let mut taps = GestureDebouncer::new();

        assert_eq!(taps.observe(TapFlags::SINGLE, 1_000), None);
        assert_eq!(taps.observe(TapFlags::NONE, 2_000), None);
        assert_eq!(taps.observe(TapFlags::NONE, 2_500), None);
        assert_eq!(taps.observe(TapFlags::NONE, 2_501), Some(Gesture::Single));
        assert_eq!(taps.last_gesture_ms(), Some(2_501));
        assert_eq!(taps.tap_count(), 0);
    }

    #[test]
    fn double_tap_discards_accumulating_run() {
        let mut taps = GestureDebouncer::new();

        assert_eq!(taps.observe(TapFlags::SINGLE, 1_000), None);
        assert_eq!(taps.observe(TapFlags::SINGLE, 2_000), None);
        assert_eq!(taps.tap_count(), 2);

        let both = TapFlags::SINGLE.union(TapFlags::DOUBLE);
        assert_eq!(taps.observe(both, 3_000), Some(Gesture::Double));
        assert_eq!(taps.tap_count(), 0);
        assert_eq!(taps.observe(TapFlags::NONE, 9_000), None);
    }

    #[test]
    fn gestures_inside_debounce_window_are_dropped() {
        let mut taps = GestureDebouncer::new();

        assert_eq!(taps.observe(TapFlags::DOUBLE, 1_000), Some(Gesture::Double));
        assert_eq!(taps.observe(TapFlags::DOUBLE, 1_250), None);
        assert_eq!(taps.observe(TapFlags::SINGLE, 1_100), None);
        assert_eq!(taps.tap_count(), 0);
        assert_eq!(taps.observe(TapFlags::DOUBLE, 1_251), Some(Gesture::Double));
    }

    #[test]
    fn late_tap_restarts_the_run() {
        let mut taps = GestureDebouncer::new();

        assert_eq!(taps.observe(TapFlags::SINGLE, 0), None);
        assert_eq!(taps.observe(TapFlags::SINGLE, 1_000), None);
        assert_eq!(taps.tap_count(), 2);

        // Arrives after the window: the run starts over instead of completing.
        assert_eq!(taps.observe(TapFlags::SINGLE, 2_600), None);
        assert_eq!(taps.tap_count(), 1);
        assert_eq!(taps.last_tap_ms(), Some(2_600));
    }

    #[test]
    fn clock_wraparound_keeps_window_arithmetic() {
        let mut taps = GestureDebouncer::new();
        let start = u32::MAX - 400;

        assert_eq!(taps.observe(TapFlags::SINGLE, start), None);
        assert_eq!(taps.observe(TapFlags::SINGLE, start.wrapping_add(600)), None);
        assert_eq!(
            taps.observe(TapFlags::SINGLE, start.wrapping_add(1_200)),
            Some(Gesture::Triple)
        );
    }

    #[test]
    fn flags_decode_register_bits() {
        let flags = TapFlags::from_bits(0b0110_0000);
        assert!(flags.single_tap());
        assert!(flags.double_tap());
        assert!(TapFlags::from_bits(0b0000_0111).is_empty());
    }
}
