//! Hardware-facing collaborator traits consumed by the face.
//!
//! Firmware implements these over GPIO, the LIS2DW accelerometer, and the RTC;
//! the emulator and tests implement them over plain fields. Each trait is also
//! implemented for `&mut T` so callers can lend a collaborator to a face
//! without giving up ownership.

use crate::deficit::CalendarDate;
use crate::gesture::TapFlags;

/// Buttons whose hold duration is tracked once per second.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HoldButton {
    /// Drives tally A (the LIGHT button on the watch).
    Primary,
    /// Drives tally B (the ALARM button on the watch).
    Secondary,
}

/// Samples the current level of the hold-tracked buttons.
pub trait ButtonSampler {
    /// Returns `true` while `button` is held down.
    fn is_pressed(&self, button: HoldButton) -> bool;
}

/// Source of latched tap interrupts.
pub trait TapSource {
    /// Reads (and on real hardware, clears) the interrupt-source register.
    fn interrupt_source(&mut self) -> TapFlags;
}

/// Source of the local calendar date.
pub trait Calendar {
    /// Returns today's date, or `None` when the clock is not available.
    fn local_date(&self) -> Option<CalendarDate>;
}

impl<T: ButtonSampler + ?Sized> ButtonSampler for &mut T {
    fn is_pressed(&self, button: HoldButton) -> bool {
        (**self).is_pressed(button)
    }
}

impl<T: TapSource + ?Sized> TapSource for &mut T {
    fn interrupt_source(&mut self) -> TapFlags {
        (**self).interrupt_source()
    }
}

impl<T: Calendar + ?Sized> Calendar for &mut T {
    fn local_date(&self) -> Option<CalendarDate> {
        (**self).local_date()
    }
}

/// Button sampler backed by two flags.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct HeldButtons {
    pub primary: bool,
    pub secondary: bool,
}

impl HeldButtons {
    /// Creates a sampler with both buttons released.
    #[must_use]
    pub const fn released() -> Self {
        Self {
            primary: false,
            secondary: false,
        }
    }

    /// Updates the level of one button.
    pub fn set(&mut self, button: HoldButton, pressed: bool) {
        match button {
            HoldButton::Primary => self.primary = pressed,
            HoldButton::Secondary => self.secondary = pressed,
        }
    }
}

impl ButtonSampler for HeldButtons {
    fn is_pressed(&self, button: HoldButton) -> bool {
        match button {
            HoldButton::Primary => self.primary,
            HoldButton::Secondary => self.secondary,
        }
    }
}

/// Tap source that latches injected flags until the next read, like the
/// LIS2DW `TAP_SRC` register.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct LatchedTaps {
    pending: TapFlags,
}

impl LatchedTaps {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: TapFlags::NONE,
        }
    }

    /// Latches `flags` for the next register read.
    pub fn inject(&mut self, flags: TapFlags) {
        self.pending = self.pending.union(flags);
    }
}

impl TapSource for LatchedTaps {
    fn interrupt_source(&mut self) -> TapFlags {
        core::mem::take(&mut self.pending)
    }
}

/// Calendar that always reports the same date (or none).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FixedCalendar {
    date: Option<CalendarDate>,
}

impl FixedCalendar {
    #[must_use]
    pub const fn new(date: Option<CalendarDate>) -> Self {
        Self { date }
    }

    /// Calendar with no date, as on a watch whose clock was never set.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { date: None }
    }

    pub fn set(&mut self, date: Option<CalendarDate>) {
        self.date = date;
    }
}

impl Calendar for FixedCalendar {
    fn local_date(&self) -> Option<CalendarDate> {
        self.date
    }
}
