//! Calendar proration of monthly goals.
//!
//! A goal is spread evenly over the days of the current month. On day `d` of a
//! month with `n` days the wearer is expected to have completed
//! `goal * d / n` units; the deficit is whatever is still missing. Arithmetic
//! runs in single precision, which is plenty for a two-decimal display.

use crate::config::DEFICIT_EPSILON;

const DAYS_PER_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Proleptic Gregorian leap-year rule.
#[must_use]
pub const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-based), or `None` for a month outside 1..=12.
#[must_use]
pub const fn days_in_month(year: u16, month: u8) -> Option<u8> {
    match month {
        2 => Some(if is_leap_year(year) { 29 } else { 28 }),
        1..=12 => Some(DAYS_PER_MONTH[(month - 1) as usize]),
        _ => None,
    }
}

/// Local calendar date as reported by the watch RTC.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CalendarDate {
    year: u16,
    month: u8,
    day: u8,
}

impl CalendarDate {
    /// Builds a date, rejecting months outside 1..=12 and days outside the month.
    #[must_use]
    pub const fn new(year: u16, month: u8, day: u8) -> Option<Self> {
        match days_in_month(year, month) {
            Some(days) if day >= 1 && day <= days => Some(Self { year, month, day }),
            _ => None,
        }
    }

    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }

    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }

    #[must_use]
    pub const fn day(&self) -> u8 {
        self.day
    }

    /// Length of this date's month.
    #[must_use]
    pub const fn days_in_month(&self) -> u8 {
        match days_in_month(self.year, self.month) {
            Some(days) => days,
            None => DAYS_PER_MONTH[0],
        }
    }

    /// Fraction of the month elapsed, counting today as complete.
    #[must_use]
    pub fn elapsed_fraction(&self) -> f32 {
        f32::from(self.day) / f32::from(self.days_in_month())
    }
}

/// Units still owed against `goal` given `actual` progress on `date`.
///
/// Returns `0.0` when the date is unknown so the face never nags on a
/// missing clock.
#[must_use]
pub fn deficit(goal: u16, actual: u16, date: Option<CalendarDate>) -> f32 {
    let Some(date) = date else {
        return 0.0;
    };

    let expected = f32::from(goal) * date.elapsed_fraction();
    let shortfall = expected - f32::from(actual);
    if shortfall < 0.0 { 0.0 } else { shortfall }
}

/// Returns `true` when a deficit is large enough to show.
#[must_use]
pub fn has_deficit(value: f32) -> bool {
    value > DEFICIT_EPSILON
}
