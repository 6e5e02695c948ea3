//! Display selection for the tally face.
//!
//! The face draws two regions: a short label line at the top and a main value
//! line. [`render`] picks their content from the current [`TrackerState`];
//! hosts are responsible for pushing the resulting [`Frame`] to real segments.
//! Number formats match the watch: `A:%03u B:%02u`, `%5.2f` deficits, and
//! `%3u` / `%2u` goals.

use core::fmt::{self, Write};

use heapless::String;

use crate::config::Counter;
use crate::deficit::{CalendarDate, has_deficit};
use crate::tracker::{Mode, TrackerState};

/// Longest text the face ever places on one display line.
pub const LINE_CAPACITY: usize = 16;

/// One bounded display line.
pub type Line = String<LINE_CAPACITY>;

/// Content of the main display line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValueLine {
    /// Literal text.
    Text(Line),
    /// Ask the host to draw the time of day in its own format.
    Clock { twenty_four_hour: bool },
}

impl fmt::Display for ValueLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueLine::Text(text) => f.write_str(text),
            ValueLine::Clock {
                twenty_four_hour: true,
            } => f.write_str("<clock 24h>"),
            ValueLine::Clock {
                twenty_four_hour: false,
            } => f.write_str("<clock 12h>"),
        }
    }
}

/// Everything the face wants on screen after one event.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Frame {
    pub label: Line,
    pub value: ValueLine,
}

impl Frame {
    /// Returns the value line text, or `None` when the clock is shown.
    #[must_use]
    pub fn value_text(&self) -> Option<&str> {
        match &self.value {
            ValueLine::Text(text) => Some(text.as_str()),
            ValueLine::Clock { .. } => None,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}]", self.label, self.value)
    }
}

/// Chooses the frame for the current state.
#[must_use]
pub fn render(state: &TrackerState, date: Option<CalendarDate>, clock_24h: bool) -> Frame {
    match state.mode() {
        Mode::ShowDeficit => {
            let owed_a = state.deficit(Counter::A, date);
            let owed_b = state.deficit(Counter::B, date);
            if has_deficit(owed_a) {
                deficit_frame(Counter::A, owed_a)
            } else if has_deficit(owed_b) {
                deficit_frame(Counter::B, owed_b)
            } else {
                normal_frame(state, clock_24h)
            }
        }
        Mode::SetGoalA => Frame {
            label: text("SET A"),
            value: ValueLine::Text(goal_text(Counter::A, state.goal(Counter::A))),
        },
        Mode::SetGoalB => Frame {
            label: text("SET B"),
            value: ValueLine::Text(goal_text(Counter::B, state.goal(Counter::B))),
        },
        Mode::Normal => normal_frame(state, clock_24h),
    }
}

/// Formats the normal-mode label, e.g. `A:007 B:03`.
#[must_use]
pub fn tally_line(tally_a: u16, tally_b: u16) -> Line {
    let mut line = Line::new();
    let _ = write!(line, "A:{tally_a:03} B:{tally_b:02}");
    line
}

/// Formats a deficit with two decimals in a five-character field.
#[must_use]
pub fn deficit_text(value: f32) -> Line {
    let mut line = Line::new();
    let _ = write!(line, "{value:5.2}");
    line
}

/// Formats a goal right-aligned to the counter's digit count.
#[must_use]
pub fn goal_text(counter: Counter, goal: u16) -> Line {
    let mut line = Line::new();
    let _ = match counter {
        Counter::A => write!(line, "{goal:3}"),
        Counter::B => write!(line, "{goal:2}"),
    };
    line
}

/// Writes a one-line summary of the state (e.g. `mode=normal a=3/12 b=0/4 clock=5000ms`).
///
/// # Errors
///
/// Propagates errors from `writer`.
pub fn write_status_line<W: Write>(state: &TrackerState, writer: &mut W) -> fmt::Result {
    write!(
        writer,
        "mode={} a={}/{} b={}/{} clock={}ms",
        state.mode(),
        state.tally(Counter::A),
        state.goal(Counter::A),
        state.tally(Counter::B),
        state.goal(Counter::B),
        state.clock_ms(),
    )?;
    if state.mode() == Mode::ShowDeficit {
        write!(writer, " countdown={}s", state.countdown())?;
    }
    if state.gestures().is_accumulating() {
        write!(writer, " taps={}", state.gestures().tap_count())?;
    }
    Ok(())
}

fn deficit_frame(counter: Counter, owed: f32) -> Frame {
    let label = match counter {
        Counter::A => text("GET A"),
        Counter::B => text("GET B"),
    };
    Frame {
        label,
        value: ValueLine::Text(deficit_text(owed)),
    }
}

fn normal_frame(state: &TrackerState, clock_24h: bool) -> Frame {
    Frame {
        label: tally_line(state.tally(Counter::A), state.tally(Counter::B)),
        value: ValueLine::Clock {
            twenty_four_hour: clock_24h,
        },
    }
}

fn text(value: &str) -> Line {
    let mut line = Line::new();
    let _ = line.push_str(value);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::gesture::TapFlags;
    use crate::persistence::StoredTallies;
    use crate::tracker::TickInputs;

    #[test]
    fn number_formats_match_the_watch() {
        assert_eq!(tally_line(7, 3).as_str(), "A:007 B:03");
        assert_eq!(tally_line(999, 99).as_str(), "A:999 B:99");
        assert_eq!(deficit_text(6.0).as_str(), " 6.00");
        assert_eq!(deficit_text(12.345).as_str(), "12.35");
        assert_eq!(goal_text(Counter::A, 12).as_str(), " 12");
        assert_eq!(goal_text(Counter::B, 4).as_str(), " 4");
    }

    #[test]
    fn normal_mode_shows_tallies_and_clock() {
        let state = TrackerState::new(
            StoredTallies {
                tally_a: 42,
                tally_b: 5,
                ..StoredTallies::defaults()
            },
            TrackerConfig::default(),
        );
        let frame = render(&state, None, true);
        assert_eq!(frame.label.as_str(), "A:042 B:05");
        assert_eq!(
            frame.value,
            ValueLine::Clock {
                twenty_four_hour: true
            }
        );
        assert_eq!(frame.value_text(), None);
    }

    #[test]
    fn deficit_screen_falls_back_to_normal_when_nothing_is_owed() {
        let date = CalendarDate::new(2025, 6, 15);
        let mut state = TrackerState::default();
        let _ = state.tick(TickInputs {
            taps: TapFlags::DOUBLE,
            date,
            ..TickInputs::default()
        });
        assert_eq!(state.mode(), Mode::ShowDeficit);

        let frame = render(&state, date, false);
        // Goal A is also behind, so A wins the label.
        assert_eq!(frame.label.as_str(), "GET A");
        assert_eq!(frame.value_text(), Some(" 6.00"));

        // Once the date disappears nothing is owed and the tallies come back.
        let frame = render(&state, None, false);
        assert_eq!(frame.label.as_str(), "A:000 B:00");
    }

    #[test]
    fn deficit_screen_shows_b_when_a_is_on_track() {
        let date = CalendarDate::new(2025, 6, 15);
        let mut state = TrackerState::new(
            StoredTallies {
                tally_a: 6,
                ..StoredTallies::defaults()
            },
            TrackerConfig::default(),
        );
        let _ = state.tick(TickInputs {
            taps: TapFlags::DOUBLE,
            date,
            ..TickInputs::default()
        });
        assert_eq!(state.mode(), Mode::ShowDeficit);

        let frame = render(&state, date, false);
        assert_eq!(frame.label.as_str(), "GET B");
        assert_eq!(frame.value_text(), Some(" 2.00"));
    }

    #[test]
    fn status_line_reports_mode_and_counters() {
        let state = TrackerState::default();
        let mut out: String<64> = String::new();
        write_status_line(&state, &mut out).unwrap();
        assert_eq!(out.as_str(), "mode=normal a=0/12 b=0/4 clock=0ms");
    }
}
