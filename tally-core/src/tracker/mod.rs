//! Mode and action state machine for the tally face.
//!
//! [`TrackerState`] owns every session value: the two tallies and goals, the
//! hold timers, the tap debouncer, the current [`Mode`], and the deficit
//! countdown. It never touches hardware. Callers feed it one [`TickInputs`]
//! sample per whole second plus button-up edges, and it reports what changed
//! as [`TrackerEvent`]s so the caller can persist and journal them.
//!
//! Within a tick the order is fixed: advance the clock, sample the hold
//! timers (A then B), classify taps, then step the deficit countdown.

use core::fmt;

use heapless::Vec;

use crate::config::{Counter, TICK_STEP_MS, TrackerConfig};
use crate::deficit::{CalendarDate, deficit, has_deficit};
use crate::gesture::{Gesture, GestureDebouncer, TapFlags};
use crate::persistence::StoredTallies;

pub mod hold;

pub use hold::{HoldAction, HoldTimer};

/// Upper bound on events a single tick or edge can produce.
pub const TRACKER_EVENT_CAPACITY: usize = 8;

/// Events produced by one call into the tracker.
pub type TrackerEvents = Vec<TrackerEvent, TRACKER_EVENT_CAPACITY>;

/// Screen the face is currently showing.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Normal,
    ShowDeficit,
    SetGoalA,
    SetGoalB,
}

impl Mode {
    /// Returns `true` in either goal-editing mode.
    #[must_use]
    pub const fn is_setting(self) -> bool {
        matches!(self, Mode::SetGoalA | Mode::SetGoalB)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Normal => f.write_str("normal"),
            Mode::ShowDeficit => f.write_str("show-deficit"),
            Mode::SetGoalA => f.write_str("set-goal-a"),
            Mode::SetGoalB => f.write_str("set-goal-b"),
        }
    }
}

/// Button release edges delivered by the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ButtonEdge {
    Primary,
    Secondary,
    Mode,
}

impl fmt::Display for ButtonEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonEdge::Primary => f.write_str("primary"),
            ButtonEdge::Secondary => f.write_str("secondary"),
            ButtonEdge::Mode => f.write_str("mode"),
        }
    }
}

/// Observable outcome of a tracker operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TrackerEvent {
    TallyIncremented { counter: Counter, value: u16 },
    TallyReset { counter: Counter },
    GoalChanged { counter: Counter, value: u16 },
    GestureAccepted(Gesture),
    ModeChanged { from: Mode, to: Mode },
    ReleaseRequested,
}

impl TrackerEvent {
    /// Returns `true` for events that change a persisted value.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        matches!(
            self,
            TrackerEvent::TallyIncremented { .. }
                | TrackerEvent::TallyReset { .. }
                | TrackerEvent::GoalChanged { .. }
        )
    }
}

impl fmt::Display for TrackerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerEvent::TallyIncremented { counter, value } => {
                write!(f, "tally {counter} -> {value}")
            }
            TrackerEvent::TallyReset { counter } => write!(f, "tally {counter} reset"),
            TrackerEvent::GoalChanged { counter, value } => write!(f, "goal {counter} -> {value}"),
            TrackerEvent::GestureAccepted(gesture) => write!(f, "gesture {gesture}"),
            TrackerEvent::ModeChanged { from, to } => write!(f, "mode {from} -> {to}"),
            TrackerEvent::ReleaseRequested => f.write_str("release requested"),
        }
    }
}

/// Collaborator readings taken at one whole-second tick.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TickInputs {
    pub primary_pressed: bool,
    pub secondary_pressed: bool,
    pub taps: TapFlags,
    pub date: Option<CalendarDate>,
}

/// Session state of one tally face.
#[derive(Clone, Debug)]
pub struct TrackerState {
    config: TrackerConfig,
    tally_a: u16,
    tally_b: u16,
    goal_a: u16,
    goal_b: u16,
    hold_a: HoldTimer,
    hold_b: HoldTimer,
    clock_ms: u32,
    gestures: GestureDebouncer,
    mode: Mode,
    countdown: u8,
}

impl TrackerState {
    /// Creates a session from persisted values, clamping anything out of range.
    #[must_use]
    pub fn new(stored: StoredTallies, config: TrackerConfig) -> Self {
        Self {
            config,
            tally_a: Counter::A.limits().clamp_tally(stored.tally_a),
            tally_b: Counter::B.limits().clamp_tally(stored.tally_b),
            goal_a: Counter::A.limits().goal_or_default(stored.goal_a),
            goal_b: Counter::B.limits().goal_or_default(stored.goal_b),
            hold_a: HoldTimer::new(),
            hold_b: HoldTimer::new(),
            clock_ms: 0,
            gestures: GestureDebouncer::with_timing(
                config.triple_tap_window_ms(),
                config.debounce_ms(),
            ),
            mode: Mode::Normal,
            countdown: 0,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    #[must_use]
    pub const fn tally(&self, counter: Counter) -> u16 {
        match counter {
            Counter::A => self.tally_a,
            Counter::B => self.tally_b,
        }
    }

    #[must_use]
    pub const fn goal(&self, counter: Counter) -> u16 {
        match counter {
            Counter::A => self.goal_a,
            Counter::B => self.goal_b,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Seconds left on the deficit screen; only meaningful in [`Mode::ShowDeficit`].
    #[must_use]
    pub const fn countdown(&self) -> u8 {
        self.countdown
    }

    /// Session clock in milliseconds, advanced once per whole-second tick.
    #[must_use]
    pub const fn clock_ms(&self) -> u32 {
        self.clock_ms
    }

    #[must_use]
    pub const fn gestures(&self) -> &GestureDebouncer {
        &self.gestures
    }

    #[must_use]
    pub const fn hold(&self, counter: Counter) -> &HoldTimer {
        match counter {
            Counter::A => &self.hold_a,
            Counter::B => &self.hold_b,
        }
    }

    /// Units still owed on `counter` as of `date`.
    #[must_use]
    pub fn deficit(&self, counter: Counter, date: Option<CalendarDate>) -> f32 {
        deficit(self.goal(counter), self.tally(counter), date)
    }

    /// Clears both hold timers. Called when the face regains focus.
    pub fn reset_holds(&mut self) {
        self.hold_a.release();
        self.hold_b.release();
    }

    /// Runs one whole-second step.
    pub fn tick(&mut self, inputs: TickInputs) -> TrackerEvents {
        let mut events = TrackerEvents::new();
        self.clock_ms = self.clock_ms.wrapping_add(TICK_STEP_MS);

        let held = self.hold_a.sample(inputs.primary_pressed, &self.config);
        if let Some(action) = held {
            self.apply_hold(Counter::A, action, &mut events);
        }
        let held = self.hold_b.sample(inputs.secondary_pressed, &self.config);
        if let Some(action) = held {
            self.apply_hold(Counter::B, action, &mut events);
        }

        if let Some(gesture) = self.gestures.observe(inputs.taps, self.clock_ms) {
            push(&mut events, TrackerEvent::GestureAccepted(gesture));
            self.apply_gesture(gesture, inputs.date, &mut events);
        }

        if self.mode == Mode::ShowDeficit {
            self.countdown = self.countdown.saturating_sub(1);
            if self.countdown == 0 {
                self.set_mode(Mode::Normal, &mut events);
            }
        }

        events
    }

    /// Handles a button release edge.
    pub fn button_up(&mut self, edge: ButtonEdge) -> TrackerEvents {
        let mut events = TrackerEvents::new();
        match (edge, self.mode) {
            (ButtonEdge::Primary, Mode::SetGoalA) => {
                let raised = self.goal_a.saturating_add(1);
                self.change_goal(Counter::A, raised, &mut events);
            }
            (ButtonEdge::Secondary, Mode::SetGoalA) => {
                let lowered = self.goal_a.saturating_sub(1);
                self.change_goal(Counter::A, lowered, &mut events);
            }
            (ButtonEdge::Secondary, Mode::SetGoalB) => {
                let lowered = self.goal_b.saturating_sub(1);
                self.change_goal(Counter::B, lowered, &mut events);
            }
            (ButtonEdge::Mode, mode) if mode.is_setting() => {
                self.set_mode(Mode::Normal, &mut events);
            }
            (ButtonEdge::Mode, _) => push(&mut events, TrackerEvent::ReleaseRequested),
            // Goal B has no increment edge; the primary button is ignored in SetGoalB.
            _ => {}
        }
        events
    }

    fn apply_hold(&mut self, counter: Counter, action: HoldAction, events: &mut TrackerEvents) {
        match action {
            HoldAction::Increment => {
                let value = counter
                    .limits()
                    .clamp_tally(self.tally(counter).saturating_add(1));
                self.set_tally(counter, value);
                push(events, TrackerEvent::TallyIncremented { counter, value });
            }
            HoldAction::Reset => {
                self.set_tally(counter, 0);
                push(events, TrackerEvent::TallyReset { counter });
            }
        }
    }

    fn apply_gesture(
        &mut self,
        gesture: Gesture,
        date: Option<CalendarDate>,
        events: &mut TrackerEvents,
    ) {
        match gesture {
            Gesture::Single => self.show_deficit_if_owed(Counter::A, date, events),
            Gesture::Double => self.show_deficit_if_owed(Counter::B, date, events),
            Gesture::Triple => {
                let next = if self.mode == Mode::SetGoalA {
                    Mode::SetGoalB
                } else {
                    Mode::SetGoalA
                };
                self.set_mode(next, events);
            }
        }
    }

    fn show_deficit_if_owed(
        &mut self,
        counter: Counter,
        date: Option<CalendarDate>,
        events: &mut TrackerEvents,
    ) {
        if has_deficit(self.deficit(counter, date)) {
            self.countdown = self.config.show_seconds();
            self.set_mode(Mode::ShowDeficit, events);
        }
    }

    fn change_goal(&mut self, counter: Counter, value: u16, events: &mut TrackerEvents) {
        let value = counter.limits().clamp_goal(value);
        match counter {
            Counter::A => self.goal_a = value,
            Counter::B => self.goal_b = value,
        }
        push(events, TrackerEvent::GoalChanged { counter, value });
    }

    fn set_tally(&mut self, counter: Counter, value: u16) {
        match counter {
            Counter::A => self.tally_a = value,
            Counter::B => self.tally_b = value,
        }
    }

    fn set_mode(&mut self, to: Mode, events: &mut TrackerEvents) {
        let from = self.mode;
        self.mode = to;
        if from != to {
            push(events, TrackerEvent::ModeChanged { from, to });
        }
    }
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new(StoredTallies::defaults(), TrackerConfig::default())
    }
}

fn push(events: &mut TrackerEvents, event: TrackerEvent) {
    // A tick produces at most five events, well under the capacity.
    let _ = events.push(event);
}
