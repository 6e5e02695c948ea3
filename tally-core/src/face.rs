//! Host-facing lifecycle of the tally face.
//!
//! A watch host owns one slot per face and drives it with [`FaceEvent`]s:
//! `setup` once at boot, `activate` when the face gains focus, `handle` for
//! every tick and button edge, and `resign` when focus moves away. The face
//! samples its collaborators, runs the [`TrackerState`], writes every changed
//! value through to the backup region, journals what happened, and hands back
//! a [`Frame`] to draw.

use crate::config::{ConfigError, TICK_FREQUENCY_HZ, TrackerConfig};
use crate::hal::{ButtonSampler, Calendar, HoldButton, TapSource};
use crate::journal::Journal;
use crate::persistence::{BackupStore, TallyStore};
use crate::render::{Frame, render};
use crate::tracker::{ButtonEdge, TickInputs, TrackerEvent, TrackerEvents, TrackerState};

/// Events delivered by the host scheduler.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FaceEvent {
    Activate,
    /// Periodic tick; `subsecond == 0` marks a whole second.
    Tick { subsecond: u8 },
    PrimaryUp,
    SecondaryUp,
    ModeUp,
    Resign,
}

/// Host preferences forwarded into rendering.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FaceSettings {
    pub clock_24h: bool,
}

/// Result of handling one event.
#[derive(Clone, Debug, PartialEq)]
pub struct LoopOutcome {
    /// Frame to draw, present for every tick.
    pub frame: Option<Frame>,
    /// `false` when the face asks the host to move focus elsewhere.
    pub keep_active: bool,
    /// What changed while handling the event.
    pub events: TrackerEvents,
}

impl LoopOutcome {
    /// Outcome of an inert face: nothing drawn, focus released.
    #[must_use]
    pub fn release() -> Self {
        Self {
            frame: None,
            keep_active: false,
            events: TrackerEvents::new(),
        }
    }

    fn stay(frame: Option<Frame>, events: TrackerEvents) -> Self {
        Self {
            frame,
            keep_active: true,
            events,
        }
    }
}

/// Everything needed to build a face.
#[derive(Clone, Debug)]
pub struct FaceParts<S, B, T, C> {
    pub backup: S,
    pub buttons: B,
    pub taps: T,
    pub calendar: C,
    pub config: TrackerConfig,
    pub settings: FaceSettings,
}

impl<S, B, T, C> FaceParts<S, B, T, C> {
    /// Parts with the default timing and a 12-hour clock.
    #[must_use]
    pub fn new(backup: S, buttons: B, taps: T, calendar: C) -> Self {
        Self {
            backup,
            buttons,
            taps,
            calendar,
            config: TrackerConfig::default(),
            settings: FaceSettings::default(),
        }
    }
}

/// A tally face bound to its collaborators.
pub struct TallyFace<S, B, T, C> {
    store: TallyStore<S>,
    buttons: B,
    taps: T,
    calendar: C,
    settings: FaceSettings,
    state: TrackerState,
    journal: Journal,
}

impl<S, B, T, C> TallyFace<S, B, T, C>
where
    S: BackupStore,
    B: ButtonSampler,
    T: TapSource,
    C: Calendar,
{
    /// Builds a face, loading tallies and goals from the backup region.
    ///
    /// # Errors
    ///
    /// Fails when `parts.config` does not validate.
    pub fn new(parts: FaceParts<S, B, T, C>) -> Result<Self, ConfigError> {
        parts.config.validate()?;
        let store = TallyStore::new(parts.backup);
        let state = TrackerState::new(store.load(), parts.config);
        Ok(Self {
            store,
            buttons: parts.buttons,
            taps: parts.taps,
            calendar: parts.calendar,
            settings: parts.settings,
            state,
            journal: Journal::new(),
        })
    }

    /// Fills `slot` on first call; later calls leave the running face untouched
    /// and never invoke `init`.
    ///
    /// # Errors
    ///
    /// Fails when the parts built by `init` carry an invalid configuration; the
    /// slot then stays empty and the face is inert.
    pub fn setup<F>(slot: &mut Option<Self>, init: F) -> Result<(), ConfigError>
    where
        F: FnOnce() -> FaceParts<S, B, T, C>,
    {
        if slot.is_none() {
            *slot = Some(Self::new(init())?);
        }
        Ok(())
    }

    /// Prepares for focus and returns the tick rate to request, in hertz.
    pub fn activate(&mut self) -> u8 {
        self.state.reset_holds();
        TICK_FREQUENCY_HZ
    }

    /// Handles one host event.
    pub fn handle(&mut self, event: FaceEvent) -> LoopOutcome {
        match event {
            FaceEvent::Activate => {
                self.state.reset_holds();
                LoopOutcome::stay(None, TrackerEvents::new())
            }
            FaceEvent::Tick { subsecond } => self.tick(subsecond),
            FaceEvent::PrimaryUp => self.button_up(ButtonEdge::Primary),
            FaceEvent::SecondaryUp => self.button_up(ButtonEdge::Secondary),
            FaceEvent::ModeUp => self.button_up(ButtonEdge::Mode),
            FaceEvent::Resign => {
                self.resign();
                LoopOutcome::stay(None, TrackerEvents::new())
            }
        }
    }

    /// Called when the face loses focus. Session state is kept as-is.
    #[allow(clippy::unused_self)]
    pub fn resign(&mut self) {}

    /// Renders the current state without advancing it.
    #[must_use]
    pub fn frame(&self) -> Frame {
        render(
            &self.state,
            self.calendar.local_date(),
            self.settings.clock_24h,
        )
    }

    #[must_use]
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    #[must_use]
    pub fn settings(&self) -> FaceSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: FaceSettings) {
        self.settings = settings;
    }

    /// Returns the backup region the face writes through to.
    #[must_use]
    pub fn backup(&self) -> &S {
        self.store.backup()
    }

    pub fn buttons_mut(&mut self) -> &mut B {
        &mut self.buttons
    }

    pub fn taps_mut(&mut self) -> &mut T {
        &mut self.taps
    }

    pub fn calendar_mut(&mut self) -> &mut C {
        &mut self.calendar
    }

    fn tick(&mut self, subsecond: u8) -> LoopOutcome {
        let date = self.calendar.local_date();
        let mut events = TrackerEvents::new();

        if subsecond == 0 {
            let inputs = TickInputs {
                primary_pressed: self.buttons.is_pressed(HoldButton::Primary),
                secondary_pressed: self.buttons.is_pressed(HoldButton::Secondary),
                taps: self.taps.interrupt_source(),
                date,
            };
            events = self.state.tick(inputs);
            self.commit(&events);
        }

        let frame = render(&self.state, date, self.settings.clock_24h);
        LoopOutcome::stay(Some(frame), events)
    }

    fn button_up(&mut self, edge: ButtonEdge) -> LoopOutcome {
        let events = self.state.button_up(edge);
        self.commit(&events);

        let released = events.contains(&TrackerEvent::ReleaseRequested);
        LoopOutcome {
            frame: None,
            keep_active: !released,
            events,
        }
    }

    /// Writes changed values through to the backup region and journals every event.
    fn commit(&mut self, events: &TrackerEvents) {
        let at_ms = self.state.clock_ms();
        for event in events {
            if event.is_persistent() {
                self.persist(*event);
            }
            self.journal.record(at_ms, *event);
        }
    }

    fn persist(&mut self, event: TrackerEvent) {
        match event {
            TrackerEvent::TallyIncremented { counter, value } => {
                self.store.store_tally(counter, value);
            }
            TrackerEvent::TallyReset { counter } => self.store.store_tally(counter, 0),
            TrackerEvent::GoalChanged { counter, value } => {
                self.store.store_goal(counter, value);
            }
            TrackerEvent::GestureAccepted(_)
            | TrackerEvent::ModeChanged { .. }
            | TrackerEvent::ReleaseRequested => {}
        }
    }
}

/// Routes `event` to the face in `slot`, or releases focus when the slot is empty.
pub fn dispatch<S, B, T, C>(
    slot: &mut Option<TallyFace<S, B, T, C>>,
    event: FaceEvent,
) -> LoopOutcome
where
    S: BackupStore,
    B: ButtonSampler,
    T: TapSource,
    C: Calendar,
{
    match slot {
        Some(face) => face.handle(event),
        None => LoopOutcome::release(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{FixedCalendar, HeldButtons, LatchedTaps};
    use crate::persistence::MemoryBackup;

    type TestFace = TallyFace<MemoryBackup, HeldButtons, LatchedTaps, FixedCalendar>;

    fn parts() -> FaceParts<MemoryBackup, HeldButtons, LatchedTaps, FixedCalendar> {
        FaceParts::new(
            MemoryBackup::new(),
            HeldButtons::released(),
            LatchedTaps::new(),
            FixedCalendar::unavailable(),
        )
    }

    #[test]
    fn setup_only_initialises_an_empty_slot() {
        let mut slot: Option<TestFace> = None;
        TallyFace::setup(&mut slot, parts).unwrap();

        let face = slot.as_mut().unwrap();
        face.buttons_mut().primary = true;
        let _ = face.handle(FaceEvent::Tick { subsecond: 0 });
        let _ = face.handle(FaceEvent::Tick { subsecond: 0 });
        assert_eq!(face.state().tally(crate::config::Counter::A), 1);

        TallyFace::setup(&mut slot, || panic!("slot already filled")).unwrap();
        let face = slot.as_ref().unwrap();
        assert_eq!(face.state().tally(crate::config::Counter::A), 1);
    }

    #[test]
    fn invalid_timing_leaves_the_slot_empty() {
        let mut slot: Option<TestFace> = None;
        let result = TallyFace::setup(&mut slot, || {
            let mut parts = parts();
            parts.config = TrackerConfig::default().with_hold_seconds(5, 2);
            parts
        });
        assert!(result.is_err());
        assert!(slot.is_none());
        assert_eq!(
            dispatch(&mut slot, FaceEvent::Tick { subsecond: 0 }),
            LoopOutcome::release()
        );
    }

    #[test]
    fn activation_requests_one_hertz() {
        let mut face = TestFace::new(parts()).unwrap();
        assert_eq!(face.activate(), 1);
    }

    #[test]
    fn sub_second_ticks_render_without_advancing() {
        let mut face = TestFace::new(parts()).unwrap();
        let outcome = face.handle(FaceEvent::Tick { subsecond: 3 });
        assert!(outcome.keep_active);
        assert!(outcome.frame.is_some());
        assert_eq!(face.state().clock_ms(), 0);
    }
}
