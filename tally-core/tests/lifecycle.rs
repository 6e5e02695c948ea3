use tally_core::config::{Counter, GOAL_A_DEFAULT, MAX_TALLY_A, MIN_GOAL};
use tally_core::face::{FaceEvent, FaceParts, FaceSettings, LoopOutcome, TallyFace, dispatch};
use tally_core::gesture::TapFlags;
use tally_core::hal::{FixedCalendar, HeldButtons, LatchedTaps};
use tally_core::persistence::{MemoryBackup, TallyStore};
use tally_core::render::ValueLine;
use tally_core::tracker::{Mode, TrackerEvent};

type Face = TallyFace<MemoryBackup, HeldButtons, LatchedTaps, FixedCalendar>;

fn boot(backup: MemoryBackup) -> Face {
    TallyFace::new(FaceParts::new(
        backup,
        HeldButtons::released(),
        LatchedTaps::new(),
        FixedCalendar::unavailable(),
    ))
    .expect("default timing is valid")
}

fn second(face: &mut Face) -> LoopOutcome {
    face.handle(FaceEvent::Tick { subsecond: 0 })
}

fn enter_goal_a(face: &mut Face) {
    for _ in 0..3 {
        face.taps_mut().inject(TapFlags::SINGLE);
        let _ = second(face);
    }
    assert_eq!(face.state().mode(), Mode::SetGoalA);
}

#[test]
fn values_survive_a_power_cycle() {
    let mut face = boot(MemoryBackup::new());
    face.buttons_mut().secondary = true;
    let _ = second(&mut face);
    let _ = second(&mut face);
    face.buttons_mut().secondary = false;
    let _ = second(&mut face);

    enter_goal_a(&mut face);
    for _ in 0..5 {
        let _ = face.handle(FaceEvent::PrimaryUp);
    }

    let rebooted = boot(*face.backup());
    assert_eq!(rebooted.state().tally(Counter::B), 1);
    assert_eq!(rebooted.state().goal(Counter::A), GOAL_A_DEFAULT + 5);
    assert_eq!(rebooted.state().mode(), Mode::Normal);
}

#[test]
fn goal_a_of_500_survives_reload_and_zero_falls_back() {
    let mut store = TallyStore::new(MemoryBackup::new());
    store.store_goal_a(500);
    assert_eq!(boot(store.into_inner()).state().goal(Counter::A), 500);

    // The adapter clamps on write, so a stored zero only comes from raw bytes.
    let raw = [0x05, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03, 0x00];
    let face = boot(MemoryBackup::from_bytes(raw));
    assert_eq!(face.state().goal(Counter::A), GOAL_A_DEFAULT);
    assert_eq!(face.state().goal(Counter::B), 3);
    assert_eq!(face.state().tally(Counter::A), 5);
}

#[test]
fn mode_button_releases_focus_outside_goal_editing() {
    let mut face = boot(MemoryBackup::new());

    let outcome = face.handle(FaceEvent::ModeUp);
    assert!(!outcome.keep_active);
    assert_eq!(outcome.events.as_slice(), &[TrackerEvent::ReleaseRequested]);

    enter_goal_a(&mut face);
    let outcome = face.handle(FaceEvent::ModeUp);
    assert!(outcome.keep_active);
    assert_eq!(face.state().mode(), Mode::Normal);
}

#[test]
fn goal_edits_clamp_and_goal_b_has_no_increment() {
    let mut face = boot(MemoryBackup::new());
    enter_goal_a(&mut face);

    for _ in 0..20 {
        let _ = face.handle(FaceEvent::SecondaryUp);
    }
    assert_eq!(face.state().goal(Counter::A), MIN_GOAL);

    // Second triple moves on to goal B.
    for _ in 0..3 {
        face.taps_mut().inject(TapFlags::SINGLE);
        let _ = second(&mut face);
    }
    assert_eq!(face.state().mode(), Mode::SetGoalB);

    let outcome = face.handle(FaceEvent::PrimaryUp);
    assert!(outcome.events.is_empty());
    assert_eq!(face.state().goal(Counter::B), 4);

    let _ = face.handle(FaceEvent::SecondaryUp);
    assert_eq!(face.state().goal(Counter::B), 3);
    assert_eq!(
        TallyStore::new(*face.backup()).load().goal_b,
        3,
        "goal edits are written through immediately"
    );
}

#[test]
fn tallies_never_leave_their_range() {
    let mut backup = TallyStore::new(MemoryBackup::new());
    backup.store_tally_a(MAX_TALLY_A - 1);
    let mut face = boot(backup.into_inner());

    // Repeated short holds, each long enough for exactly one increment.
    for _ in 0..6 {
        face.buttons_mut().primary = true;
        let _ = second(&mut face);
        let _ = second(&mut face);
        face.buttons_mut().primary = false;
        let _ = second(&mut face);
        assert!(face.state().tally(Counter::A) <= MAX_TALLY_A);
    }
    assert_eq!(face.state().tally(Counter::A), MAX_TALLY_A);
}

#[test]
fn empty_slot_is_inert() {
    let mut slot: Option<Face> = None;
    for event in [
        FaceEvent::Activate,
        FaceEvent::Tick { subsecond: 0 },
        FaceEvent::PrimaryUp,
        FaceEvent::ModeUp,
    ] {
        assert_eq!(dispatch(&mut slot, event), LoopOutcome::release());
    }
    assert!(slot.is_none());
}

#[test]
fn clock_directive_follows_settings() {
    let mut face = boot(MemoryBackup::new());
    face.set_settings(FaceSettings { clock_24h: true });
    let frame = face
        .handle(FaceEvent::Tick { subsecond: 5 })
        .frame
        .expect("ticks always render");
    assert_eq!(
        frame.value,
        ValueLine::Clock {
            twenty_four_hour: true
        }
    );
}

#[test]
fn journal_keeps_every_change_with_its_time() {
    let mut face = boot(MemoryBackup::new());
    face.buttons_mut().primary = true;
    let _ = second(&mut face);
    let _ = second(&mut face);

    let entry = face.journal().latest().copied().expect("increment journaled");
    assert_eq!(entry.at_ms, 2_000);
    assert_eq!(
        entry.event,
        TrackerEvent::TallyIncremented {
            counter: Counter::A,
            value: 1
        }
    );
    assert_eq!(face.journal().len(), 1);
}

#[test]
fn activation_restarts_hold_timing() {
    let mut face = boot(MemoryBackup::new());
    assert_eq!(face.activate(), 1);

    face.buttons_mut().primary = true;
    let _ = second(&mut face);
    let _ = face.handle(FaceEvent::Activate);
    assert!(second(&mut face).events.is_empty());
    assert_eq!(face.state().tally(Counter::A), 0);
}
