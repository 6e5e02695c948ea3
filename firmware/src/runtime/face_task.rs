use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Ticker};
use tally_core::config::TICK_FREQUENCY_HZ;
use tally_core::face::{FaceEvent, FaceParts, LoopOutcome, TallyFace, dispatch};

use crate::events::FaceReceiver;
use crate::hw::lis2dw::Lis2dw;
use crate::hw::rtc::{RtcBackup, RtcCalendar};
use crate::status::{self, LatchedLevels};
use crate::telemetry::{JournalMirror, log_frame, log_heartbeat, log_lifecycle};

type WatchFace = TallyFace<RtcBackup, LatchedLevels, Lis2dw<'static>, RtcCalendar>;
type WatchParts = FaceParts<RtcBackup, LatchedLevels, Lis2dw<'static>, RtcCalendar>;

#[embassy_executor::task]
pub async fn run(receiver: FaceReceiver<'static>, parts: WatchParts) -> ! {
    let mut slot: Option<WatchFace> = None;
    match TallyFace::setup(&mut slot, || parts) {
        Ok(()) => log_lifecycle(0, "setup"),
        Err(err) => defmt::error!("face: setup rejected, face inert: {}", defmt::Display2Format(&err)),
    }

    let mut mirror = JournalMirror::new();
    let mut ticker = activate(&mut slot);

    loop {
        if !status::focused() {
            // Another face owns the display; MODE cycles back to this one.
            if receiver.receive().await == FaceEvent::ModeUp {
                ticker = activate(&mut slot);
            }
            continue;
        }

        let event = match select(ticker.next(), receiver.receive()).await {
            Either::First(()) => {
                let ticks = status::record_tick();
                log_heartbeat(clock_ms(slot.as_ref()), ticks, status::dropped_edges());
                FaceEvent::Tick { subsecond: 0 }
            }
            Either::Second(edge) => edge,
        };

        let outcome = dispatch(&mut slot, event);
        report(slot.as_ref(), &mut mirror, &outcome);

        if !outcome.keep_active {
            let _ = dispatch(&mut slot, FaceEvent::Resign);
            status::record_focus(false);
            log_lifecycle(clock_ms(slot.as_ref()), "released focus");
        }
    }
}

/// Gives the face focus and returns a ticker at the rate it asked for.
fn activate(slot: &mut Option<WatchFace>) -> Ticker {
    let hz = match slot.as_mut() {
        Some(face) => {
            status::record_focus(true);
            face.activate()
        }
        None => TICK_FREQUENCY_HZ,
    };
    log_lifecycle(clock_ms(slot.as_ref()), "activated");
    Ticker::every(Duration::from_hz(u64::from(hz)))
}

fn report(face: Option<&WatchFace>, mirror: &mut JournalMirror, outcome: &LoopOutcome) {
    let Some(face) = face else {
        return;
    };
    let _ = mirror.mirror(face.journal());
    if let Some(frame) = &outcome.frame {
        log_frame(face.state().clock_ms(), frame);
    }
}

fn clock_ms(face: Option<&WatchFace>) -> u32 {
    face.map_or(0, |face| face.state().clock_ms())
}
