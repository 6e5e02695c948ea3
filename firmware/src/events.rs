//! Button edges travelling from the GPIO tasks to the face task.

#[cfg(not(target_os = "none"))]
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
#[cfg(target_os = "none")]
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender, TrySendError};
use tally_core::face::FaceEvent;
use tally_core::hal::HoldButton;

use crate::status;

/// Depth of the edge queue. A human cannot outrun this at one event per press.
pub const FACE_QUEUE_DEPTH: usize = 8;

#[cfg(target_os = "none")]
pub type FaceMutex = ThreadModeRawMutex;
#[cfg(not(target_os = "none"))]
pub type FaceMutex = NoopRawMutex;

/// Queue feeding button-up edges to the face task.
pub type FaceQueue = Channel<FaceMutex, FaceEvent, FACE_QUEUE_DEPTH>;

pub type FaceSender<'a> = Sender<'a, FaceMutex, FaceEvent, FACE_QUEUE_DEPTH>;

pub type FaceReceiver<'a> = Receiver<'a, FaceMutex, FaceEvent, FACE_QUEUE_DEPTH>;

/// Physical buttons on the case.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ButtonLine {
    Light,
    Alarm,
    Mode,
}

impl ButtonLine {
    /// Hold-tracked role of the button, if it has one.
    #[must_use]
    pub const fn hold_button(self) -> Option<HoldButton> {
        match self {
            ButtonLine::Light => Some(HoldButton::Primary),
            ButtonLine::Alarm => Some(HoldButton::Secondary),
            ButtonLine::Mode => None,
        }
    }

    /// Event delivered to the face when the button is released.
    #[must_use]
    pub const fn up_event(self) -> FaceEvent {
        match self {
            ButtonLine::Light => FaceEvent::PrimaryUp,
            ButtonLine::Alarm => FaceEvent::SecondaryUp,
            ButtonLine::Mode => FaceEvent::ModeUp,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ButtonLine::Light => "LIGHT",
            ButtonLine::Alarm => "ALARM",
            ButtonLine::Mode => "MODE",
        }
    }
}

/// Records a level change and, on release, queues the matching face event.
///
/// Returns `false` when the queue was full and the edge had to be dropped.
#[must_use]
pub fn button_level_changed(sender: &FaceSender<'_>, line: ButtonLine, pressed: bool) -> bool {
    if let Some(button) = line.hold_button() {
        status::record_button_level(button, pressed);
    }
    if pressed {
        return true;
    }

    match sender.try_send(line.up_event()) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            status::record_dropped_edge();
            false
        }
    }
}
