//! RTC calendar and backup registers.
//!
//! Both adapters borrow one RTC instance through a blocking mutex so the
//! calendar read and the backup writes never race.

use core::cell::{Cell, RefCell};

use embassy_stm32::rtc::Rtc;
use embassy_sync::blocking_mutex::Mutex;
use tally_core::deficit::CalendarDate;
use tally_core::hal::Calendar;
use tally_core::persistence::BackupStore;

use crate::board::{backup_slot, extract_byte, splice_byte};
use crate::events::FaceMutex;

pub type SharedRtc = Mutex<FaceMutex, RefCell<Rtc>>;

/// Local date from the RTC calendar registers.
pub struct RtcCalendar {
    rtc: &'static SharedRtc,
    warned: Cell<bool>,
}

impl RtcCalendar {
    pub const fn new(rtc: &'static SharedRtc) -> Self {
        Self {
            rtc,
            warned: Cell::new(false),
        }
    }
}

impl Calendar for RtcCalendar {
    fn local_date(&self) -> Option<CalendarDate> {
        let now = self.rtc.lock(|rtc| rtc.borrow().now());
        match now {
            Ok(now) => CalendarDate::new(now.year(), now.month(), now.day()),
            Err(err) => {
                if !self.warned.replace(true) {
                    defmt::warn!(
                        "rtc: calendar unavailable ({}), deficits read as zero",
                        defmt::Debug2Format(&err)
                    );
                }
                None
            }
        }
    }
}

/// The 8-byte backup region packed into RTC backup registers.
///
/// Backup registers sit in the always-on domain, so values survive resets
/// for as long as the battery does.
pub struct RtcBackup {
    rtc: &'static SharedRtc,
}

impl RtcBackup {
    pub const fn new(rtc: &'static SharedRtc) -> Self {
        Self { rtc }
    }
}

impl BackupStore for RtcBackup {
    fn read_byte(&self, index: usize) -> u8 {
        let Some((register, shift)) = backup_slot(index) else {
            return 0;
        };
        self.rtc
            .lock(|rtc| rtc.borrow().read_backup_register(register))
            .map_or(0, |packed| extract_byte(packed, shift))
    }

    fn write_byte(&mut self, index: usize, value: u8) {
        let Some((register, shift)) = backup_slot(index) else {
            return;
        };
        self.rtc.lock(|rtc| {
            let rtc = rtc.borrow();
            let packed = rtc.read_backup_register(register).unwrap_or(0);
            rtc.write_backup_register(register, splice_byte(packed, shift, value));
        });
    }
}
