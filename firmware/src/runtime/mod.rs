use core::cell::RefCell;

use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::Pull;
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::rcc::LsConfig;
use embassy_stm32::rtc::{Rtc, RtcConfig};
use embassy_stm32::time::Hertz;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use static_cell::StaticCell;
use tally_core::face::{FaceParts, FaceSettings};

use crate::board::ACCEL_I2C_HZ;
use crate::events::{ButtonLine, FaceQueue};
use crate::hw::lis2dw::Lis2dw;
use crate::hw::rtc::{RtcBackup, RtcCalendar, SharedRtc};
use crate::status::LatchedLevels;

mod button_task;
mod face_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

pub(super) static FACE_QUEUE: FaceQueue = Channel::new();
static RTC: StaticCell<SharedRtc> = StaticCell::new();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let mut config = hal::Config::default();
    config.rcc.ls = LsConfig::default_lse();
    let hal::Peripherals {
        PA0,
        PA1,
        PA2,
        PB8,
        PB9,
        EXTI0,
        EXTI1,
        EXTI2,
        I2C1,
        RTC: rtc_peripheral,
        ..
    } = hal::init(config);

    let rtc: &'static SharedRtc = RTC.init(Mutex::new(RefCell::new(Rtc::new(
        rtc_peripheral,
        RtcConfig::default(),
    ))));

    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = Hertz(ACCEL_I2C_HZ);
    let mut accel = Lis2dw::new(I2c::new_blocking(I2C1, PB8, PB9, i2c_config));
    if let Err(err) = accel.configure() {
        defmt::warn!(
            "lis2dw: configuration failed, taps disabled: {}",
            defmt::Debug2Format(&err)
        );
    }

    let parts = FaceParts {
        settings: FaceSettings { clock_24h: true },
        ..FaceParts::new(
            RtcBackup::new(rtc),
            LatchedLevels,
            accel,
            RtcCalendar::new(rtc),
        )
    };

    spawner
        .spawn(face_task::run(FACE_QUEUE.receiver(), parts))
        .expect("failed to spawn face task");

    let buttons = [
        (ButtonLine::Light, ExtiInput::new(PA0, EXTI0, Pull::Down)),
        (ButtonLine::Alarm, ExtiInput::new(PA1, EXTI1, Pull::Down)),
        (ButtonLine::Mode, ExtiInput::new(PA2, EXTI2, Pull::Down)),
    ];
    for (line, input) in buttons {
        spawner
            .spawn(button_task::run(line, input, FACE_QUEUE.sender()))
            .expect("failed to spawn button task");
    }

    core::future::pending::<()>().await;
}
