//! LIS2DW accelerometer configured for single and double tap detection.

use embassy_stm32::i2c::{Error as I2cError, I2c};
use embassy_stm32::mode::Blocking;
use tally_core::gesture::TapFlags;
use tally_core::hal::TapSource;

use crate::board::{LIS2DW_ADDRESS, lis2dw};

pub struct Lis2dw<'d> {
    i2c: I2c<'d, Blocking>,
    ready: bool,
}

impl<'d> Lis2dw<'d> {
    pub fn new(i2c: I2c<'d, Blocking>) -> Self {
        Self { i2c, ready: false }
    }

    /// Programs tap detection with latched interrupts.
    ///
    /// Until this succeeds the sensor reports no taps.
    pub fn configure(&mut self) -> Result<(), I2cError> {
        let id = self.read_register(lis2dw::WHO_AM_I)?;
        if id != lis2dw::WHO_AM_I_VALUE {
            defmt::warn!("lis2dw: unexpected WHO_AM_I {=u8:#x}", id);
        }

        for (register, value) in [
            (lis2dw::CTRL1, lis2dw::CTRL1_TAP_ODR),
            (lis2dw::CTRL3, lis2dw::CTRL3_LATCHED),
            (
                lis2dw::TAP_THS_Z,
                lis2dw::TAP_Z_ENABLE | lis2dw::TAP_THRESHOLD_Z,
            ),
            (lis2dw::INT_DUR, lis2dw::INT_DUR_WINDOWS),
            (lis2dw::WAKE_UP_THS, lis2dw::WAKE_UP_SINGLE_DOUBLE),
            (lis2dw::CTRL7, lis2dw::CTRL7_INTERRUPTS_ENABLE),
        ] {
            self.write_register(register, value)?;
        }

        self.ready = true;
        defmt::info!("lis2dw: tap detection armed");
        Ok(())
    }

    fn read_register(&mut self, register: u8) -> Result<u8, I2cError> {
        let mut value = [0u8; 1];
        self.i2c
            .blocking_write_read(LIS2DW_ADDRESS, &[register], &mut value)?;
        Ok(value[0])
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), I2cError> {
        self.i2c.blocking_write(LIS2DW_ADDRESS, &[register, value])
    }
}

impl TapSource for Lis2dw<'_> {
    fn interrupt_source(&mut self) -> TapFlags {
        if !self.ready {
            return TapFlags::NONE;
        }
        // Reading TAP_SRC clears the latch.
        match self.read_register(lis2dw::TAP_SRC) {
            Ok(bits) => TapFlags::from_bits(bits),
            Err(err) => {
                defmt::warn!("lis2dw: TAP_SRC read failed: {}", defmt::Debug2Format(&err));
                TapFlags::NONE
            }
        }
    }
}
