//! Board wiring for the watch PCB.
//!
//! | Signal      | Pin  | Notes                                  |
//! |-------------|------|----------------------------------------|
//! | LIGHT       | PA0  | tally A, active high, pull-down, EXTI0 |
//! | ALARM       | PA1  | tally B, active high, pull-down, EXTI1 |
//! | MODE        | PA2  | goal editing / focus, EXTI2            |
//! | ACCEL SCL   | PB8  | I2C1                                   |
//! | ACCEL SDA   | PB9  | I2C1                                   |
//!
//! The backup register mapping is portable so it can be checked on the host.

use tally_core::persistence::BACKUP_LEN;

/// Settling time after a button edge before the level is trusted.
pub const BUTTON_DEBOUNCE_MS: u64 = 20;

/// I²C bus speed for the accelerometer.
pub const ACCEL_I2C_HZ: u32 = 400_000;

/// 7-bit address of the LIS2DW with SA0 tied high.
pub const LIS2DW_ADDRESS: u8 = 0x19;

/// LIS2DW register map, limited to what tap detection touches.
pub mod lis2dw {
    pub const WHO_AM_I: u8 = 0x0F;
    pub const WHO_AM_I_VALUE: u8 = 0x44;
    pub const CTRL1: u8 = 0x20;
    pub const CTRL3: u8 = 0x22;
    pub const TAP_THS_Z: u8 = 0x32;
    pub const INT_DUR: u8 = 0x33;
    pub const WAKE_UP_THS: u8 = 0x34;
    pub const TAP_SRC: u8 = 0x39;
    pub const CTRL7: u8 = 0x3F;

    /// 400 Hz, low-power mode 1.
    pub const CTRL1_TAP_ODR: u8 = 0x70;
    /// Latched interrupts so a tap survives until the next one-second read.
    pub const CTRL3_LATCHED: u8 = 0x10;
    /// Tap threshold on Z, with the 6D threshold left at default.
    pub const TAP_THRESHOLD_Z: u8 = 0x0C;
    /// Z-axis tap detection enable, stored in `TAP_THS_Z` bit 5.
    pub const TAP_Z_ENABLE: u8 = 0x20;
    /// Latency, quiet and shock windows for double-tap recognition.
    pub const INT_DUR_WINDOWS: u8 = 0x7F;
    /// Enables single and double tap events.
    pub const WAKE_UP_SINGLE_DOUBLE: u8 = 0x80;
    pub const CTRL7_INTERRUPTS_ENABLE: u8 = 0x20;
}

/// Number of 32-bit RTC backup registers needed to hold the region.
pub const BACKUP_REGISTERS: usize = BACKUP_LEN.div_ceil(4);

/// First RTC backup register owned by the face.
pub const BACKUP_FIRST_REGISTER: usize = 0;

/// Maps a byte offset of the backup region onto an RTC register and bit shift.
///
/// Bytes are packed little-endian, four per register.
#[must_use]
pub const fn backup_slot(index: usize) -> Option<(usize, u32)> {
    if index >= BACKUP_LEN {
        return None;
    }
    let register = BACKUP_FIRST_REGISTER + index / 4;
    #[allow(clippy::cast_possible_truncation)]
    let shift = ((index % 4) * 8) as u32;
    Some((register, shift))
}

/// Replaces one byte inside a packed register value.
#[must_use]
#[allow(clippy::cast_lossless)]
pub const fn splice_byte(register: u32, shift: u32, value: u8) -> u32 {
    (register & !(0xFF << shift)) | ((value as u32) << shift)
}

/// Extracts one byte from a packed register value.
#[must_use]
pub const fn extract_byte(register: u32, shift: u32) -> u8 {
    #[allow(clippy::cast_possible_truncation)]
    let byte = (register >> shift) as u8;
    byte
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_packs_into_two_registers() {
        assert_eq!(BACKUP_REGISTERS, 2);
        assert_eq!(backup_slot(0), Some((0, 0)));
        assert_eq!(backup_slot(3), Some((0, 24)));
        assert_eq!(backup_slot(4), Some((1, 0)));
        assert_eq!(backup_slot(7), Some((1, 24)));
        assert_eq!(backup_slot(BACKUP_LEN), None);
    }

    #[test]
    fn splice_only_touches_one_byte() {
        let packed = splice_byte(0xAABB_CCDD, 8, 0x11);
        assert_eq!(packed, 0xAABB_11DD);
        assert_eq!(extract_byte(packed, 8), 0x11);
        assert_eq!(extract_byte(packed, 24), 0xAA);
    }
}
