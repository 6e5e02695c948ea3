//! Persistence of tallies and goals in the 8-byte backup region.
//!
//! The watch keeps a handful of battery-backed bytes alive across resets.
//! Each value is stored as a little-endian 16-bit pair:
//!
//! | bytes | value | note |
//! |---|---|---|
//! | 0–1 | tally A | |
//! | 2–3 | tally B | high byte always zero |
//! | 4–5 | goal A | |
//! | 6–7 | goal B | high byte always zero |
//!
//! Fresh or corrupted storage is handled on load: out-of-range goals fall back
//! to their defaults and tallies are clamped to their maxima.

use crate::config::{Counter, LIMITS_A, LIMITS_B};

/// Size of the backup region in bytes.
pub const BACKUP_LEN: usize = 8;
/// Offset of the tally A pair.
pub const TALLY_A_OFFSET: usize = 0;
/// Offset of the tally B pair.
pub const TALLY_B_OFFSET: usize = 2;
/// Offset of the goal A pair.
pub const GOAL_A_OFFSET: usize = 4;
/// Offset of the goal B pair.
pub const GOAL_B_OFFSET: usize = 6;

/// Byte-addressable durable storage.
///
/// Writes are expected to be durable when the call returns.
pub trait BackupStore {
    /// Reads the byte at `index` (`0..BACKUP_LEN`).
    fn read_byte(&self, index: usize) -> u8;

    /// Writes the byte at `index` (`0..BACKUP_LEN`).
    fn write_byte(&mut self, index: usize, value: u8);
}

impl<T: BackupStore + ?Sized> BackupStore for &mut T {
    fn read_byte(&self, index: usize) -> u8 {
        (**self).read_byte(index)
    }

    fn write_byte(&mut self, index: usize, value: u8) {
        (**self).write_byte(index, value);
    }
}

/// Backup region held in RAM.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryBackup {
    bytes: [u8; BACKUP_LEN],
}

impl MemoryBackup {
    /// Creates an all-zero region, matching a watch that has never run the face.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; BACKUP_LEN],
        }
    }

    /// Restores a region from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; BACKUP_LEN]) -> Self {
        Self { bytes }
    }

    /// Returns the raw contents.
    #[must_use]
    pub const fn bytes(&self) -> [u8; BACKUP_LEN] {
        self.bytes
    }
}

impl BackupStore for MemoryBackup {
    fn read_byte(&self, index: usize) -> u8 {
        self.bytes.get(index).copied().unwrap_or(0)
    }

    fn write_byte(&mut self, index: usize, value: u8) {
        if let Some(slot) = self.bytes.get_mut(index) {
            *slot = value;
        }
    }
}

/// Values recovered from the backup region.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StoredTallies {
    pub tally_a: u16,
    pub tally_b: u16,
    pub goal_a: u16,
    pub goal_b: u16,
}

impl StoredTallies {
    /// Values used on a watch with empty storage.
    #[must_use]
    pub const fn defaults() -> Self {
        Self {
            tally_a: 0,
            tally_b: 0,
            goal_a: LIMITS_A.default_goal,
            goal_b: LIMITS_B.default_goal,
        }
    }
}

impl Default for StoredTallies {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Reads and writes tallies and goals through a [`BackupStore`].
#[derive(Clone, Debug)]
pub struct TallyStore<S> {
    backup: S,
}

impl<S: BackupStore> TallyStore<S> {
    /// Wraps a backup region.
    pub const fn new(backup: S) -> Self {
        Self { backup }
    }

    /// Loads all four values, repairing out-of-range data.
    pub fn load(&self) -> StoredTallies {
        StoredTallies {
            tally_a: LIMITS_A.clamp_tally(self.read_u16(TALLY_A_OFFSET)),
            tally_b: LIMITS_B.clamp_tally(self.read_u16(TALLY_B_OFFSET)),
            goal_a: LIMITS_A.goal_or_default(self.read_u16(GOAL_A_OFFSET)),
            goal_b: LIMITS_B.goal_or_default(self.read_u16(GOAL_B_OFFSET)),
        }
    }

    pub fn store_tally_a(&mut self, value: u16) {
        self.write_u16(TALLY_A_OFFSET, LIMITS_A.clamp_tally(value));
    }

    pub fn store_tally_b(&mut self, value: u16) {
        self.write_u16(TALLY_B_OFFSET, LIMITS_B.clamp_tally(value));
    }

    pub fn store_goal_a(&mut self, value: u16) {
        self.write_u16(GOAL_A_OFFSET, LIMITS_A.clamp_goal(value));
    }

    pub fn store_goal_b(&mut self, value: u16) {
        self.write_u16(GOAL_B_OFFSET, LIMITS_B.clamp_goal(value));
    }

    /// Stores the tally for `counter`.
    pub fn store_tally(&mut self, counter: Counter, value: u16) {
        match counter {
            Counter::A => self.store_tally_a(value),
            Counter::B => self.store_tally_b(value),
        }
    }

    /// Stores the goal for `counter`.
    pub fn store_goal(&mut self, counter: Counter, value: u16) {
        match counter {
            Counter::A => self.store_goal_a(value),
            Counter::B => self.store_goal_b(value),
        }
    }

    /// Returns the wrapped backup region.
    pub fn backup(&self) -> &S {
        &self.backup
    }

    /// Consumes the adapter and returns the backup region.
    pub fn into_inner(self) -> S {
        self.backup
    }

    fn read_u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes([
            self.backup.read_byte(offset),
            self.backup.read_byte(offset + 1),
        ])
    }

    fn write_u16(&mut self, offset: usize, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.backup.write_byte(offset, lo);
        self.backup.write_byte(offset + 1, hi);
    }
}
