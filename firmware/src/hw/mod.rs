//! Peripheral adapters implementing the `tally_core::hal` traits.
//!
//! Only built for the watch; the host build exercises the face against the
//! in-memory doubles from `tally_core` instead.

pub mod lis2dw;
pub mod rtc;
