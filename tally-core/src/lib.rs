#![no_std]

// Shared logic for the tally watch face.
//
// This crate stays portable across MCU firmware and host tooling by avoiding the
// Rust standard library. Hardware access is expressed through the traits in
// `hal` and `persistence`, so the state machine can be replayed in tests with
// plain in-memory doubles.

pub mod config;
pub mod deficit;
pub mod face;
pub mod gesture;
pub mod hal;
pub mod journal;
pub mod persistence;
pub mod render;
pub mod tracker;
