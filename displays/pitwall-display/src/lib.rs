//! Text screens for the Pitwall live timing client
//!
//! This crate provides:
//! - `Screen`, a character buffer with a pen per row and a selected row
//! - `DisplayBackend` for whatever actually draws the text
//! - Lap row formatting (driver codes, durations, gaps, lap counters)
//! - `Renderer` building the boot, message, lap table and picker screens
//! - `Picker`, the button-driven list selection
//!
//! Nothing here touches pixels; the firmware supplies a backend.

#![no_std]

pub mod backend;
pub mod format;
pub mod picker;
pub mod renderer;
pub mod screen;

#[cfg(test)]
extern crate std;

// Re-export key types
pub use backend::{present, DisplayBackend, DisplayError};
pub use picker::{Picker, PickerEvent};
pub use renderer::{lap_row, Renderer, PICKER_ROWS};
pub use screen::{Screen, Tone, SCREEN_COLS, SCREEN_ROWS};
