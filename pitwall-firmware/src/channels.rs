//! Inter-task communication
//!
//! The input gate is the only state the controller shares with the
//! input-poll task. Screen updates go to the display task through a
//! signal.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use pitwall_core::scheduler::InputGate;

/// Pending button action and the poll-enable flag
pub static INPUT_GATE: InputGate = InputGate::new();

/// Signal that a new screen is ready to be drawn
pub static SCREEN_UPDATE: Signal<CriticalSectionRawMutex, ()> = Signal::new();
