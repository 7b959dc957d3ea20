//! Embassy async tasks
//!
//! Each task runs independently and communicates via the statics in
//! `channels`.

pub mod controller;
pub mod display;
pub mod input;
pub mod radio;

pub use controller::controller_task;
pub use display::{display_task, publish};
pub use input::{input_task, PanelButtons};
pub use radio::{net_task, radio_task};
