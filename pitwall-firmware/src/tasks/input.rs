//! Input-poll task
//!
//! Samples the four display-pack buttons at a fixed period and leaves at
//! most one pending action in the shared gate. The task keeps tracking
//! button levels while a sub-screen has polling suspended.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Delay;

use pitwall_core::scheduler::InputPoller;
use pitwall_core::traits::{Button, ButtonSet, Buttons};

use crate::channels::INPUT_GATE;

/// The A, B, X and Y buttons, active low
pub struct PanelButtons {
    pins: [Input<'static>; 4],
}

impl PanelButtons {
    pub fn new(a: Input<'static>, b: Input<'static>, x: Input<'static>, y: Input<'static>) -> Self {
        Self { pins: [a, b, x, y] }
    }

    fn sample_levels(&self) -> ButtonSet {
        self.pins
            .iter()
            .zip(Button::ALL)
            .filter(|(pin, _)| pin.is_low())
            .fold(ButtonSet::empty(), |set, (_, button)| set.with(button))
    }
}

/// Shared reference so sub-screens can read the panel directly
impl Buttons for &PanelButtons {
    fn sample(&mut self) -> ButtonSet {
        self.sample_levels()
    }
}

/// Input-poll task - records button presses into [`INPUT_GATE`]
#[embassy_executor::task]
pub async fn input_task(buttons: &'static PanelButtons, period_ms: u32) {
    info!("Input task started, polling every {} ms", period_ms);

    let mut poller = InputPoller::new(buttons);
    poller.run(&INPUT_GATE, &mut Delay, period_ms).await
}
