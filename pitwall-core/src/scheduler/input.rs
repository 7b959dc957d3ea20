//! Input gate and button poller
//!
//! The gate is the only state shared between the input-poll task and the
//! fetch/controller task: a single pending-action slot and a flag that
//! enables or suspends action recording. Both are plain atomics so the
//! gate can live in a `static` and be shared by `&'static` reference.

use embedded_hal_async::delay::DelayNs;
use portable_atomic::{AtomicBool, AtomicU8, Ordering};

use crate::traits::{Button, ButtonSet, Buttons};

const NO_ACTION: u8 = 0;

/// Pending-action slot plus poll-enable flag
pub struct InputGate {
    pending: AtomicU8,
    poll_enabled: AtomicBool,
}

impl Default for InputGate {
    fn default() -> Self {
        Self::new()
    }
}

impl InputGate {
    /// Create a gate with polling enabled and nothing pending
    pub const fn new() -> Self {
        Self {
            pending: AtomicU8::new(NO_ACTION),
            poll_enabled: AtomicBool::new(true),
        }
    }

    /// Record a pressed button
    ///
    /// Only the first press is kept until it is taken; returns false if
    /// another action was already pending.
    pub fn record(&self, button: Button) -> bool {
        self.pending
            .compare_exchange(NO_ACTION, button.to_byte(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Take the pending action, leaving the slot empty
    pub fn take_pending(&self) -> Option<Button> {
        Button::from_byte(self.pending.swap(NO_ACTION, Ordering::AcqRel))
    }

    /// Look at the pending action without consuming it
    pub fn peek(&self) -> Option<Button> {
        Button::from_byte(self.pending.load(Ordering::Acquire))
    }

    /// Drop any pending action
    pub fn clear(&self) {
        self.pending.store(NO_ACTION, Ordering::Release);
    }

    /// Check whether the poll task may record actions
    pub fn poll_enabled(&self) -> bool {
        self.poll_enabled.load(Ordering::Acquire)
    }

    /// Suspend action recording until the returned guard is dropped
    pub fn suspend_polling(&self) -> PollSuspension<'_> {
        let previous = self.poll_enabled.swap(false, Ordering::AcqRel);
        PollSuspension {
            gate: self,
            previous,
        }
    }
}

/// Keeps the poll task from recording actions while alive
///
/// Restores the previous enable state on drop, so nested suspensions
/// unwind correctly.
#[must_use = "polling resumes as soon as the guard is dropped"]
pub struct PollSuspension<'a> {
    gate: &'a InputGate,
    previous: bool,
}

impl Drop for PollSuspension<'_> {
    fn drop(&mut self) {
        self.gate.poll_enabled.store(self.previous, Ordering::Release);
    }
}

/// Edge detector over a [`Buttons`] source
pub struct InputPoller<B: Buttons> {
    buttons: B,
    previous: ButtonSet,
}

impl<B: Buttons> InputPoller<B> {
    pub fn new(buttons: B) -> Self {
        Self {
            buttons,
            previous: ButtonSet::empty(),
        }
    }

    /// Start from the current button levels
    ///
    /// Buttons already held do not count as presses.
    pub fn primed(mut buttons: B) -> Self {
        let previous = buttons.sample();
        Self { buttons, previous }
    }

    /// Sample once and record a new press in `gate`
    ///
    /// Levels are always tracked. While polling is suspended no action
    /// is recorded, so a button held across the suspension does not
    /// produce an edge afterwards.
    pub fn poll_once(&mut self, gate: &InputGate) -> Option<Button> {
        let now = self.buttons.sample();
        let pressed = now.pressed_since(self.previous);
        self.previous = now;

        if !gate.poll_enabled() {
            return None;
        }
        let button = pressed.first()?;
        gate.record(button).then_some(button)
    }

    /// Poll forever at a fixed period
    pub async fn run<D: DelayNs>(&mut self, gate: &InputGate, delay: &mut D, period_ms: u32) -> ! {
        loop {
            self.poll_once(gate);
            delay.delay_ms(period_ms).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedButtons;

    fn set(buttons: &[Button]) -> ButtonSet {
        buttons.iter().fold(ButtonSet::empty(), |s, b| s.with(*b))
    }

    #[test]
    fn test_first_press_wins() {
        let gate = InputGate::new();
        assert!(gate.record(Button::X));
        assert!(!gate.record(Button::Y));
        assert_eq!(gate.peek(), Some(Button::X));
        assert_eq!(gate.take_pending(), Some(Button::X));
        assert_eq!(gate.take_pending(), None);
    }

    #[test]
    fn test_suspension_guard_restores() {
        let gate = InputGate::new();
        {
            let _outer = gate.suspend_polling();
            assert!(!gate.poll_enabled());
            {
                let _inner = gate.suspend_polling();
                assert!(!gate.poll_enabled());
            }
            assert!(!gate.poll_enabled());
        }
        assert!(gate.poll_enabled());
    }

    #[test]
    fn test_edges_only() {
        let gate = InputGate::new();
        let mut poller = InputPoller::new(ScriptedButtons::new(&[
            set(&[Button::A]),
            set(&[Button::A]),
            set(&[]),
            set(&[Button::B]),
        ]));

        assert_eq!(poller.poll_once(&gate), Some(Button::A));
        assert_eq!(gate.take_pending(), Some(Button::A));
        assert_eq!(poller.poll_once(&gate), None); // still held
        assert_eq!(poller.poll_once(&gate), None); // released
        assert_eq!(poller.poll_once(&gate), Some(Button::B));
    }

    #[test]
    fn test_held_button_ignored_after_suspension() {
        let gate = InputGate::new();
        let mut poller = InputPoller::new(ScriptedButtons::new(&[
            set(&[]),
            set(&[Button::B]),
            set(&[Button::B]),
        ]));
        poller.poll_once(&gate);
        {
            let _guard = gate.suspend_polling();
            assert_eq!(poller.poll_once(&gate), None);
        }
        assert_eq!(poller.poll_once(&gate), None);
        assert_eq!(gate.peek(), None);
    }

    #[test]
    fn test_primed_ignores_held() {
        let gate = InputGate::new();
        let mut poller = InputPoller::primed(ScriptedButtons::new(&[
            set(&[Button::A]),
            set(&[Button::A]),
            set(&[Button::A, Button::Y]),
        ]));
        assert_eq!(poller.poll_once(&gate), None);
        assert_eq!(poller.poll_once(&gate), Some(Button::Y));
    }
}
