//! Cooperative scheduling helpers
//!
//! Everything runs on one thread-mode executor. A fetch suspends only at
//! chunk reads (made explicit yield points by [`YieldingSource`]) and the
//! controller suspends only in timed sleeps while idling. The input-poll
//! task runs in those gaps and leaves at most one pending action in the
//! shared [`InputGate`].

pub mod cadence;
pub mod cooperative;
pub mod input;

pub use cadence::Cadence;
pub use cooperative::YieldingSource;
pub use input::{InputGate, InputPoller, PollSuspension};

use embedded_hal_async::delay::DelayNs;

use crate::traits::{Button, Clock};

/// Why the idle phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Wake {
    /// The next fetch cycle is due
    Due,
    /// The user pressed a button
    Input(Button),
}

/// Sleep in short steps until the cadence is due or an action is pending
///
/// A pending action recorded during the previous fetch is returned
/// immediately.
pub async fn idle_until_due<C, D>(
    gate: &InputGate,
    cadence: &Cadence,
    clock: &C,
    delay: &mut D,
    step_ms: u32,
) -> Wake
where
    C: Clock,
    D: DelayNs,
{
    loop {
        if let Some(button) = gate.take_pending() {
            return Wake::Input(button);
        }
        let now = clock.now_ms();
        if cadence.is_due(now) {
            return Wake::Due;
        }
        let wait = cadence.remaining_ms(now).min(u64::from(step_ms.max(1)));
        delay.delay_ms(wait as u32).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_latest;
    use crate::records::LapRecord;
    use crate::testing::{EventLog, ScriptedButtons, ScriptedSource, TestClock, TestDelay};
    use crate::traits::ButtonSet;
    use embassy_futures::{block_on, join::join, yield_now};
    use std::cell::Cell;

    const LAPS: &[u8] = br#"[{"driver_number":44,"lap_duration":90.001,"lap_number":11},{"driver_number":44,"lap_duration":91.154,"lap_number":12}]"#;

    #[test]
    fn test_poll_runs_between_reads() {
        let events = EventLog::default();
        let gate = InputGate::new();
        let done = Cell::new(false);

        let mut source = YieldingSource::new(ScriptedSource::split(LAPS, 16).with_events(events.clone()));
        let mut poller = InputPoller::new(ScriptedButtons::new(&[
            ButtonSet::empty(),
            ButtonSet::empty(),
            ButtonSet::empty().with(Button::A),
        ]));

        let fetch = async {
            let lap = extract_latest::<LapRecord, _, 256>(&mut source).await;
            done.set(true);
            lap
        };
        let poll = async {
            while !done.get() {
                poller.poll_once(&gate);
                events.borrow_mut().push("poll");
                yield_now().await;
            }
        };

        let (lap, ()) = block_on(join(fetch, poll));
        assert_eq!(lap.unwrap().unwrap().lap_number.value(), Some(12));

        let events = events.borrow();
        let reads = events.iter().filter(|e| **e == "read").count();
        assert!(reads > 2);
        assert!(events.windows(2).all(|w| w != ["read", "read"]));

        // The press recorded mid-fetch is still waiting for dispatch
        assert_eq!(gate.peek(), Some(Button::A));
    }

    #[test]
    fn test_pending_action_preempts_idle() {
        let gate = InputGate::new();
        gate.record(Button::X);
        let clock = TestClock::at(1_000);
        let mut delay = TestDelay::new(clock.clone());
        let cadence = Cadence::new(5_000, 6_000);

        let wake = block_on(idle_until_due(&gate, &cadence, &clock, &mut delay, 20));
        assert_eq!(wake, Wake::Input(Button::X));
        assert_eq!(clock.now_ms(), 1_000);
        assert_eq!(gate.peek(), None);
    }

    #[test]
    fn test_idle_sleeps_until_due() {
        let gate = InputGate::new();
        let clock = TestClock::at(1_000);
        let mut delay = TestDelay::new(clock.clone());
        let cadence = Cadence::new(5_000, 1_050);

        let wake = block_on(idle_until_due(&gate, &cadence, &clock, &mut delay, 20));
        assert_eq!(wake, Wake::Due);
        assert_eq!(clock.now_ms(), 1_050);
    }

    #[test]
    fn test_press_during_idle() {
        let events = EventLog::default();
        let gate = InputGate::new();
        let clock = TestClock::at(0);
        let mut delay = TestDelay::new(clock.clone());
        delay.events = Some(events.clone());
        let cadence = Cadence::new(5_000, 5_000);
        let mut poller = InputPoller::new(ScriptedButtons::new(&[
            ButtonSet::empty(),
            ButtonSet::empty().with(Button::Y),
        ]));
        let stop = Cell::new(false);

        let idle = async {
            let wake = idle_until_due(&gate, &cadence, &clock, &mut delay, 20).await;
            stop.set(true);
            wake
        };
        let poll = async {
            while !stop.get() {
                poller.poll_once(&gate);
                yield_now().await;
            }
        };

        let (wake, ()) = block_on(join(idle, poll));
        assert_eq!(wake, Wake::Input(Button::Y));
        assert!(clock.now_ms() < 5_000);
        assert!(events.borrow().contains(&"sleep"));
    }
}
