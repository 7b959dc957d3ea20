//! Fetch orchestration
//!
//! One cycle fetches the latest lap of every tracked driver, strictly one
//! after another, and folds each [`FetchOutcome`] into the [`LapBoard`].
//! Cycles start on a fixed [`Cadence`]; a failed fetch is simply retried
//! on the next cycle.

pub mod board;
pub mod outcome;
pub mod targets;

pub use board::{FailurePolicy, LapBoard, TargetState};
pub use outcome::{FetchOutcome, Status};
pub use targets::{TrackedTargets, MAX_TRACKED};

use crate::error::FetchError;
use crate::records::{DriverNumber, LapRecord};
use crate::scheduler::Cadence;
use crate::traits::Clock;

/// Anything that can fetch the latest lap of a driver
#[allow(async_fn_in_trait)]
pub trait LapSource {
    async fn latest_lap(&mut self, driver: DriverNumber) -> FetchOutcome<LapRecord>;
}

/// Tally of one fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Fetches that produced a lap
    pub fetched: u8,
    /// Fetches that found no qualifying lap
    pub no_data: u8,
    /// Fetches that failed
    pub failed: u8,
    /// Drivers whose display state changed
    pub changed: u8,
    /// Most recent failure of the cycle
    pub last_error: Option<FetchError>,
}

/// Tracked drivers, their cached state and the cycle schedule
pub struct Orchestrator<const N: usize = MAX_TRACKED> {
    targets: TrackedTargets<N>,
    board: LapBoard<N>,
    cadence: Cadence,
}

impl<const N: usize> Orchestrator<N> {
    pub fn new(targets: TrackedTargets<N>, policy: FailurePolicy, cadence: Cadence) -> Self {
        let mut board = LapBoard::new(policy);
        board.reconcile(&targets);
        Self {
            targets,
            board,
            cadence,
        }
    }

    pub fn targets(&self) -> &TrackedTargets<N> {
        &self.targets
    }

    pub fn board(&self) -> &LapBoard<N> {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut LapBoard<N> {
        &mut self.board
    }

    pub fn cadence(&self) -> &Cadence {
        &self.cadence
    }

    pub fn cadence_mut(&mut self) -> &mut Cadence {
        &mut self.cadence
    }

    /// Replace the whole tracked list
    ///
    /// Must not be called while a cycle is running; the board is
    /// reconciled immediately.
    pub fn set_targets(&mut self, targets: TrackedTargets<N>) {
        self.targets = targets;
        self.board.reconcile(&self.targets);
    }

    /// Replace one tracked driver (see [`TrackedTargets::replace`])
    pub fn replace_target(&mut self, slot: usize, driver: DriverNumber) -> bool {
        if !self.targets.replace(slot, driver) {
            return false;
        }
        self.board.reconcile(&self.targets);
        true
    }

    /// Run one cycle over the tracked drivers
    ///
    /// The tracked list is read once at the start; the next cycle is due
    /// one interval after this one started, or immediately if this one
    /// overran.
    pub async fn run_cycle<S, C>(&mut self, source: &mut S, clock: &C) -> CycleReport
    where
        S: LapSource,
        C: Clock,
    {
        self.cadence.begin(clock.now_ms());

        let mut report = CycleReport::default();
        let targets = self.targets.clone();
        for driver in targets.iter() {
            let outcome = source.latest_lap(driver).await;
            match &outcome {
                FetchOutcome::Value(_) => report.fetched += 1,
                FetchOutcome::NoData => report.no_data += 1,
                FetchOutcome::Error(e) => {
                    report.failed += 1;
                    report.last_error = Some(*e);
                }
            }
            if self.board.apply(driver, outcome) {
                report.changed += 1;
            }
        }

        self.cadence.complete(clock.now_ms());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;
    use crate::records::{LapNumber, LapTime};
    use crate::testing::TestClock;
    use embassy_futures::block_on;
    use std::collections::VecDeque;
    use std::vec::Vec;

    fn lap(driver: DriverNumber, ms: u32) -> LapRecord {
        LapRecord {
            driver_number: Some(driver),
            lap_duration: LapTime::from_millis(ms),
            lap_number: LapNumber::Null,
        }
    }

    /// Replays outcomes in order, advancing the clock per fetch
    struct ScriptedLaps {
        outcomes: VecDeque<FetchOutcome<LapRecord>>,
        clock: TestClock,
        cost_ms: u64,
        asked: Vec<DriverNumber>,
    }

    impl ScriptedLaps {
        fn new(clock: &TestClock, cost_ms: u64, outcomes: &[FetchOutcome<LapRecord>]) -> Self {
            Self {
                outcomes: outcomes.iter().cloned().collect(),
                clock: clock.clone(),
                cost_ms,
                asked: Vec::new(),
            }
        }
    }

    impl LapSource for ScriptedLaps {
        async fn latest_lap(&mut self, driver: DriverNumber) -> FetchOutcome<LapRecord> {
            self.asked.push(driver);
            self.clock.advance(self.cost_ms);
            self.outcomes.pop_front().unwrap_or(FetchOutcome::NoData)
        }
    }

    fn orchestrator(drivers: &[DriverNumber], first_due: u64) -> Orchestrator<4> {
        Orchestrator::new(
            TrackedTargets::new(drivers),
            FailurePolicy::Placeholder,
            Cadence::new(5_000, first_due),
        )
    }

    #[test]
    fn test_timeout_keeps_cadence() {
        let clock = TestClock::at(1_500);
        let mut orch = orchestrator(&[44], 1_500);
        let mut source = ScriptedLaps::new(
            &clock,
            3_000,
            &[FetchOutcome::Error(NetworkError::Timeout.into())],
        );

        let report = block_on(orch.run_cycle(&mut source, &clock));
        assert_eq!(report.failed, 1);
        assert_eq!(report.last_error, Some(NetworkError::Timeout.into()));
        assert_eq!(
            orch.board().state(44),
            Some(TargetState::Placeholder(Status::FetchError))
        );
        assert_eq!(orch.cadence().next_due_ms(), 6_500);
        assert!(!orch.cadence().is_due(clock.now_ms()));
    }

    #[test]
    fn test_cycle_fetches_in_order() {
        let clock = TestClock::at(0);
        let mut orch = orchestrator(&[44, 81, 3], 0);
        let mut source = ScriptedLaps::new(
            &clock,
            100,
            &[
                FetchOutcome::Value(lap(44, 91_154)),
                FetchOutcome::NoData,
                FetchOutcome::Value(lap(3, 92_001)),
            ],
        );

        let report = block_on(orch.run_cycle(&mut source, &clock));
        assert_eq!(source.asked, [44, 81, 3]);
        assert_eq!(report.fetched, 2);
        assert_eq!(report.no_data, 1);
        assert_eq!(report.changed, 3);
        assert!(orch.board_mut().take_dirty());
    }

    #[test]
    fn test_unchanged_cycle_is_clean() {
        let clock = TestClock::at(0);
        let mut orch = orchestrator(&[44], 0);
        let mut source = ScriptedLaps::new(
            &clock,
            10,
            &[
                FetchOutcome::Value(lap(44, 91_154)),
                FetchOutcome::Value(lap(44, 91_154)),
            ],
        );

        block_on(orch.run_cycle(&mut source, &clock));
        orch.board_mut().take_dirty();

        clock.set(5_000);
        let report = block_on(orch.run_cycle(&mut source, &clock));
        assert_eq!(report.changed, 0);
        assert!(!orch.board().is_dirty());
    }

    #[test]
    fn test_overrun_makes_next_cycle_due() {
        let clock = TestClock::at(0);
        let mut orch = orchestrator(&[44, 81], 0);
        let mut source = ScriptedLaps::new(&clock, 4_000, &[]);

        block_on(orch.run_cycle(&mut source, &clock));
        assert_eq!(clock.now_ms(), 8_000);
        assert!(orch.cadence().is_due(8_000));
    }

    #[test]
    fn test_replace_target_reconciles() {
        let clock = TestClock::at(0);
        let mut orch = orchestrator(&[44, 81], 0);
        let mut source = ScriptedLaps::new(&clock, 0, &[FetchOutcome::Value(lap(44, 91_154))]);
        block_on(orch.run_cycle(&mut source, &clock));

        assert!(orch.replace_target(1, 16));
        assert_eq!(orch.targets().as_slice(), &[44, 16]);
        assert_eq!(orch.board().state(16), Some(TargetState::Pending));
        assert_eq!(orch.board().state(81), None);
        assert!(orch.board().state(44).unwrap().lap().is_some());

        assert!(!orch.replace_target(5, 1));
    }
}
