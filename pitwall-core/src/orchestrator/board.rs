//! Cached per-driver display state with change detection

use heapless::Vec;

use super::outcome::{FetchOutcome, Status};
use super::targets::{TrackedTargets, MAX_TRACKED};
use crate::records::{DriverNumber, LapRecord};

/// What a failed fetch does to the last good value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailurePolicy {
    /// Replace the value with the failure label
    #[default]
    Placeholder,
    /// Keep showing the last good value, flagged stale
    KeepStale,
}

/// Display state of one tracked driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TargetState {
    /// Not fetched yet
    Pending,
    /// Last fetch produced this lap
    Fresh(LapRecord),
    /// Last fetch failed; showing an older lap
    Stale(LapRecord, Status),
    /// Last fetch failed and there is nothing to show
    Placeholder(Status),
}

impl TargetState {
    /// Next state after a fetch outcome
    pub fn transition(self, outcome: FetchOutcome<LapRecord>, policy: FailurePolicy) -> Self {
        let status = match outcome {
            FetchOutcome::Value(lap) => return TargetState::Fresh(lap),
            FetchOutcome::NoData => Status::NoData,
            FetchOutcome::Error(ref e) => Status::from_error(e),
        };

        match (policy, self.lap()) {
            (FailurePolicy::KeepStale, Some(lap)) => TargetState::Stale(lap, status),
            _ => TargetState::Placeholder(status),
        }
    }

    /// Lap to display, fresh or stale
    pub fn lap(&self) -> Option<LapRecord> {
        match self {
            TargetState::Fresh(lap) | TargetState::Stale(lap, _) => Some(*lap),
            _ => None,
        }
    }

    /// Failure label, if the last fetch failed
    pub fn status(&self) -> Option<Status> {
        match self {
            TargetState::Stale(_, status) | TargetState::Placeholder(status) => Some(*status),
            _ => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, TargetState::Stale(..))
    }
}

/// States of all tracked drivers, in tracking order
#[derive(Debug, Clone)]
pub struct LapBoard<const N: usize = MAX_TRACKED> {
    entries: Vec<(DriverNumber, TargetState), N>,
    policy: FailurePolicy,
    dirty: bool,
}

impl<const N: usize> LapBoard<N> {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            entries: Vec::new(),
            policy,
            dirty: true,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Follow a new tracked list
    ///
    /// Drivers that stay keep their cached state, new ones start
    /// `Pending`.
    pub fn reconcile(&mut self, targets: &TrackedTargets<N>) {
        let mut entries = Vec::new();
        for driver in targets.iter() {
            let state = self.state(driver).unwrap_or(TargetState::Pending);
            let _ = entries.push((driver, state));
        }
        if entries != self.entries {
            self.entries = entries;
            self.dirty = true;
        }
    }

    /// Fold a fetch outcome into the cache
    ///
    /// Returns `true` and marks the board dirty when the displayed state
    /// changed. Outcomes for untracked drivers are ignored.
    pub fn apply(&mut self, driver: DriverNumber, outcome: FetchOutcome<LapRecord>) -> bool {
        let policy = self.policy;
        let Some((_, state)) = self.entries.iter_mut().find(|(d, _)| *d == driver) else {
            return false;
        };

        let next = state.transition(outcome, policy);
        if next == *state {
            return false;
        }
        *state = next;
        self.dirty = true;
        true
    }

    pub fn state(&self, driver: DriverNumber) -> Option<TargetState> {
        self.entries
            .iter()
            .find(|(d, _)| *d == driver)
            .map(|(_, state)| *state)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DriverNumber, TargetState)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag, returning its previous value
    pub fn take_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.dirty, false)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
