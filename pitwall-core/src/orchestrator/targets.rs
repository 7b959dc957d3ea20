//! The ordered list of drivers being followed

use heapless::Vec;

use crate::records::DriverNumber;
use crate::stream::fill_with_defaults;

/// Maximum number of tracked drivers
pub const MAX_TRACKED: usize = 4;

/// Ordered, duplicate-free list of tracked drivers
///
/// The first entry is the reference for gap computation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrackedTargets<const N: usize = MAX_TRACKED> {
    drivers: Vec<DriverNumber, N>,
}

impl<const N: usize> TrackedTargets<N> {
    /// Take `drivers` in order, dropping repeats
    pub fn new(drivers: &[DriverNumber]) -> Self {
        let mut targets = Self { drivers: Vec::new() };
        for &driver in drivers {
            if !targets.contains(driver) && targets.drivers.push(driver).is_err() {
                break;
            }
        }
        targets
    }

    /// The first `limit` distinct defaults
    pub fn from_defaults(defaults: &[DriverNumber], limit: usize) -> Self {
        let mut drivers = Vec::new();
        fill_with_defaults(&mut drivers, limit, defaults);
        Self { drivers }
    }

    pub fn as_slice(&self) -> &[DriverNumber] {
        &self.drivers
    }

    pub fn iter(&self) -> impl Iterator<Item = DriverNumber> + '_ {
        self.drivers.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn contains(&self, driver: DriverNumber) -> bool {
        self.drivers.contains(&driver)
    }

    pub fn get(&self, slot: usize) -> Option<DriverNumber> {
        self.drivers.get(slot).copied()
    }

    /// Put `driver` into `slot`
    ///
    /// If `driver` is already tracked elsewhere the two slots swap, so the
    /// list stays duplicate-free. Returns `false` for an unknown slot.
    pub fn replace(&mut self, slot: usize, driver: DriverNumber) -> bool {
        if slot >= self.drivers.len() {
            return false;
        }
        if let Some(existing) = self.drivers.iter().position(|&d| d == driver) {
            self.drivers.swap(existing, slot);
        } else {
            self.drivers[slot] = driver;
        }
        true
    }
}
