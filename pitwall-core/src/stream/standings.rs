//! Top-N driver ranking from a streamed classification

use heapless::Vec;

use super::Flow;
use crate::records::{DriverNumber, StandingsEntry};

/// Ranking key: effective rank, then list order
type Key = (u16, u16);

/// Keeps the best `limit` distinct drivers seen so far
///
/// Equivalent to sorting every entry by `(rank, index)`, dropping repeat
/// drivers and taking the first `limit`, without storing the full list.
#[derive(Debug, Clone)]
pub struct TopDrivers<const N: usize> {
    ranked: Vec<(Key, DriverNumber), N>,
    limit: usize,
}

impl<const N: usize> TopDrivers<N> {
    /// Track up to `limit` drivers (capped at `N`)
    pub fn new(limit: usize) -> Self {
        Self {
            ranked: Vec::new(),
            limit: limit.min(N),
        }
    }

    /// Offer one entry; asks to stop once ranks `1..=limit` are all held
    pub fn offer(&mut self, entry: StandingsEntry) -> Flow {
        if self.limit == 0 {
            return Flow::Stop;
        }
        let key = (entry.rank(), entry.index);

        if let Some(i) = self.ranked.iter().position(|(_, d)| *d == entry.driver_number) {
            if key >= self.ranked[i].0 {
                return self.flow();
            }
            self.ranked.remove(i);
        }

        let at = self.ranked.iter().position(|(k, _)| key < *k).unwrap_or(self.ranked.len());
        if at < self.limit {
            if self.ranked.len() == self.limit {
                self.ranked.pop();
            }
            // Length is below limit <= N here
            let _ = self.ranked.insert(at, (key, entry.driver_number));
        }

        self.flow()
    }

    fn flow(&self) -> Flow {
        let settled = self.ranked.len() == self.limit
            && self
                .ranked
                .iter()
                .enumerate()
                .all(|(i, ((rank, _), _))| usize::from(*rank) == i + 1);
        if settled {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }

    /// Drivers in ranking order
    pub fn drivers(&self) -> impl Iterator<Item = DriverNumber> + '_ {
        self.ranked.iter().map(|(_, d)| *d)
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Ranked drivers padded with `defaults` not already present
    pub fn into_tracked(self, defaults: &[DriverNumber]) -> Vec<DriverNumber, N> {
        let mut tracked: Vec<DriverNumber, N> = self.drivers().collect();
        fill_with_defaults(&mut tracked, self.limit, defaults);
        tracked
    }
}

/// Append drivers from `defaults` until `tracked` holds `limit` entries
///
/// Drivers already present are not repeated.
pub fn fill_with_defaults<const N: usize>(
    tracked: &mut Vec<DriverNumber, N>,
    limit: usize,
    defaults: &[DriverNumber],
) {
    for &driver in defaults {
        if tracked.len() >= limit.min(N) {
            break;
        }
        if !tracked.contains(&driver) {
            let _ = tracked.push(driver);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec as StdVec;

    fn entry(driver_number: u16, position: Option<u16>, index: u16) -> StandingsEntry {
        StandingsEntry {
            driver_number,
            position,
            points: None,
            index,
        }
    }

    fn drivers<const N: usize>(top: &TopDrivers<N>) -> StdVec<u16> {
        top.drivers().collect()
    }

    #[test]
    fn test_ranks_by_position_then_index() {
        let mut top = TopDrivers::<3>::new(3);
        top.offer(entry(16, Some(4), 0));
        top.offer(entry(1, Some(2), 1));
        top.offer(entry(44, None, 2)); // index fallback: rank 3
        top.offer(entry(4, Some(9), 3));
        assert_eq!(drivers(&top), [1, 44, 16]);
    }

    #[test]
    fn test_duplicates_keep_best() {
        let mut top = TopDrivers::<3>::new(3);
        top.offer(entry(44, Some(5), 0));
        top.offer(entry(1, Some(3), 1));
        top.offer(entry(44, Some(2), 2));
        top.offer(entry(44, Some(7), 3));
        assert_eq!(drivers(&top), [44, 1]);
    }

    #[test]
    fn test_stops_when_podium_settled() {
        let mut top = TopDrivers::<3>::new(2);
        assert_eq!(top.offer(entry(1, Some(1), 0)), Flow::Continue);
        assert_eq!(top.offer(entry(16, Some(3), 1)), Flow::Continue);
        assert_eq!(top.offer(entry(44, Some(2), 2)), Flow::Stop);
        assert_eq!(drivers(&top), [1, 44]);
    }

    #[test]
    fn test_padding_with_defaults() {
        let mut top = TopDrivers::<3>::new(3);
        top.offer(entry(81, Some(1), 0));
        let tracked = top.into_tracked(&[44, 81, 3]);
        assert_eq!(tracked.as_slice(), &[81, 44, 3]);

        let empty = TopDrivers::<3>::new(3);
        assert_eq!(empty.into_tracked(&[44, 81, 3]).as_slice(), &[44, 81, 3]);
    }

    #[test]
    fn test_limit_capped() {
        let mut top = TopDrivers::<2>::new(5);
        for (i, d) in [10, 11, 12].into_iter().enumerate() {
            top.offer(entry(d, None, i as u16));
        }
        assert_eq!(drivers(&top), [10, 11]);
    }
}
