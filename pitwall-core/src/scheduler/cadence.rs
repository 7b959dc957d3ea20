//! Fixed-interval cycle timing

/// Start-to-start schedule for fetch cycles
///
/// The next cycle is due one interval after the previous one started.
/// A cycle that overruns its interval makes the next one due as soon as
/// it finishes; there is no catching up and no backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cadence {
    interval_ms: u64,
    next_due_ms: u64,
}

impl Cadence {
    /// First cycle due at `first_due_ms`
    pub const fn new(interval_ms: u64, first_due_ms: u64) -> Self {
        Self {
            interval_ms,
            next_due_ms: first_due_ms,
        }
    }

    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub const fn next_due_ms(&self) -> u64 {
        self.next_due_ms
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms >= self.next_due_ms
    }

    /// Time left until the next cycle
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.next_due_ms.saturating_sub(now_ms)
    }

    /// A cycle starts now
    pub fn begin(&mut self, now_ms: u64) {
        self.next_due_ms = now_ms + self.interval_ms;
    }

    /// The cycle that began last has finished
    ///
    /// Re-anchors to `now_ms` after an overrun.
    pub fn complete(&mut self, now_ms: u64) {
        if now_ms > self.next_due_ms {
            self.next_due_ms = now_ms;
        }
    }

    /// Push the next cycle a full interval past `now_ms`
    ///
    /// Used after user interaction so a fetch does not start the moment
    /// a sub-screen closes.
    pub fn restart(&mut self, now_ms: u64) {
        self.next_due_ms = now_ms + self.interval_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_to_start() {
        let mut cadence = Cadence::new(5_000, 1_500);
        assert!(!cadence.is_due(1_000));
        assert!(cadence.is_due(1_500));

        cadence.begin(1_500);
        cadence.complete(2_300);
        assert_eq!(cadence.next_due_ms(), 6_500);
        assert_eq!(cadence.remaining_ms(2_300), 4_200);
    }

    #[test]
    fn test_overrun_reanchors() {
        let mut cadence = Cadence::new(5_000, 0);
        cadence.begin(0);
        cadence.complete(7_250);
        assert_eq!(cadence.next_due_ms(), 7_250);
        assert!(cadence.is_due(7_250));
    }

    #[test]
    fn test_restart() {
        let mut cadence = Cadence::new(5_000, 0);
        cadence.begin(0);
        cadence.restart(3_000);
        assert_eq!(cadence.next_due_ms(), 8_000);
    }
}
