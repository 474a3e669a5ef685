//! Escalation table mapping send counts to wait intervals

use std::collections::BTreeMap;

/// Wait used when the count is below the smallest configured threshold
pub const DEFAULT_INTERVAL_SECONDS: u64 = 60;

/// Ordered mapping from successful-send count to the seconds a recipient
/// must wait before the next send
///
/// Lookups form a step function; with values non-decreasing over ascending
/// keys the step function is non-decreasing in the count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTable {
    steps: BTreeMap<u32, u64>,
}

impl IntervalTable {
    pub fn new(steps: BTreeMap<u32, u64>) -> Self {
        Self { steps }
    }

    /// Wait interval in seconds after `count` successful sends
    pub fn interval_for(&self, count: u32) -> u64 {
        if let Some(&interval) = self.steps.get(&count) {
            return interval;
        }

        if let Some((max_count, max_interval)) = self.max_step() {
            if count >= max_count {
                return max_interval;
            }
        }

        let mut interval = DEFAULT_INTERVAL_SECONDS;
        for (&threshold, &seconds) in &self.steps {
            if threshold > count {
                break;
            }
            interval = seconds;
        }
        interval
    }

    /// First step (in ascending count order) carrying the largest interval
    fn max_step(&self) -> Option<(u32, u64)> {
        self.steps
            .iter()
            .fold(None, |best, (&threshold, &seconds)| match best {
                Some((_, best_seconds)) if best_seconds >= seconds => best,
                _ => Some((threshold, seconds)),
            })
    }

    pub fn steps(&self) -> &BTreeMap<u32, u64> {
        &self.steps
    }
}

impl Default for IntervalTable {
    fn default() -> Self {
        Self::new(BTreeMap::from([(1, 60), (2, 180), (3, 600)]))
    }
}

impl From<BTreeMap<u32, u64>> for IntervalTable {
    fn from(steps: BTreeMap<u32, u64>) -> Self {
        Self::new(steps)
    }
}
