//! Simulated time: whole hours on a shared clock.
//!
//! The scheduler advances in discrete one-hour ticks. All durations in the
//! harbor are whole hours or whole days; there is no sub-hour resolution and
//! no wall-clock coupling, which keeps every run deterministic.

use serde::{Deserialize, Serialize};

/// A count of simulated hours since hour zero.
pub type Hours = u64;

/// Hours in one simulated day. Day rollover (and the daily snapshot) happens
/// whenever the clock crosses a multiple of this.
pub const HOURS_PER_DAY: Hours = 24;

/// The shared simulation clock. Owned by the scheduler; everything else
/// reads timestamps from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    hour: Hours,
}

impl SimClock {
    /// Create a clock starting at the given hour.
    pub fn starting_at(hour: Hours) -> Self {
        Self { hour }
    }

    /// The current simulated hour.
    pub fn now(&self) -> Hours {
        self.hour
    }

    /// Hour within the current day, `0..24`.
    pub fn hour_of_day(&self) -> Hours {
        self.hour % HOURS_PER_DAY
    }

    /// Whole days elapsed since hour zero.
    pub fn day(&self) -> Hours {
        self.hour / HOURS_PER_DAY
    }

    /// Advance the clock by exactly one hour.
    pub fn tick(&mut self) {
        self.hour += 1;
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::starting_at(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_where_told() {
        let clock = SimClock::starting_at(30);
        assert_eq!(clock.now(), 30);
        assert_eq!(clock.day(), 1);
        assert_eq!(clock.hour_of_day(), 6);
    }

    #[test]
    fn tick_advances_one_hour() {
        let mut clock = SimClock::default();
        for expected in 1..=48u64 {
            clock.tick();
            assert_eq!(clock.now(), expected);
        }
        assert_eq!(clock.day(), 2);
        assert_eq!(clock.hour_of_day(), 0);
    }

    #[test]
    fn day_rollover_at_midnight() {
        let mut clock = SimClock::starting_at(23);
        assert_eq!(clock.day(), 0);
        clock.tick();
        assert_eq!(clock.hour_of_day(), 0);
        assert_eq!(clock.day(), 1);
    }
}
