//! Traffic statistics for harbor simulation runs.
//!
//! Listens to core events (`ContainerUnloaded`, `ContainerLoaded`,
//! `TruckDeparted`, `ContainerArrived`, the ship transitions, `DayEnded`)
//! and aggregates them into per-day and per-ship counters. Purely a
//! consumer: it never reaches back into the harbor, so it can sit behind
//! an event-bus listener or be fed events manually after the fact.
//!
//! # Usage
//!
//! ```ignore
//! let mut stats = HarborStats::new(StatsConfig::default());
//! // Feed every delivered event:
//! stats.process_event(&event);
//! // Query after (or during) the run:
//! let delivered = stats.total_delivered();
//! let busiest = stats.busiest_day();
//! ```
//!
//! Day boundaries are taken from the `DayEnded` events in the stream, so
//! the per-day breakdown matches the scheduler's clock exactly.

use std::collections::HashMap;

use harborsim_core::event::Event;
use harborsim_core::id::ShipId;
use harborsim_core::time::Hours;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the statistics collector.
#[derive(Debug, Clone)]
pub struct StatsConfig {
    /// Maximum number of completed days retained in the per-day breakdown.
    /// Older days are dropped; running totals are unaffected.
    pub daily_history_capacity: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            daily_history_capacity: 365,
        }
    }
}

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

/// Plain event counts. Used both per-day and as the run totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficCounters {
    /// Containers moved off ships.
    pub containers_unloaded: u64,
    /// Containers moved back onto ships.
    pub containers_loaded: u64,
    /// Trucks that left the harbor with a container.
    pub truck_departures: u64,
    /// Containers delivered to their final destination.
    pub containers_delivered: u64,
    /// Ships that entered the anchorage (first arrivals and returns).
    pub ship_arrivals: u64,
    /// Ships that finished docking at a loading dock.
    pub ship_dockings: u64,
    /// Ships that put to sea.
    pub ship_departures: u64,
    /// Single-trip ships that berthed for good.
    pub ship_berthings: u64,
}

impl TrafficCounters {
    fn merge(&mut self, other: &TrafficCounters) {
        self.containers_unloaded += other.containers_unloaded;
        self.containers_loaded += other.containers_loaded;
        self.truck_departures += other.truck_departures;
        self.containers_delivered += other.containers_delivered;
        self.ship_arrivals += other.ship_arrivals;
        self.ship_dockings += other.ship_dockings;
        self.ship_departures += other.ship_departures;
        self.ship_berthings += other.ship_berthings;
    }
}

/// One completed day's counters, tagged with the day index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: Hours,
    pub counters: TrafficCounters,
}

/// Per-ship running counts over the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipCounters {
    /// Completed dockings at a loading dock.
    pub dock_visits: u64,
    pub containers_unloaded: u64,
    pub containers_loaded: u64,
    /// Departures to sea.
    pub sea_departures: u64,
}

// ---------------------------------------------------------------------------
// HarborStats
// ---------------------------------------------------------------------------

/// The statistics aggregator. Feed it events via
/// [`process_event`](HarborStats::process_event); day rollover happens on
/// the `DayEnded` events already present in the stream.
#[derive(Debug)]
pub struct HarborStats {
    config: StatsConfig,
    totals: TrafficCounters,
    current_day: TrafficCounters,
    days: Vec<DayRecord>,
    ships: HashMap<ShipId, ShipCounters>,
    last_seen_hour: Hours,
}

impl HarborStats {
    pub fn new(config: StatsConfig) -> Self {
        Self {
            config,
            totals: TrafficCounters::default(),
            current_day: TrafficCounters::default(),
            days: Vec::new(),
            ships: HashMap::new(),
            last_seen_hour: 0,
        }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    // -- Event processing ---------------------------------------------------

    /// Process a single event, updating the per-day, per-ship and total
    /// counters. Events that carry no traffic information are ignored.
    pub fn process_event(&mut self, event: &Event) {
        self.last_seen_hour = self.last_seen_hour.max(event.hour());
        match *event {
            Event::ContainerUnloaded { ship, .. } => {
                self.current_day.containers_unloaded += 1;
                self.ship_entry(ship).containers_unloaded += 1;
            }
            Event::ContainerLoaded { ship, .. } => {
                self.current_day.containers_loaded += 1;
                self.ship_entry(ship).containers_loaded += 1;
            }
            Event::TruckDeparted { .. } => {
                self.current_day.truck_departures += 1;
            }
            Event::ContainerArrived { .. } => {
                self.current_day.containers_delivered += 1;
            }
            Event::ShipAnchoring { .. } => {
                self.current_day.ship_arrivals += 1;
            }
            Event::ShipDockedToLoadingDock { ship, .. } => {
                self.current_day.ship_dockings += 1;
                self.ship_entry(ship).dock_visits += 1;
            }
            Event::ShipInTransit { ship, .. } => {
                self.current_day.ship_departures += 1;
                self.ship_entry(ship).sea_departures += 1;
            }
            Event::ShipDockedToShipDock { .. } => {
                self.current_day.ship_berthings += 1;
            }
            Event::DayEnded { day, .. } => self.end_day(day),
            _ => {}
        }
    }

    /// Close out the current day: fold it into the totals and the per-day
    /// breakdown. Called automatically on `DayEnded`; call it manually only
    /// when feeding a stream with no day markers.
    pub fn end_day(&mut self, day: Hours) {
        self.totals.merge(&self.current_day);
        self.days.push(DayRecord {
            day,
            counters: self.current_day,
        });
        if self.days.len() > self.config.daily_history_capacity {
            self.days.remove(0);
        }
        self.current_day = TrafficCounters::default();
    }

    // -- Queries ------------------------------------------------------------

    /// Totals over all completed days plus the in-progress day.
    pub fn totals(&self) -> TrafficCounters {
        let mut totals = self.totals;
        totals.merge(&self.current_day);
        totals
    }

    pub fn total_delivered(&self) -> u64 {
        self.totals().containers_delivered
    }

    pub fn total_unloaded(&self) -> u64 {
        self.totals().containers_unloaded
    }

    /// Completed days, oldest first (bounded by the configured capacity).
    pub fn daily(&self) -> &[DayRecord] {
        &self.days
    }

    /// The completed day with the most containers unloaded.
    pub fn busiest_day(&self) -> Option<DayRecord> {
        self.days
            .iter()
            .max_by_key(|d| d.counters.containers_unloaded)
            .copied()
    }

    /// Mean containers delivered per completed day.
    pub fn mean_deliveries_per_day(&self) -> f64 {
        if self.days.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.days.iter().map(|d| d.counters.containers_delivered).sum();
        sum as f64 / self.days.len() as f64
    }

    /// Per-ship counters, zeros for a ship never seen.
    pub fn ship(&self, ship: ShipId) -> ShipCounters {
        self.ships.get(&ship).copied().unwrap_or_default()
    }

    /// Number of distinct ships seen in the stream.
    pub fn tracked_ship_count(&self) -> usize {
        self.ships.len()
    }

    /// The highest event hour seen so far.
    pub fn last_seen_hour(&self) -> Hours {
        self.last_seen_hour
    }

    /// Drop everything and start over.
    pub fn clear(&mut self) {
        self.totals = TrafficCounters::default();
        self.current_day = TrafficCounters::default();
        self.days.clear();
        self.ships.clear();
        self.last_seen_hour = 0;
    }

    // -- Internal helpers ---------------------------------------------------

    fn ship_entry(&mut self, ship: ShipId) -> &mut ShipCounters {
        self.ships.entry(ship).or_default()
    }
}

impl Default for HarborStats {
    fn default() -> Self {
        Self::new(StatsConfig::default())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use harborsim_core::id::{ContainerId, TruckId};
    use slotmap::SlotMap;

    fn ship_id() -> ShipId {
        let mut sm = SlotMap::<ShipId, ()>::with_key();
        sm.insert(())
    }

    fn container_id() -> ContainerId {
        let mut sm = SlotMap::<ContainerId, ()>::with_key();
        sm.insert(())
    }

    fn truck_id() -> TruckId {
        let mut sm = SlotMap::<TruckId, ()>::with_key();
        sm.insert(())
    }

    #[test]
    fn unloads_count_per_day_and_per_ship() {
        let mut stats = HarborStats::default();
        let ship = ship_id();

        for hour in 1..=4 {
            stats.process_event(&Event::ContainerUnloaded {
                container: container_id(),
                ship,
                hour,
            });
        }
        stats.process_event(&Event::DayEnded { day: 0, hour: 24 });

        assert_eq!(stats.total_unloaded(), 4);
        assert_eq!(stats.daily().len(), 1);
        assert_eq!(stats.daily()[0].counters.containers_unloaded, 4);
        assert_eq!(stats.ship(ship).containers_unloaded, 4);
    }

    #[test]
    fn totals_include_the_in_progress_day() {
        let mut stats = HarborStats::default();
        stats.process_event(&Event::ContainerArrived {
            container: container_id(),
            hour: 3,
        });
        // No DayEnded yet: the delivery still shows in the totals.
        assert_eq!(stats.total_delivered(), 1);
        assert!(stats.daily().is_empty());
    }

    #[test]
    fn day_ended_resets_the_current_day() {
        let mut stats = HarborStats::default();
        let ship = ship_id();

        stats.process_event(&Event::ContainerUnloaded {
            container: container_id(),
            ship,
            hour: 2,
        });
        stats.process_event(&Event::DayEnded { day: 0, hour: 24 });
        stats.process_event(&Event::DayEnded { day: 1, hour: 48 });

        assert_eq!(stats.daily().len(), 2);
        assert_eq!(stats.daily()[0].counters.containers_unloaded, 1);
        assert_eq!(stats.daily()[1].counters.containers_unloaded, 0);
        assert_eq!(stats.total_unloaded(), 1);
    }

    #[test]
    fn busiest_day_picks_the_maximum() {
        let mut stats = HarborStats::default();
        let ship = ship_id();

        for (day, unloads) in [(0u64, 2usize), (1, 5), (2, 1)] {
            for _ in 0..unloads {
                stats.process_event(&Event::ContainerUnloaded {
                    container: container_id(),
                    ship,
                    hour: day * 24 + 1,
                });
            }
            stats.process_event(&Event::DayEnded {
                day,
                hour: (day + 1) * 24,
            });
        }

        let busiest = stats.busiest_day().unwrap();
        assert_eq!(busiest.day, 1);
        assert_eq!(busiest.counters.containers_unloaded, 5);
    }

    #[test]
    fn daily_history_is_bounded() {
        let mut stats = HarborStats::new(StatsConfig {
            daily_history_capacity: 3,
        });
        for day in 0..5u64 {
            stats.process_event(&Event::DayEnded {
                day,
                hour: (day + 1) * 24,
            });
        }
        assert_eq!(stats.daily().len(), 3);
        // Oldest days dropped.
        assert_eq!(stats.daily()[0].day, 2);
        assert_eq!(stats.daily()[2].day, 4);
    }

    #[test]
    fn ship_lifecycle_events_feed_ship_counters() {
        let mut stats = HarborStats::default();
        let ship = ship_id();
        let dock = {
            let mut sm = SlotMap::<harborsim_core::id::DockId, ()>::with_key();
            sm.insert(())
        };

        stats.process_event(&Event::ShipAnchoring { ship, hour: 0 });
        stats.process_event(&Event::ShipDockedToLoadingDock { ship, dock, hour: 5 });
        stats.process_event(&Event::ShipInTransit { ship, hour: 11 });
        stats.process_event(&Event::ShipAnchoring { ship, hour: 59 });

        let counters = stats.totals();
        assert_eq!(counters.ship_arrivals, 2);
        assert_eq!(counters.ship_dockings, 1);
        assert_eq!(counters.ship_departures, 1);
        assert_eq!(stats.ship(ship).dock_visits, 1);
        assert_eq!(stats.ship(ship).sea_departures, 1);
        assert_eq!(stats.tracked_ship_count(), 1);
    }

    #[test]
    fn truck_departures_counted_once_per_event() {
        let mut stats = HarborStats::default();
        for hour in 0..3 {
            stats.process_event(&Event::TruckDeparted {
                truck: truck_id(),
                container: container_id(),
                hour,
            });
        }
        assert_eq!(stats.totals().truck_departures, 3);
    }

    #[test]
    fn mean_deliveries_over_completed_days() {
        let mut stats = HarborStats::default();
        for (day, deliveries) in [(0u64, 4usize), (1, 2)] {
            for _ in 0..deliveries {
                stats.process_event(&Event::ContainerArrived {
                    container: container_id(),
                    hour: day * 24 + 1,
                });
            }
            stats.process_event(&Event::DayEnded {
                day,
                hour: (day + 1) * 24,
            });
        }
        assert!((stats.mean_deliveries_per_day() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ignored_events_track_nothing() {
        let mut stats = HarborStats::default();
        stats.process_event(&Event::HourPassed { hour: 7 });
        stats.process_event(&Event::SimulationStarting { hour: 0 });
        assert_eq!(stats.totals(), TrafficCounters::default());
        assert_eq!(stats.tracked_ship_count(), 0);
        assert_eq!(stats.last_seen_hour(), 7);
    }

    #[test]
    fn clear_resets_everything() {
        let mut stats = HarborStats::default();
        stats.process_event(&Event::ContainerArrived {
            container: container_id(),
            hour: 1,
        });
        stats.process_event(&Event::DayEnded { day: 0, hour: 24 });
        stats.clear();

        assert_eq!(stats.totals(), TrafficCounters::default());
        assert!(stats.daily().is_empty());
        assert_eq!(stats.last_seen_hour(), 0);
    }

    #[test]
    fn day_records_serialize() {
        let record = DayRecord {
            day: 3,
            counters: TrafficCounters {
                containers_unloaded: 10,
                ..TrafficCounters::default()
            },
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: DayRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
