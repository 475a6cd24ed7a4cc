//! Daily snapshots: deep-copied end-of-day views of the harbor.
//!
//! A [`DailyLog`] owns everything it reports. Capturing one clones the data
//! out of the live harbor, so later simulation hours can never mutate a log
//! already taken. The full run's logs accumulate in [`SimulationHistory`],
//! which is what reporting reads after the run ends.

use crate::dock::DockKind;
use crate::harbor::Harbor;
use crate::id::{ContainerId, Location, ShipId};
use crate::ship::Ship;
use crate::status::Status;
use crate::time::Hours;
use serde::{Deserialize, Serialize};

/// One ship's state at capture time, copied out of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipSnapshot {
    pub id: ShipId,
    pub name: String,
    pub status: Status,
    pub location: Location,
    pub cargo_count: usize,
}

impl ShipSnapshot {
    fn capture(id: ShipId, ship: &Ship) -> Self {
        Self {
            id,
            name: ship.name.clone(),
            status: ship.status(),
            location: ship.location,
            cargo_count: ship.cargo.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// DailyLog
// ---------------------------------------------------------------------------

/// The harbor at the end of one simulated day. Ships are grouped by where
/// they were; container ids are listed for the yard and the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLog {
    pub day: u64,
    /// Hour of capture (a multiple of 24, plus the starting hour).
    pub hour: Hours,
    pub ships_in_transit: Vec<ShipSnapshot>,
    pub ships_at_anchorage: Vec<ShipSnapshot>,
    pub ships_at_loading_docks: Vec<ShipSnapshot>,
    pub ships_at_ship_docks: Vec<ShipSnapshot>,
    pub containers_in_storage: Vec<ContainerId>,
    pub containers_arrived: Vec<ContainerId>,
}

impl DailyLog {
    /// Deep-copy the harbor's current state into an owned log.
    pub fn capture(harbor: &Harbor, day: u64, hour: Hours) -> Self {
        let mut log = Self {
            day,
            hour,
            ..Self::default()
        };

        for id in harbor.ship_ids() {
            let Some(ship) = harbor.ship(id) else { continue };
            let snapshot = ShipSnapshot::capture(id, ship);
            match ship.location {
                Location::Dock(dock) => {
                    match harbor.docks().get(dock).map(|d| d.kind) {
                        Some(DockKind::Ship) => log.ships_at_ship_docks.push(snapshot),
                        _ => log.ships_at_loading_docks.push(snapshot),
                    }
                }
                Location::Anchorage => log.ships_at_anchorage.push(snapshot),
                _ => log.ships_in_transit.push(snapshot),
            }
        }

        log.containers_in_storage = harbor.storage().all_stored();
        log.containers_arrived = harbor.arrived_containers().to_vec();
        log
    }

    /// Ships captured, across all groups.
    pub fn ship_count(&self) -> usize {
        self.ships_in_transit.len()
            + self.ships_at_anchorage.len()
            + self.ships_at_loading_docks.len()
            + self.ships_at_ship_docks.len()
    }
}

// ---------------------------------------------------------------------------
// SimulationHistory
// ---------------------------------------------------------------------------

/// All daily logs of one run, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationHistory {
    days: Vec<DailyLog>,
}

impl SimulationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, log: DailyLog) {
        self.days.push(log);
    }

    pub fn days(&self) -> &[DailyLog] {
        &self.days
    }

    pub fn last(&self) -> Option<&DailyLog> {
        self.days.last()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
