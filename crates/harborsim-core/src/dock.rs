//! Dock pool: fixed-capacity, size-classed berths with checked allocation.
//!
//! Two dock kinds exist. Loading docks are where cargo operations happen and
//! carry a fixed set of truck-loading spots; ship docks store idle
//! (typically single-trip) ships with no cargo operation.
//!
//! Every operation is checked and atomic: `allocate` either claims a free
//! dock in full or changes nothing, and exhaustion surfaces as `None`/`false`
//! so callers retry next hour.

use crate::id::{DockId, ShipId, TruckId};
use crate::ship::ShipSize;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// Dock
// ---------------------------------------------------------------------------

/// Which role a dock plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DockKind {
    /// Cargo is loaded/unloaded here; has truck spots.
    Loading,
    /// Long-term berth for emptied single-trip ships.
    Ship,
}

/// A single dock. Free when `occupant` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dock {
    pub kind: DockKind,
    pub size: ShipSize,
    pub occupant: Option<ShipId>,
    /// Truck-loading spots (loading docks only; empty for ship docks).
    /// Slot index -> occupying truck.
    pub truck_spots: Vec<Option<TruckId>>,
}

/// Truck spots per loading dock, by dock size.
fn truck_spot_count(size: ShipSize) -> usize {
    match size {
        ShipSize::Small => 2,
        ShipSize::Medium => 4,
        ShipSize::Large => 6,
    }
}

// ---------------------------------------------------------------------------
// DockPool
// ---------------------------------------------------------------------------

/// All docks in the harbor, keyed by [`DockId`]. O(pool size) scans are fine
/// at harbor scale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockPool {
    docks: SlotMap<DockId, Dock>,
}

impl DockPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dock of the given kind and size class; returns its id.
    pub fn add_dock(&mut self, kind: DockKind, size: ShipSize) -> DockId {
        let truck_spots = match kind {
            DockKind::Loading => vec![None; truck_spot_count(size)],
            DockKind::Ship => Vec::new(),
        };
        self.docks.insert(Dock {
            kind,
            size,
            occupant: None,
            truck_spots,
        })
    }

    /// Find a free dock of the given kind and size class.
    pub fn find_free(&self, kind: DockKind, size: ShipSize) -> Option<DockId> {
        self.docks
            .iter()
            .find(|(_, d)| d.kind == kind && d.size == size && d.occupant.is_none())
            .map(|(id, _)| id)
    }

    /// Claim a dock for a ship. Fails (and changes nothing) if the dock is
    /// unknown or already occupied.
    pub fn allocate(&mut self, dock: DockId, ship: ShipId) -> bool {
        match self.docks.get_mut(dock) {
            Some(d) if d.occupant.is_none() => {
                d.occupant = Some(ship);
                true
            }
            _ => false,
        }
    }

    /// Free a dock, returning the ship that occupied it.
    pub fn release(&mut self, dock: DockId) -> Option<ShipId> {
        self.docks.get_mut(dock)?.occupant.take()
    }

    /// Free docks of a kind and size class.
    pub fn free_count(&self, kind: DockKind, size: ShipSize) -> usize {
        self.docks
            .values()
            .filter(|d| d.kind == kind && d.size == size && d.occupant.is_none())
            .count()
    }

    /// Occupied docks of a kind and size class.
    pub fn occupied_count(&self, kind: DockKind, size: ShipSize) -> usize {
        self.docks
            .values()
            .filter(|d| d.kind == kind && d.size == size && d.occupant.is_some())
            .count()
    }

    /// All docks of a kind and size class.
    pub fn total_count(&self, kind: DockKind, size: ShipSize) -> usize {
        self.docks
            .values()
            .filter(|d| d.kind == kind && d.size == size)
            .count()
    }

    pub fn get(&self, dock: DockId) -> Option<&Dock> {
        self.docks.get(dock)
    }

    /// Ids of all docks, for stable snapshot iteration.
    pub fn dock_ids(&self) -> Vec<DockId> {
        self.docks.keys().collect()
    }

    // -----------------------------------------------------------------------
    // Truck spots
    // -----------------------------------------------------------------------

    /// Seat a truck in the first free spot of a loading dock. Returns the
    /// spot index, or `None` if the dock has no free spot (retry next hour).
    pub fn claim_truck_spot(&mut self, dock: DockId, truck: TruckId) -> Option<usize> {
        let d = self.docks.get_mut(dock)?;
        let spot = d.truck_spots.iter().position(Option::is_none)?;
        d.truck_spots[spot] = Some(truck);
        Some(spot)
    }

    /// Truck spots across every loading dock, free or not.
    pub fn truck_spot_total(&self) -> usize {
        self.docks.values().map(|d| d.truck_spots.len()).sum()
    }

    /// Remove a truck from its spot. Returns false if it was not seated.
    pub fn release_truck_spot(&mut self, dock: DockId, truck: TruckId) -> bool {
        let Some(d) = self.docks.get_mut(dock) else {
            return false;
        };
        match d.truck_spots.iter().position(|s| *s == Some(truck)) {
            Some(spot) => {
                d.truck_spots[spot] = None;
                true
            }
            None => false,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
