//! Ships: size specifications and the one complex state machine.
//!
//! A ship cycles `Anchoring -> Anchored -> DockingToLoadingDock ->
//! DockedToLoadingDock -> Unloading -> UnloadingDone -> Loading ->
//! LoadingDone -> Undocking -> Transit -> Anchoring` indefinitely, except
//! that a single-trip ship skips the loading branch once emptied and parks
//! at a ship dock (`DockingToShipDock -> DockedToShipDock`, terminal).
//!
//! The phase functions in [`crate::scheduler`] decide *when* a transition is
//! legal; this module enforces *what* a ship may hold: cargo count never
//! exceeds capacity and total weight never exceeds the size's maximum. Both
//! are re-validated on every cargo mutation, and a violation is a fatal
//! [`ConstructionError`], never a silent clamp.

use crate::container::ContainerSize;
use crate::error::ConstructionError;
use crate::id::{ContainerId, Location};
use crate::status::{HistoryLog, Status};
use crate::time::Hours;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ShipSize
// ---------------------------------------------------------------------------

/// Ship size class. Fixes container capacity, base and maximum weight,
/// hourly loading rate, and docking/berthing durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipSize {
    Small,
    Medium,
    Large,
}

impl ShipSize {
    /// Maximum number of containers on board.
    pub fn container_capacity(self) -> usize {
        match self {
            ShipSize::Small => 20,
            ShipSize::Medium => 50,
            ShipSize::Large => 100,
        }
    }

    /// Weight of the empty hull, in tonnes.
    pub fn base_weight_tonnes(self) -> u32 {
        match self {
            ShipSize::Small => 5_000,
            ShipSize::Medium => 27_000,
            ShipSize::Large => 55_000,
        }
    }

    /// Maximum total weight (hull + cargo), in tonnes.
    pub fn max_weight_tonnes(self) -> u32 {
        match self {
            ShipSize::Small => 5_500,
            ShipSize::Medium => 28_000,
            ShipSize::Large => 57_500,
        }
    }

    /// Containers moved per hour while loading or unloading, before crane
    /// and carrier availability caps it further.
    pub fn hourly_loading_rate(self) -> usize {
        match self {
            ShipSize::Small => 10,
            ShipSize::Medium => 15,
            ShipSize::Large => 20,
        }
    }

    /// Hours a ship spends in `DockingToLoadingDock` before it counts as
    /// docked.
    pub fn base_docking_hours(self) -> Hours {
        match self {
            ShipSize::Small => 3,
            ShipSize::Medium => 5,
            ShipSize::Large => 7,
        }
    }

    /// Hours a single-trip ship spends in `DockingToShipDock` before it is
    /// berthed for good.
    pub fn base_berthing_hours(self) -> Hours {
        match self {
            ShipSize::Small => 6,
            ShipSize::Medium => 7,
            ShipSize::Large => 9,
        }
    }
}

// ---------------------------------------------------------------------------
// Ship
// ---------------------------------------------------------------------------

/// A ship in the harbor registry. Construction validates the weight and
/// capacity invariants; every later cargo mutation re-validates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    pub name: String,
    pub size: ShipSize,
    /// Hour at which the ship first enters the anchorage.
    pub start_hour: Hours,
    /// Length of one sea round trip, in whole days.
    pub round_trip_days: Hours,
    /// A single-trip ship parks at a ship dock once emptied instead of
    /// re-entering the transit cycle.
    pub single_trip: bool,

    pub location: Location,
    pub history: HistoryLog,
    /// Containers currently on board. Bounded by the size's capacity.
    pub cargo: Vec<ContainerId>,
    /// Hull plus cargo, in tonnes. Kept in lockstep with `cargo`.
    current_weight: u32,

    /// Hour the ship last entered `Transit`; drives the round-trip return.
    pub departed_at: Option<Hours>,
    /// Set on the first transition or cargo move of the hour and cleared by
    /// the scheduler before each tick. Guarantees at most one transition per
    /// ship per simulated hour.
    altered_this_hour: bool,
}

impl Ship {
    /// Create an empty ship waiting to start. Fails for a recurring ship
    /// with a zero-day round trip, which could never be scheduled.
    pub fn new(
        name: impl Into<String>,
        size: ShipSize,
        start_hour: Hours,
        round_trip_days: Hours,
        single_trip: bool,
    ) -> Result<Self, ConstructionError> {
        let name = name.into();
        if round_trip_days == 0 && !single_trip {
            return Err(ConstructionError::ZeroRoundTrip { name });
        }
        Ok(Self {
            name,
            size,
            start_hour,
            round_trip_days,
            single_trip,
            location: Location::Anchorage,
            history: HistoryLog::new(),
            cargo: Vec::new(),
            current_weight: size.base_weight_tonnes(),
            departed_at: None,
            altered_this_hour: false,
        })
    }

    // -----------------------------------------------------------------------
    // Cargo invariants
    // -----------------------------------------------------------------------

    /// Total weight (hull + cargo) in tonnes.
    pub fn current_weight_tonnes(&self) -> u32 {
        self.current_weight
    }

    /// Whether one more container of `size` would keep both invariants.
    pub fn can_take(&self, size: ContainerSize) -> bool {
        self.cargo.len() < self.size.container_capacity()
            && self.current_weight + size.weight_tonnes() <= self.size.max_weight_tonnes()
    }

    /// Put a container on board. Re-validates capacity and weight; a
    /// violation is a fatal loading error, never a silent clamp.
    pub fn add_container(
        &mut self,
        id: ContainerId,
        size: ContainerSize,
    ) -> Result<(), ConstructionError> {
        if self.cargo.len() + 1 > self.size.container_capacity() {
            return Err(ConstructionError::CargoOverCapacity {
                name: self.name.clone(),
                count: self.cargo.len() + 1,
                capacity: self.size.container_capacity(),
            });
        }
        let weight = self.current_weight + size.weight_tonnes();
        if weight > self.size.max_weight_tonnes() {
            return Err(ConstructionError::WeightExceeded {
                name: self.name.clone(),
                weight,
                max_weight: self.size.max_weight_tonnes(),
            });
        }
        self.cargo.push(id);
        self.current_weight = weight;
        Ok(())
    }

    /// Take a container off the ship. Returns the id, or `None` if it is not
    /// on board.
    pub fn remove_container(&mut self, id: ContainerId, size: ContainerSize) -> Option<ContainerId> {
        let idx = self.cargo.iter().position(|&c| c == id)?;
        self.cargo.remove(idx);
        self.current_weight -= size.weight_tonnes();
        Some(id)
    }

    /// The next container that would come off during unloading, if any.
    pub fn next_cargo(&self) -> Option<ContainerId> {
        self.cargo.last().copied()
    }

    // -----------------------------------------------------------------------
    // State machine bookkeeping
    // -----------------------------------------------------------------------

    /// Current status (last history record).
    pub fn status(&self) -> Status {
        self.history.current()
    }

    /// Hours the ship has held its current status as of `now`.
    pub fn hours_in_status(&self, now: Hours) -> Hours {
        self.history.hours_in_current_status(now).unwrap_or(0)
    }

    /// Perform one state transition: move, append exactly one history
    /// record, and mark the ship altered for this hour.
    pub fn transition(&mut self, location: Location, now: Hours, status: Status) {
        self.location = location;
        self.history.record(location, now, status);
        self.altered_this_hour = true;
    }

    /// Whether the ship has already been advanced this hour.
    pub fn altered_this_hour(&self) -> bool {
        self.altered_this_hour
    }

    /// Mark the ship as touched this hour without a status change (used for
    /// multi-hour unload/load work so later phases skip it).
    pub fn mark_altered(&mut self) {
        self.altered_this_hour = true;
    }

    /// Clear the per-hour flag. Called once by the scheduler at the top of
    /// every tick.
    pub fn reset_altered(&mut self) {
        self.altered_this_hour = false;
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn container_ids(n: usize) -> Vec<ContainerId> {
        let mut sm = SlotMap::<ContainerId, ()>::with_key();
        (0..n).map(|_| sm.insert(())).collect()
    }

    fn small_ship() -> Ship {
        Ship::new("Vardøhus", ShipSize::Small, 0, 2, false).unwrap()
    }

    #[test]
    fn new_ship_starts_empty_at_base_weight() {
        let ship = small_ship();
        assert_eq!(ship.cargo.len(), 0);
        assert_eq!(ship.current_weight_tonnes(), 5_000);
        assert_eq!(ship.status(), Status::None);
        assert!(!ship.altered_this_hour());
    }

    #[test]
    fn recurring_ship_needs_nonzero_round_trip() {
        let err = Ship::new("Bad", ShipSize::Small, 0, 0, false).unwrap_err();
        assert!(matches!(err, ConstructionError::ZeroRoundTrip { .. }));
        // A single-trip ship never goes back to sea, so 0 is fine there.
        assert!(Ship::new("Parked", ShipSize::Small, 0, 0, true).is_ok());
    }

    #[test]
    fn cargo_capacity_enforced() {
        let mut ship = small_ship();
        let ids = container_ids(21);
        for &id in ids.iter().take(20) {
            ship.add_container(id, ContainerSize::Small).unwrap();
        }
        let err = ship.add_container(ids[20], ContainerSize::Small).unwrap_err();
        assert!(matches!(err, ConstructionError::CargoOverCapacity { .. }));
        // Nothing changed on failure.
        assert_eq!(ship.cargo.len(), 20);
    }

    #[test]
    fn weight_exceeded_is_its_own_error() {
        // Small margin above hull weight is 500 t; seventeen Large
        // containers (510 t) overflow weight well before capacity (20).
        let mut ship = small_ship();
        let ids = container_ids(17);
        for &id in ids.iter().take(16) {
            ship.add_container(id, ContainerSize::Large).unwrap();
        }
        assert_eq!(ship.current_weight_tonnes(), 5_480);
        let err = ship.add_container(ids[16], ContainerSize::Large).unwrap_err();
        assert!(matches!(err, ConstructionError::WeightExceeded { .. }));
        // Nothing changed on failure.
        assert_eq!(ship.cargo.len(), 16);
        assert_eq!(ship.current_weight_tonnes(), 5_480);
    }

    #[test]
    fn remove_container_rebalances_weight() {
        let mut ship = small_ship();
        let ids = container_ids(2);
        ship.add_container(ids[0], ContainerSize::Medium).unwrap();
        ship.add_container(ids[1], ContainerSize::Medium).unwrap();
        ship.remove_container(ids[0], ContainerSize::Medium).unwrap();
        assert_eq!(ship.current_weight_tonnes(), 5_020);
        // A container that is not on board comes back as None.
        assert_eq!(ship.remove_container(ids[0], ContainerSize::Medium), None);
    }

    #[test]
    fn transition_appends_one_record_and_marks_altered() {
        let mut ship = small_ship();
        ship.transition(Location::Anchorage, 0, Status::Anchoring);
        assert_eq!(ship.history.len(), 1);
        assert!(ship.altered_this_hour());
        ship.reset_altered();
        assert!(!ship.altered_this_hour());
        assert_eq!(ship.status(), Status::Anchoring);
    }

    #[test]
    fn hours_in_status_tracks_clock() {
        let mut ship = small_ship();
        ship.transition(Location::Anchorage, 4, Status::Anchored);
        assert_eq!(ship.hours_in_status(4), 0);
        assert_eq!(ship.hours_in_status(9), 5);
    }
}
