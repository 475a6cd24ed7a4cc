//! The harbor aggregate: every pool, registry and pseudo-location, plus the
//! checked transfer operations the scheduler drives.
//!
//! All shared resources (docks, storage slots, cranes, AGVs, trucks) are
//! owned here and mutated only through this module's operations, each of
//! which is all-or-nothing: either the whole transfer completes or nothing
//! changes and the caller gets `None` to retry next hour. A single-container
//! move is a three-hop pipeline -- ship to crane to AGV or truck on the way
//! ashore, storage to crane to ship on the way back -- and every hop's
//! resource is reserved up front before any state is touched.

use crate::carrier::Carrier;
use crate::container::{Container, ContainerSize};
use crate::dock::{DockKind, DockPool};
use crate::error::{CarrierError, ConstructionError, LookupError};
use crate::id::{AgvId, ContainerId, CraneId, DockId, Location, ShipId, TruckId};
use crate::ship::{Ship, ShipSize};
use crate::status::{Status, StatusRecord};
use crate::storage::StorageArea;
use crate::time::Hours;
use slotmap::SlotMap;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Dock counts per size class, for one dock kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DockCounts {
    pub small: usize,
    pub medium: usize,
    pub large: usize,
}

/// Construction parameters for a harbor. Plain values; no file format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarborConfig {
    pub loading_docks: DockCounts,
    pub ship_docks: DockCounts,
    /// Storage slots per container size class.
    pub storage_slots: DockCounts,
    pub cranes: usize,
    pub agvs: usize,
    /// Trucks spawned into the queue each simulated hour, while the queue
    /// is below [`Harbor::truck_queue_capacity`].
    pub trucks_per_hour: usize,
    /// Whole hours a truck takes from the harbor gate to the destination.
    pub truck_transit_hours: Hours,
    /// Percent of unloaded containers routed directly onto trucks instead
    /// of into storage.
    pub direct_delivery_percent: u8,
    /// Seed for the deterministic routing split.
    pub rng_seed: u64,
}

impl Default for HarborConfig {
    fn default() -> Self {
        Self {
            loading_docks: DockCounts {
                small: 2,
                medium: 2,
                large: 2,
            },
            ship_docks: DockCounts {
                small: 1,
                medium: 1,
                large: 1,
            },
            storage_slots: DockCounts {
                small: 100,
                medium: 200,
                large: 200,
            },
            cranes: 4,
            agvs: 8,
            trucks_per_hour: 4,
            truck_transit_hours: 6,
            direct_delivery_percent: 10,
            rng_seed: 0,
        }
    }
}

/// Per-ship construction input: identity, schedule, and pre-loaded cargo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipSpec {
    pub name: String,
    pub size: ShipSize,
    /// Hour the ship first enters the anchorage.
    pub start_hour: Hours,
    pub round_trip_days: Hours,
    pub single_trip: bool,
    /// Sizes of the containers the ship arrives with.
    pub cargo: Vec<ContainerSize>,
}

// ---------------------------------------------------------------------------
// Unload routing
// ---------------------------------------------------------------------------

/// Where a single unloaded container ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnloadDestination {
    /// Stored in the yard via crane and AGV.
    Storage,
    /// Departed directly on a truck toward the destination.
    Truck(TruckId),
}

/// Result of one completed ship-to-shore container move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnloadedMove {
    pub container: ContainerId,
    pub destination: UnloadDestination,
}

// ---------------------------------------------------------------------------
// Harbor
// ---------------------------------------------------------------------------

/// Owns all entities and resource pools for one simulation run. Constructed
/// once from a ship list and a [`HarborConfig`], mutated by the scheduler
/// throughout the run, read-only afterwards for reporting.
#[derive(Debug)]
pub struct Harbor {
    pub(crate) ships: SlotMap<ShipId, Ship>,
    pub(crate) containers: SlotMap<ContainerId, Container>,
    pub(crate) trucks: SlotMap<TruckId, Carrier>,
    pub(crate) agvs: SlotMap<AgvId, Carrier>,
    pub(crate) cranes: SlotMap<CraneId, Carrier>,
    pub(crate) docks: DockPool,
    pub(crate) storage: StorageArea,

    /// Trucks waiting to be assigned work, oldest first.
    truck_queue: Vec<TruckId>,
    /// Trucks on the road: (truck, departure hour).
    trucks_in_transit: Vec<(TruckId, Hours)>,
    /// Containers delivered to their final destination, in delivery order.
    arrived: Vec<ContainerId>,

    config: HarborConfig,
}

impl Harbor {
    /// Build a harbor from construction parameters. Invalid parameters
    /// (cargo over capacity, weight overflow) are fatal; the simulation
    /// must not start over a harbor that failed here.
    pub fn new(ship_specs: Vec<ShipSpec>, config: HarborConfig) -> Result<Self, ConstructionError> {
        let mut docks = DockPool::new();
        let add = |docks: &mut DockPool, kind, counts: DockCounts| {
            for _ in 0..counts.small {
                docks.add_dock(kind, ShipSize::Small);
            }
            for _ in 0..counts.medium {
                docks.add_dock(kind, ShipSize::Medium);
            }
            for _ in 0..counts.large {
                docks.add_dock(kind, ShipSize::Large);
            }
        };
        add(&mut docks, DockKind::Loading, config.loading_docks);
        add(&mut docks, DockKind::Ship, config.ship_docks);

        let storage = StorageArea::new(
            config.storage_slots.small,
            config.storage_slots.medium,
            config.storage_slots.large,
        );

        let mut harbor = Self {
            ships: SlotMap::with_key(),
            containers: SlotMap::with_key(),
            trucks: SlotMap::with_key(),
            agvs: SlotMap::with_key(),
            cranes: SlotMap::with_key(),
            docks,
            storage,
            truck_queue: Vec::new(),
            trucks_in_transit: Vec::new(),
            arrived: Vec::new(),
            config,
        };

        for _ in 0..harbor.config.cranes {
            harbor.cranes.insert(Carrier::new(Location::Storage));
        }
        for _ in 0..harbor.config.agvs {
            harbor.agvs.insert(Carrier::new(Location::Storage));
        }

        for spec in ship_specs {
            let ship = Ship::new(
                spec.name,
                spec.size,
                spec.start_hour,
                spec.round_trip_days,
                spec.single_trip,
            )?;
            let ship_id = harbor.ships.insert(ship);
            for size in spec.cargo {
                let container = Container::new(
                    size,
                    Location::Ship(ship_id),
                    spec.start_hour,
                    Status::Transit,
                );
                let container_id = harbor.containers.insert(container);
                harbor.ships[ship_id].add_container(container_id, size)?;
            }
        }

        Ok(harbor)
    }

    pub fn config(&self) -> &HarborConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Registry access
    // -----------------------------------------------------------------------

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.get(id)
    }

    pub fn ship_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.get_mut(id)
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id)
    }

    /// Ids of all registered ships, in registration order. Phase functions
    /// iterate this stable copy, never the live map.
    pub fn ship_ids(&self) -> Vec<ShipId> {
        self.ships.keys().collect()
    }

    pub fn ship_count(&self) -> usize {
        self.ships.len()
    }

    /// Count of ships per current status; read-only diagnostics.
    pub fn ship_status_counts(&self) -> HashMap<Status, usize> {
        let mut counts = HashMap::new();
        for ship in self.ships.values() {
            *counts.entry(ship.status()).or_insert(0) += 1;
        }
        counts
    }

    /// Full status history of a ship. The public history surface contracts
    /// to error on an unknown id rather than return empty.
    pub fn ship_history(&self, id: ShipId) -> Result<&[StatusRecord], LookupError> {
        self.ships
            .get(id)
            .map(|s| s.history.records())
            .ok_or(LookupError::ShipNotFound(id))
    }

    /// Full status history of a container; errors on an unknown id.
    pub fn container_history(&self, id: ContainerId) -> Result<&[StatusRecord], LookupError> {
        self.containers
            .get(id)
            .map(|c| c.history.records())
            .ok_or(LookupError::ContainerNotFound(id))
    }

    /// Containers delivered to their destination, in delivery order.
    pub fn arrived_containers(&self) -> &[ContainerId] {
        &self.arrived
    }

    pub fn storage(&self) -> &StorageArea {
        &self.storage
    }

    pub fn docks(&self) -> &DockPool {
        &self.docks
    }

    // -----------------------------------------------------------------------
    // Dock operations
    // -----------------------------------------------------------------------

    /// Find and claim a free dock of the given kind for a ship. Atomic:
    /// `None` means no dock of the ship's size class is free this hour and
    /// nothing changed.
    pub fn claim_dock(&mut self, kind: DockKind, ship_id: ShipId) -> Option<DockId> {
        let size = self.ships.get(ship_id)?.size;
        let dock = self.docks.find_free(kind, size)?;
        // find_free only returns unoccupied docks, so allocate cannot fail.
        self.docks.allocate(dock, ship_id);
        Some(dock)
    }

    /// Release the dock a ship occupies, if any.
    pub fn release_dock_of(&mut self, ship_id: ShipId) {
        let occupied: Vec<DockId> = self
            .docks
            .dock_ids()
            .into_iter()
            .filter(|&d| self.docks.get(d).and_then(|d| d.occupant) == Some(ship_id))
            .collect();
        for dock in occupied {
            self.docks.release(dock);
        }
    }

    // -----------------------------------------------------------------------
    // Carrier pools
    // -----------------------------------------------------------------------

    fn free_crane(&self) -> Option<CraneId> {
        self.cranes
            .iter()
            .find(|(_, c)| c.is_empty())
            .map(|(id, _)| id)
    }

    fn free_agv(&self) -> Option<AgvId> {
        self.agvs
            .iter()
            .find(|(_, c)| c.is_empty())
            .map(|(id, _)| id)
    }

    /// Spawn one truck into the waiting queue.
    pub fn spawn_truck(&mut self) -> TruckId {
        let truck = self.trucks.insert(Carrier::new(Location::TruckQueue));
        self.truck_queue.push(truck);
        truck
    }

    /// Queue headroom: one waiting truck per loading-dock truck spot. The
    /// scheduler stops spawning once the queue is at capacity.
    pub fn truck_queue_capacity(&self) -> usize {
        self.docks.truck_spot_total()
    }

    /// Load a container onto a truck in the active pool, checking pool
    /// membership first. A retired or unknown truck, or one already carrying
    /// a container, is misuse and errors.
    pub fn load_truck(
        &mut self,
        truck: TruckId,
        container: ContainerId,
    ) -> Result<(), CarrierError> {
        self.trucks
            .get_mut(truck)
            .ok_or(CarrierError::NotFound)?
            .load_container(container)
    }

    /// Trucks currently waiting in the queue.
    pub fn queued_truck_count(&self) -> usize {
        self.truck_queue.len()
    }

    /// Trucks currently on the road.
    pub fn trucks_in_transit_count(&self) -> usize {
        self.trucks_in_transit.len()
    }

    // -----------------------------------------------------------------------
    // Container moves (all-or-nothing)
    // -----------------------------------------------------------------------

    /// Move one container off a docked ship through the crane pipeline.
    ///
    /// Routing: with `prefer_truck`, try the direct truck route first and
    /// fall back to storage, and vice versa. Every hop's resource (crane,
    /// AGV or truck, storage space) is checked before anything moves; if no
    /// complete route exists this hour, nothing changes and the caller
    /// retries next tick. The crane and AGV finish the move within the hour
    /// and end it empty.
    pub fn unload_one_container(
        &mut self,
        ship_id: ShipId,
        now: Hours,
        prefer_truck: bool,
    ) -> Option<UnloadedMove> {
        let ship = self.ships.get(ship_id)?;
        let container_id = ship.next_cargo()?;
        let size = self.containers.get(container_id)?.size;
        let crane = self.free_crane()?;

        let agv = self.free_agv().filter(|_| self.storage.has_free_space(size));
        let truck_waiting = !self.truck_queue.is_empty();

        let destination = match (prefer_truck, truck_waiting, agv) {
            (true, true, _) | (false, true, None) => {
                self.unload_via_truck(ship_id, container_id, size, crane, now)
            }
            (_, _, Some(agv)) => {
                self.unload_via_storage(ship_id, container_id, size, crane, agv, now)
            }
            _ => return None,
        };

        Some(UnloadedMove {
            container: container_id,
            destination,
        })
    }

    /// Ship -> crane -> AGV -> storage. Availability was checked by the
    /// caller; the hops themselves cannot fail.
    fn unload_via_storage(
        &mut self,
        ship_id: ShipId,
        container_id: ContainerId,
        size: ContainerSize,
        crane: CraneId,
        agv: AgvId,
        now: Hours,
    ) -> UnloadDestination {
        self.ships[ship_id].remove_container(container_id, size);
        let _ = self.cranes[crane].load_container(container_id);
        let from_crane = self.cranes[crane].unload_container();
        let _ = self.agvs[agv].load_container(container_id);
        let from_agv = self.agvs[agv].unload_container();
        debug_assert_eq!(from_crane, Some(container_id));
        debug_assert_eq!(from_agv, Some(container_id));
        self.storage.store(size, container_id);
        self.containers[container_id].relocate(Location::Storage, now, Status::InStorage);

        UnloadDestination::Storage
    }

    /// Ship -> crane -> truck; the truck departs for the destination in the
    /// same hour.
    fn unload_via_truck(
        &mut self,
        ship_id: ShipId,
        container_id: ContainerId,
        size: ContainerSize,
        crane: CraneId,
        now: Hours,
    ) -> UnloadDestination {
        let truck = self.truck_queue.remove(0);

        self.ships[ship_id].remove_container(container_id, size);
        let _ = self.cranes[crane].load_container(container_id);
        let from_crane = self.cranes[crane].unload_container();
        debug_assert_eq!(from_crane, Some(container_id));
        let loaded = self.load_truck(truck, container_id);
        debug_assert_eq!(loaded, Ok(()));
        self.trucks[truck].location = Location::TruckTransit;
        self.trucks_in_transit.push((truck, now));
        self.containers[container_id].relocate(Location::Truck(truck), now, Status::Transit);

        UnloadDestination::Truck(truck)
    }

    /// Move one stored container onto a docked ship (storage -> crane ->
    /// ship). Picks the first stored size class the ship can still take
    /// without breaking its weight or capacity invariant. `None` means no
    /// crane, no fitting container, or no room on board this hour.
    pub fn load_one_container(&mut self, ship_id: ShipId, now: Hours) -> Option<ContainerId> {
        let crane = self.free_crane()?;
        let ship = self.ships.get(ship_id)?;
        let size = [ContainerSize::Small, ContainerSize::Medium, ContainerSize::Large]
            .into_iter()
            .find(|&s| self.storage.stored_count(s) > 0 && ship.can_take(s))?;

        let container_id = self.storage.retrieve(size)?;
        let _ = self.cranes[crane].load_container(container_id);
        let from_crane = self.cranes[crane].unload_container();
        debug_assert_eq!(from_crane, Some(container_id));

        if self.ships[ship_id].add_container(container_id, size).is_err() {
            // can_take was checked above; put the container back untouched.
            self.storage.store(size, container_id);
            return None;
        }
        self.containers[container_id].relocate(Location::Ship(ship_id), now, Status::Transit);
        Some(container_id)
    }

    /// Seat one queued truck at a loading-dock spot, load it from storage,
    /// and send it off. Returns the (truck, container) pair, or `None` when
    /// the queue, the spots, or the yard are exhausted this hour.
    pub fn dispatch_truck_from_storage(&mut self, now: Hours) -> Option<(TruckId, ContainerId)> {
        if self.truck_queue.is_empty() {
            return None;
        }
        let size = [ContainerSize::Small, ContainerSize::Medium, ContainerSize::Large]
            .into_iter()
            .find(|&s| self.storage.stored_count(s) > 0)?;

        // A free truck spot at any loading dock gates throughput.
        let truck = self.truck_queue[0];
        let dock = self
            .docks
            .dock_ids()
            .into_iter()
            .find(|&d| self.docks.claim_truck_spot(d, truck).is_some())?;

        let Some(container_id) = self.storage.retrieve(size) else {
            self.docks.release_truck_spot(dock, truck);
            return None;
        };
        self.truck_queue.remove(0);
        let loaded = self.load_truck(truck, container_id);
        debug_assert_eq!(loaded, Ok(()));

        // Loaded: leave the spot and the harbor in the same hour.
        self.docks.release_truck_spot(dock, truck);
        self.trucks[truck].location = Location::TruckTransit;
        self.trucks_in_transit.push((truck, now));
        self.containers[container_id].relocate(Location::Truck(truck), now, Status::Transit);

        Some((truck, container_id))
    }

    /// Deliver every truck whose transit time has elapsed. The container is
    /// recorded `ArrivedAtDestination` and moved to the arrived collection;
    /// the truck is retired from the active pool.
    pub fn deliver_due_trucks(&mut self, now: Hours) -> Vec<ContainerId> {
        let transit_hours = self.config.truck_transit_hours;
        let due: Vec<(TruckId, Hours)> = self
            .trucks_in_transit
            .iter()
            .copied()
            .filter(|&(_, departed)| now >= departed + transit_hours)
            .collect();

        let mut delivered = Vec::new();
        for (truck, _) in due {
            self.trucks_in_transit.retain(|&(t, _)| t != truck);
            let Some(container_id) = self.trucks.get_mut(truck).and_then(Carrier::unload_container)
            else {
                continue;
            };
            self.trucks.remove(truck);
            self.containers[container_id].relocate(
                Location::Destination,
                now,
                Status::ArrivedAtDestination,
            );
            self.arrived.push(container_id);
            delivered.push(container_id);
        }
        delivered
    }
}

// ===========================================================================
// Tests
// ===========================================================================
