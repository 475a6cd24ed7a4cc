//! The run loop: a cooperative, single-threaded scheduler advancing the
//! whole harbor one hour at a time.
//!
//! Each tick runs a fixed phase pipeline (see the crate docs). Phases visit
//! ships in registration order and skip any ship already altered this hour,
//! so a ship makes at most one state transition per tick no matter how many
//! phases could apply to it. Undocking runs first so a dock freed this hour
//! is claimable by another ship in the same hour's dock phase.
//!
//! Resource exhaustion is never an error here: a phase that cannot get a
//! dock, crane, AGV, truck or storage slot simply leaves the ship where it
//! is and tries again next tick.

use crate::dock::DockKind;
use crate::event::{Event, EventBus};
use crate::harbor::{Harbor, UnloadDestination};
use crate::id::{Location, ShipId};
use crate::rng::SimRng;
use crate::ship::{Ship, ShipSize};
use crate::snapshot::{DailyLog, SimulationHistory};
use crate::status::Status;
use crate::time::{Hours, SimClock, HOURS_PER_DAY};

/// One simulation run: the harbor, the clock, the routing RNG and the event
/// bus, driven from `start_hour` until `end_hour`.
#[derive(Debug)]
pub struct Simulation {
    harbor: Harbor,
    clock: SimClock,
    end_hour: Hours,
    rng: SimRng,
    bus: EventBus,
    history: SimulationHistory,
}

impl Simulation {
    /// Set up a run over the given harbor. The routing RNG is seeded from
    /// the harbor's config, so identical inputs give identical runs.
    pub fn new(harbor: Harbor, start_hour: Hours, end_hour: Hours) -> Self {
        let rng = SimRng::new(harbor.config().rng_seed);
        Self {
            harbor,
            clock: SimClock::starting_at(start_hour),
            end_hour,
            rng,
            bus: EventBus::default(),
            history: SimulationHistory::new(),
        }
    }

    pub fn harbor(&self) -> &Harbor {
        &self.harbor
    }

    /// The event bus, for registering listeners or suppressing kinds before
    /// (or between) ticks.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn history(&self) -> &SimulationHistory {
        &self.history
    }

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    /// Run to `end_hour`. Captures the starting snapshot, ticks hour by
    /// hour, and returns the accumulated daily history.
    pub fn run(&mut self) -> &SimulationHistory {
        self.bus.emit(Event::SimulationStarting {
            hour: self.clock.now(),
        });
        self.history
            .push(DailyLog::capture(&self.harbor, self.clock.day(), self.clock.now()));
        self.bus.deliver();

        while self.clock.now() < self.end_hour {
            self.tick();
        }

        self.bus.emit(Event::SimulationEnded {
            hour: self.clock.now(),
        });
        self.bus.deliver();
        &self.history
    }

    /// Advance the simulation by exactly one hour: run every phase, emit the
    /// hourly (and, on a day boundary, daily) events, deliver the batch.
    pub fn tick(&mut self) {
        let now = self.clock.now();

        for id in self.harbor.ship_ids() {
            if let Some(ship) = self.harbor.ship_mut(id) {
                ship.reset_altered();
            }
        }
        let queue_cap = self.harbor.truck_queue_capacity();
        for _ in 0..self.harbor.config().trucks_per_hour {
            if self.harbor.queued_truck_count() >= queue_cap {
                break;
            }
            self.harbor.spawn_truck();
        }

        self.undock_phase(now);
        self.anchor_phase(now);
        self.dock_phase(now);
        self.unload_phase(now);
        self.load_phase(now);
        self.truck_phase(now);
        self.arrival_phase(now);
        self.transit_phase(now);

        self.bus.emit(Event::HourPassed { hour: now });
        self.clock.tick();

        if self.clock.hour_of_day() == 0 {
            let day = self.clock.day();
            self.bus.emit(Event::DayEnded {
                day: day - 1,
                hour: self.clock.now(),
            });
            self.history
                .push(DailyLog::capture(&self.harbor, day, self.clock.now()));
        }
        self.bus.deliver();
    }

    // -----------------------------------------------------------------------
    // Phases
    // -----------------------------------------------------------------------

    /// Ships done loading start undocking; ships that have been undocking
    /// for an hour release their dock and put to sea.
    fn undock_phase(&mut self, now: Hours) {
        for id in self.harbor.ship_ids() {
            let Some(view) = self.ship_view(id) else { continue };
            match view.status {
                Status::LoadingDone => {
                    if let Some(ship) = self.harbor.ship_mut(id) {
                        ship.transition(view.location, now, Status::Undocking);
                    }
                    self.bus.emit(Event::ShipUndocking { ship: id, hour: now });
                }
                Status::Undocking if view.hours_in_status >= 1 => {
                    self.harbor.release_dock_of(id);
                    if let Some(ship) = self.harbor.ship_mut(id) {
                        ship.transition(Location::Transit, now, Status::Transit);
                        ship.departed_at = Some(now);
                    }
                    self.bus.emit(Event::ShipInTransit { ship: id, hour: now });
                }
                _ => {}
            }
        }
    }

    /// New ships enter the anchorage; ships finish the one-hour anchoring
    /// maneuver.
    fn anchor_phase(&mut self, now: Hours) {
        for id in self.harbor.ship_ids() {
            let Some(view) = self.ship_view(id) else { continue };
            match view.status {
                Status::None if now >= view.start_hour => {
                    if let Some(ship) = self.harbor.ship_mut(id) {
                        ship.transition(Location::Anchorage, now, Status::Anchoring);
                    }
                    self.bus.emit(Event::ShipAnchoring { ship: id, hour: now });
                }
                Status::Anchoring if view.hours_in_status >= 1 => {
                    if let Some(ship) = self.harbor.ship_mut(id) {
                        ship.transition(Location::Anchorage, now, Status::Anchored);
                    }
                    self.bus.emit(Event::ShipAnchored { ship: id, hour: now });
                }
                _ => {}
            }
        }
    }

    /// Anchored ships claim docks; docking ships that have served their
    /// size's docking time become docked.
    fn dock_phase(&mut self, now: Hours) {
        for id in self.harbor.ship_ids() {
            let Some(view) = self.ship_view(id) else { continue };
            match view.status {
                Status::Anchored => {
                    // An empty single-trip ship has nothing to unload and
                    // heads straight for a long-term berth.
                    if view.single_trip && view.cargo_empty {
                        if let Some(dock) = self.harbor.claim_dock(DockKind::Ship, id) {
                            if let Some(ship) = self.harbor.ship_mut(id) {
                                ship.transition(
                                    Location::Dock(dock),
                                    now,
                                    Status::DockingToShipDock,
                                );
                            }
                            self.bus.emit(Event::ShipDockingToShipDock {
                                ship: id,
                                dock,
                                hour: now,
                            });
                        }
                    } else if let Some(dock) = self.harbor.claim_dock(DockKind::Loading, id) {
                        if let Some(ship) = self.harbor.ship_mut(id) {
                            ship.transition(
                                Location::Dock(dock),
                                now,
                                Status::DockingToLoadingDock,
                            );
                        }
                        self.bus.emit(Event::ShipDockingToLoadingDock {
                            ship: id,
                            dock,
                            hour: now,
                        });
                    }
                }
                Status::DockingToLoadingDock
                    if view.hours_in_status >= view.size_docking_hours =>
                {
                    if let (Location::Dock(dock), Some(ship)) =
                        (view.location, self.harbor.ship_mut(id))
                    {
                        ship.transition(view.location, now, Status::DockedToLoadingDock);
                        self.bus.emit(Event::ShipDockedToLoadingDock {
                            ship: id,
                            dock,
                            hour: now,
                        });
                    }
                }
                Status::DockingToShipDock
                    if view.hours_in_status >= view.size_berthing_hours =>
                {
                    if let (Location::Dock(dock), Some(ship)) =
                        (view.location, self.harbor.ship_mut(id))
                    {
                        // Terminal: nothing moves a berthed single-trip ship
                        // again.
                        ship.transition(view.location, now, Status::DockedToShipDock);
                        self.bus.emit(Event::ShipDockedToShipDock {
                            ship: id,
                            dock,
                            hour: now,
                        });
                    }
                }
                Status::UnloadingDone if view.single_trip => {
                    // Swap the loading dock for a long-term berth, but only
                    // once a berth is actually free.
                    let berth_free = self
                        .harbor
                        .docks()
                        .find_free(DockKind::Ship, view.size)
                        .is_some();
                    if berth_free {
                        self.harbor.release_dock_of(id);
                        if let Some(dock) = self.harbor.claim_dock(DockKind::Ship, id) {
                            if let Some(ship) = self.harbor.ship_mut(id) {
                                ship.transition(
                                    Location::Dock(dock),
                                    now,
                                    Status::DockingToShipDock,
                                );
                            }
                            self.bus.emit(Event::ShipDockingToShipDock {
                                ship: id,
                                dock,
                                hour: now,
                            });
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Docked ships move containers ashore, up to their hourly rate.
    fn unload_phase(&mut self, now: Hours) {
        for id in self.harbor.ship_ids() {
            let Some(view) = self.ship_view(id) else { continue };
            match view.status {
                Status::DockedToLoadingDock => {
                    if view.cargo_empty {
                        if let Some(ship) = self.harbor.ship_mut(id) {
                            ship.transition(view.location, now, Status::UnloadingDone);
                        }
                        self.bus.emit(Event::ShipUnloadingDone { ship: id, hour: now });
                    } else {
                        if let Some(ship) = self.harbor.ship_mut(id) {
                            ship.transition(view.location, now, Status::Unloading);
                        }
                        self.bus.emit(Event::ShipStartedUnloading { ship: id, hour: now });
                        self.unload_containers(id, now);
                    }
                }
                Status::Unloading => {
                    self.unload_containers(id, now);
                    let emptied = self
                        .harbor
                        .ship(id)
                        .is_some_and(|s| s.cargo.is_empty());
                    if emptied {
                        if let Some(ship) = self.harbor.ship_mut(id) {
                            ship.transition(view.location, now, Status::UnloadingDone);
                        }
                        self.bus.emit(Event::ShipUnloadingDone { ship: id, hour: now });
                    }
                }
                _ => {}
            }
        }
    }

    /// Move up to the ship's hourly rate of containers ashore, routing each
    /// by the configured direct-delivery percentage.
    fn unload_containers(&mut self, id: ShipId, now: Hours) {
        let Some(ship) = self.harbor.ship(id) else { return };
        let rate = ship.size.hourly_loading_rate();
        let percent = self.harbor.config().direct_delivery_percent;

        let mut moved = 0;
        for _ in 0..rate {
            let prefer_truck = self.rng.percent(percent);
            let Some(mv) = self.harbor.unload_one_container(id, now, prefer_truck) else {
                break;
            };
            moved += 1;
            self.bus.emit(Event::ContainerUnloaded {
                container: mv.container,
                ship: id,
                hour: now,
            });
            if let UnloadDestination::Truck(truck) = mv.destination {
                self.bus.emit(Event::TruckDeparted {
                    truck,
                    container: mv.container,
                    hour: now,
                });
            }
        }
        if moved > 0 {
            if let Some(ship) = self.harbor.ship_mut(id) {
                ship.mark_altered();
            }
        }
    }

    /// Recurring ships take containers from storage back on board.
    fn load_phase(&mut self, now: Hours) {
        for id in self.harbor.ship_ids() {
            let Some(view) = self.ship_view(id) else { continue };
            match view.status {
                Status::UnloadingDone if !view.single_trip => {
                    if let Some(ship) = self.harbor.ship_mut(id) {
                        ship.transition(view.location, now, Status::Loading);
                    }
                    self.bus.emit(Event::ShipStartedLoading { ship: id, hour: now });
                    self.load_containers(id, now);
                }
                Status::Loading => {
                    let moved = self.load_containers(id, now);
                    if moved == 0 {
                        // Full, or the yard has nothing this ship can take.
                        if let Some(ship) = self.harbor.ship_mut(id) {
                            ship.transition(view.location, now, Status::LoadingDone);
                        }
                        self.bus.emit(Event::ShipLoadingDone { ship: id, hour: now });
                    }
                }
                _ => {}
            }
        }
    }

    fn load_containers(&mut self, id: ShipId, now: Hours) -> usize {
        let Some(ship) = self.harbor.ship(id) else { return 0 };
        let rate = ship.size.hourly_loading_rate();

        let mut moved = 0;
        for _ in 0..rate {
            let Some(container) = self.harbor.load_one_container(id, now) else {
                break;
            };
            moved += 1;
            self.bus.emit(Event::ContainerLoaded {
                container,
                ship: id,
                hour: now,
            });
        }
        if moved > 0 {
            if let Some(ship) = self.harbor.ship_mut(id) {
                ship.mark_altered();
            }
        }
        moved
    }

    /// Queued trucks pick up stored containers and depart, as many as the
    /// queue, the truck spots and the yard allow this hour.
    fn truck_phase(&mut self, now: Hours) {
        while let Some((truck, container)) = self.harbor.dispatch_truck_from_storage(now) {
            self.bus.emit(Event::TruckDeparted {
                truck,
                container,
                hour: now,
            });
        }
    }

    /// Trucks whose road time has elapsed deliver their container.
    fn arrival_phase(&mut self, now: Hours) {
        for container in self.harbor.deliver_due_trucks(now) {
            self.bus.emit(Event::ContainerArrived { container, hour: now });
        }
    }

    /// Ships at sea whose round trip has elapsed come back to the anchorage.
    fn transit_phase(&mut self, now: Hours) {
        for id in self.harbor.ship_ids() {
            let Some(view) = self.ship_view(id) else { continue };
            if view.status != Status::Transit {
                continue;
            }
            let Some(departed) = view.departed_at else { continue };
            if now >= departed + view.round_trip_days * HOURS_PER_DAY {
                if let Some(ship) = self.harbor.ship_mut(id) {
                    ship.transition(Location::Anchorage, now, Status::Anchoring);
                    ship.departed_at = None;
                }
                self.bus.emit(Event::ShipAnchoring { ship: id, hour: now });
            }
        }
    }

    /// Copy out the fields a phase needs, skipping ships already altered
    /// this hour. Keeps phase bodies free of long-lived borrows.
    fn ship_view(&self, id: ShipId) -> Option<ShipView> {
        let ship: &Ship = self.harbor.ship(id)?;
        if ship.altered_this_hour() {
            return None;
        }
        Some(ShipView {
            status: ship.status(),
            location: ship.location,
            size: ship.size,
            start_hour: ship.start_hour,
            round_trip_days: ship.round_trip_days,
            departed_at: ship.departed_at,
            single_trip: ship.single_trip,
            cargo_empty: ship.cargo.is_empty(),
            hours_in_status: ship.hours_in_status(self.clock.now()),
            size_docking_hours: ship.size.base_docking_hours(),
            size_berthing_hours: ship.size.base_berthing_hours(),
        })
    }
}

/// Plain copies of the ship fields the phase functions branch on.
struct ShipView {
    status: Status,
    location: Location,
    size: ShipSize,
    start_hour: Hours,
    round_trip_days: Hours,
    departed_at: Option<Hours>,
    single_trip: bool,
    cargo_empty: bool,
    hours_in_status: Hours,
    size_docking_hours: Hours,
    size_berthing_hours: Hours,
}

// ===========================================================================
// Tests
// ===========================================================================
