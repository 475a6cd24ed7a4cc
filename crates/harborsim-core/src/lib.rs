//! Harborsim Core -- a discrete-event simulation of a container harbor.
//!
//! Ships arrive, queue at anchorage, dock, unload and load containers via
//! cranes, AGVs and trucks, and depart, all on a shared simulated clock that
//! advances one hour at a time. This crate is the scheduler and the
//! per-entity state machines; report formatting and demo harnesses live
//! outside it and consume the event bus and snapshot history.
//!
//! # Hourly Phase Pipeline
//!
//! Each hour, [`scheduler::Simulation`] runs the following phases in order:
//!
//! 1. **Undock** -- ships done loading leave their dock (freeing it for
//!    ships docking this same hour); single-trip ships route to a ship dock.
//! 2. **Anchor** -- ships that just arrived finish anchoring.
//! 3. **Dock** -- anchored ships claim a free loading dock of their size.
//! 4. **Unload** -- docked ships move containers ashore, one at a time,
//!    through the ship -> crane -> AGV/truck pipeline.
//! 5. **Load** -- recurring ships take containers back on board.
//! 6. **Truck load** -- queued trucks pick up containers from storage.
//! 7. **Arrival** -- trucks that reached their destination deliver.
//! 8. **Transit** -- ships at sea whose round trip has elapsed re-anchor.
//!
//! A per-entity "altered this hour" flag guarantees at most one state
//! transition per ship per hour regardless of phase order.
//!
//! # Key Types
//!
//! - [`scheduler::Simulation`] -- the run loop and phase orchestrator.
//! - [`harbor::Harbor`] -- owns every pool and registry; all resource
//!   mutation goes through its checked, all-or-nothing operations.
//! - [`ship::Ship`] -- the one complex state machine; see [`status::Status`]
//!   for the full transition vocabulary.
//! - [`carrier::Carrier`] -- the two-state Truck/AGV/Crane carrier.
//! - [`event::EventBus`] -- ring-buffered, synchronously delivered typed
//!   events; the boundary reporting collaborators subscribe to.
//! - [`snapshot::DailyLog`] -- the deep-copied end-of-day audit snapshot.

pub mod carrier;
pub mod container;
pub mod dock;
pub mod error;
pub mod event;
pub mod harbor;
pub mod id;
pub mod rng;
pub mod scheduler;
pub mod ship;
pub mod snapshot;
pub mod status;
pub mod storage;
pub mod time;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
