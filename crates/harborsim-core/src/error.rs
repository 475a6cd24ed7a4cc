//! Error taxonomy for the harbor core.
//!
//! Three families, matching how failures propagate:
//!
//! - [`ConstructionError`] -- invalid build parameters. Fatal; the
//!   simulation must not start.
//! - [`CarrierError`] -- misuse of a truck/AGV/crane. Raised at the call
//!   site, never silently swallowed.
//! - [`LookupError`] -- unknown ids on the public history surfaces, which
//!   contract to error rather than return empty.
//!
//! Resource exhaustion (no free dock, crane, slot, truck this hour) is *not*
//! an error anywhere in this crate: pool operations return `Option`/`bool`
//! and phase code retries next hour.

use crate::id::{ContainerId, ShipId};

/// Invalid construction parameters. Raised while building a ship or harbor;
/// a simulation is never started over a harbor that failed construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("ship '{name}' holds {count} containers but capacity is {capacity}")]
    CargoOverCapacity {
        name: String,
        count: usize,
        capacity: usize,
    },

    #[error("ship '{name}' weighs {weight} tonnes, exceeding its max of {max_weight}")]
    WeightExceeded {
        name: String,
        weight: u32,
        max_weight: u32,
    },

    #[error("round trip of 0 days is not schedulable for recurring ship '{name}'")]
    ZeroRoundTrip { name: String },
}

/// Misuse of a single-container carrier (truck, AGV or crane).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CarrierError {
    #[error("carrier is already holding a container and can't be loaded")]
    AlreadyLoaded,

    #[error("carrier does not exist in the active pool and can't be loaded")]
    NotFound,
}

/// Unknown id passed to a public history surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("ship not found: {0:?}")]
    ShipNotFound(ShipId),

    #[error("container not found: {0:?}")]
    ContainerNotFound(ContainerId),
}
