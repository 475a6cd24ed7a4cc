//! Containers: the cargo moved between ships, storage and trucks.

use crate::id::Location;
use crate::status::{HistoryLog, Status};
use crate::time::Hours;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ContainerSize
// ---------------------------------------------------------------------------

/// Container size class. Each size fixes the container's weight; Small
/// containers are half-size and can double up in a storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerSize {
    Small,
    Medium,
    Large,
}

impl ContainerSize {
    /// Weight in tonnes, fixed per size class.
    pub fn weight_tonnes(self) -> u32 {
        match self {
            ContainerSize::Small => 10,
            ContainerSize::Medium => 20,
            ContainerSize::Large => 30,
        }
    }

    /// How many containers of this size fit in one storage slot.
    /// Small containers are half-size and double up.
    pub fn per_storage_slot(self) -> usize {
        match self {
            ContainerSize::Small => 2,
            ContainerSize::Medium | ContainerSize::Large => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// A single container. Created either pre-loaded onto a ship at harbor
/// construction or synthesized when unloaded into storage; retired to the
/// harbor's arrived collection once a truck delivers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub size: ContainerSize,
    pub location: Location,
    pub history: HistoryLog,
}

impl Container {
    /// Create a container at the given location with an initial history entry.
    pub fn new(size: ContainerSize, location: Location, now: Hours, status: Status) -> Self {
        let mut history = HistoryLog::new();
        history.record(location, now, status);
        Self {
            size,
            location,
            history,
        }
    }

    /// Move the container and append the matching history record.
    pub fn relocate(&mut self, location: Location, now: Hours, status: Status) {
        self.location = location;
        self.history.record(location, now, status);
    }

    /// The container's current status (last history entry).
    pub fn status(&self) -> Status {
        self.history.current()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
