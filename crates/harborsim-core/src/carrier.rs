//! The two-state carrier shared by trucks, AGVs and cranes.
//!
//! A carrier is either empty or holding exactly one container; it owns the
//! container exclusively while loaded, and releasing transfers ownership to
//! the destination. Loading an occupied carrier is misuse and errors;
//! unloading an empty one is an ordinary "nothing there" and returns `None`.

use crate::error::CarrierError;
use crate::id::{ContainerId, Location};
use serde::{Deserialize, Serialize};

/// Truck, AGV or crane state. Which pool a carrier lives in determines its
/// role; the state machine is identical for all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    pub location: Location,
    held: Option<ContainerId>,
}

impl Carrier {
    /// Create an empty carrier at the given location.
    pub fn new(location: Location) -> Self {
        Self {
            location,
            held: None,
        }
    }

    /// The container currently held, if any.
    pub fn held(&self) -> Option<ContainerId> {
        self.held
    }

    /// Whether the carrier is free to take a container.
    pub fn is_empty(&self) -> bool {
        self.held.is_none()
    }

    /// Load one container. Errors if already carrying one.
    pub fn load_container(&mut self, container: ContainerId) -> Result<(), CarrierError> {
        if self.held.is_some() {
            return Err(CarrierError::AlreadyLoaded);
        }
        self.held = Some(container);
        Ok(())
    }

    /// Release the held container, clearing the carrier. Returns `None`
    /// when empty; that is not an error.
    pub fn unload_container(&mut self) -> Option<ContainerId> {
        self.held.take()
    }
}
