use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a ship in the harbor registry.
    pub struct ShipId;

    /// Identifies a container, whether on board, ashore, or delivered.
    pub struct ContainerId;

    /// Identifies a truck in the active truck pool.
    pub struct TruckId;

    /// Identifies an AGV (automated guided vehicle) in the harbor.
    pub struct AgvId;

    /// Identifies a crane serving the loading docks.
    pub struct CraneId;

    /// Identifies a dock (loading dock or ship dock).
    pub struct DockId;
}

/// Where an entity currently is. Every ship and container carries exactly
/// one `Location` at all times; status history records capture it alongside
/// each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    /// Waiting area for ships before a dock is available.
    Anchorage,
    /// At sea (ships) or away on a truck (containers).
    Transit,
    /// Occupying or moored at a specific dock.
    Dock(DockId),
    /// In the harbor storage area.
    Storage,
    /// On board a ship.
    Ship(ShipId),
    /// Held by a crane mid-move.
    Crane(CraneId),
    /// Held by an AGV between crane and storage.
    Agv(AgvId),
    /// Loaded on a truck.
    Truck(TruckId),
    /// Trucks waiting to be assigned a loading spot.
    TruckQueue,
    /// Trucks en route to the final destination.
    TruckTransit,
    /// Delivered; the container's terminal location.
    Destination,
}
