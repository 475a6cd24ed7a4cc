//! Typed event system with pre-allocated ring buffers.
//!
//! Every ship transition and container move emits exactly one event.
//! Events are buffered as phases run and delivered in batch at the end of
//! the hour, synchronously, in emission order within each kind. Listeners
//! receive `&Event` only -- they cannot reach back into the harbor, so a
//! misbehaving reporting collaborator cannot corrupt scheduler state.
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventBus::suppress`], which prevents
//! any allocation or recording for that kind. Suppressed events have zero
//! cost; a headless batch run typically suppresses `HourPassed`.

use crate::id::{ContainerId, DockId, ShipId, TruckId};
use crate::time::Hours;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A harbor event. All events carry the simulated hour they occurred at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // -- Ship transitions --
    ShipAnchoring { ship: ShipId, hour: Hours },
    ShipAnchored { ship: ShipId, hour: Hours },
    ShipDockingToLoadingDock { ship: ShipId, dock: DockId, hour: Hours },
    ShipDockedToLoadingDock { ship: ShipId, dock: DockId, hour: Hours },
    ShipStartedUnloading { ship: ShipId, hour: Hours },
    ShipUnloadingDone { ship: ShipId, hour: Hours },
    ShipStartedLoading { ship: ShipId, hour: Hours },
    ShipLoadingDone { ship: ShipId, hour: Hours },
    ShipUndocking { ship: ShipId, hour: Hours },
    ShipInTransit { ship: ShipId, hour: Hours },
    ShipDockingToShipDock { ship: ShipId, dock: DockId, hour: Hours },
    ShipDockedToShipDock { ship: ShipId, dock: DockId, hour: Hours },

    // -- Container moves --
    ContainerUnloaded { container: ContainerId, ship: ShipId, hour: Hours },
    ContainerLoaded { container: ContainerId, ship: ShipId, hour: Hours },
    TruckDeparted { truck: TruckId, container: ContainerId, hour: Hours },
    ContainerArrived { container: ContainerId, hour: Hours },

    // -- Simulation lifecycle --
    SimulationStarting { hour: Hours },
    HourPassed { hour: Hours },
    DayEnded { day: Hours, hour: Hours },
    SimulationEnded { hour: Hours },
}

/// Discriminant tag for event types, used for suppression and subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ShipAnchoring,
    ShipAnchored,
    ShipDockingToLoadingDock,
    ShipDockedToLoadingDock,
    ShipStartedUnloading,
    ShipUnloadingDone,
    ShipStartedLoading,
    ShipLoadingDone,
    ShipUndocking,
    ShipInTransit,
    ShipDockingToShipDock,
    ShipDockedToShipDock,
    ContainerUnloaded,
    ContainerLoaded,
    TruckDeparted,
    ContainerArrived,
    SimulationStarting,
    HourPassed,
    DayEnded,
    SimulationEnded,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 20;

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ShipAnchoring { .. } => EventKind::ShipAnchoring,
            Event::ShipAnchored { .. } => EventKind::ShipAnchored,
            Event::ShipDockingToLoadingDock { .. } => EventKind::ShipDockingToLoadingDock,
            Event::ShipDockedToLoadingDock { .. } => EventKind::ShipDockedToLoadingDock,
            Event::ShipStartedUnloading { .. } => EventKind::ShipStartedUnloading,
            Event::ShipUnloadingDone { .. } => EventKind::ShipUnloadingDone,
            Event::ShipStartedLoading { .. } => EventKind::ShipStartedLoading,
            Event::ShipLoadingDone { .. } => EventKind::ShipLoadingDone,
            Event::ShipUndocking { .. } => EventKind::ShipUndocking,
            Event::ShipInTransit { .. } => EventKind::ShipInTransit,
            Event::ShipDockingToShipDock { .. } => EventKind::ShipDockingToShipDock,
            Event::ShipDockedToShipDock { .. } => EventKind::ShipDockedToShipDock,
            Event::ContainerUnloaded { .. } => EventKind::ContainerUnloaded,
            Event::ContainerLoaded { .. } => EventKind::ContainerLoaded,
            Event::TruckDeparted { .. } => EventKind::TruckDeparted,
            Event::ContainerArrived { .. } => EventKind::ContainerArrived,
            Event::SimulationStarting { .. } => EventKind::SimulationStarting,
            Event::HourPassed { .. } => EventKind::HourPassed,
            Event::DayEnded { .. } => EventKind::DayEnded,
            Event::SimulationEnded { .. } => EventKind::SimulationEnded,
        }
    }

    /// The simulated hour the event occurred at.
    pub fn hour(&self) -> Hours {
        match *self {
            Event::ShipAnchoring { hour, .. }
            | Event::ShipAnchored { hour, .. }
            | Event::ShipDockingToLoadingDock { hour, .. }
            | Event::ShipDockedToLoadingDock { hour, .. }
            | Event::ShipStartedUnloading { hour, .. }
            | Event::ShipUnloadingDone { hour, .. }
            | Event::ShipStartedLoading { hour, .. }
            | Event::ShipLoadingDone { hour, .. }
            | Event::ShipUndocking { hour, .. }
            | Event::ShipInTransit { hour, .. }
            | Event::ShipDockingToShipDock { hour, .. }
            | Event::ShipDockedToShipDock { hour, .. }
            | Event::ContainerUnloaded { hour, .. }
            | Event::ContainerLoaded { hour, .. }
            | Event::TruckDeparted { hour, .. }
            | Event::ContainerArrived { hour, .. }
            | Event::SimulationStarting { hour }
            | Event::HourPassed { hour }
            | Event::DayEnded { hour, .. }
            | Event::SimulationEnded { hour } => hour,
        }
    }
}

impl std::fmt::Display for Event {
    /// Human-readable description for reporting collaborators.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::ShipAnchoring { ship, hour } => {
                write!(f, "hour {hour}: ship {ship:?} is anchoring")
            }
            Event::ShipAnchored { ship, hour } => {
                write!(f, "hour {hour}: ship {ship:?} anchored")
            }
            Event::ShipDockingToLoadingDock { ship, dock, hour } => {
                write!(f, "hour {hour}: ship {ship:?} docking to loading dock {dock:?}")
            }
            Event::ShipDockedToLoadingDock { ship, dock, hour } => {
                write!(f, "hour {hour}: ship {ship:?} docked to loading dock {dock:?}")
            }
            Event::ShipStartedUnloading { ship, hour } => {
                write!(f, "hour {hour}: ship {ship:?} started unloading")
            }
            Event::ShipUnloadingDone { ship, hour } => {
                write!(f, "hour {hour}: ship {ship:?} finished unloading")
            }
            Event::ShipStartedLoading { ship, hour } => {
                write!(f, "hour {hour}: ship {ship:?} started loading")
            }
            Event::ShipLoadingDone { ship, hour } => {
                write!(f, "hour {hour}: ship {ship:?} finished loading")
            }
            Event::ShipUndocking { ship, hour } => {
                write!(f, "hour {hour}: ship {ship:?} is undocking")
            }
            Event::ShipInTransit { ship, hour } => {
                write!(f, "hour {hour}: ship {ship:?} departed for sea")
            }
            Event::ShipDockingToShipDock { ship, dock, hour } => {
                write!(f, "hour {hour}: ship {ship:?} docking to ship dock {dock:?}")
            }
            Event::ShipDockedToShipDock { ship, dock, hour } => {
                write!(f, "hour {hour}: ship {ship:?} berthed at ship dock {dock:?}")
            }
            Event::ContainerUnloaded { container, ship, hour } => {
                write!(f, "hour {hour}: container {container:?} unloaded from ship {ship:?}")
            }
            Event::ContainerLoaded { container, ship, hour } => {
                write!(f, "hour {hour}: container {container:?} loaded onto ship {ship:?}")
            }
            Event::TruckDeparted { truck, container, hour } => {
                write!(f, "hour {hour}: truck {truck:?} departed with container {container:?}")
            }
            Event::ContainerArrived { container, hour } => {
                write!(f, "hour {hour}: container {container:?} arrived at its destination")
            }
            Event::SimulationStarting { hour } => {
                write!(f, "hour {hour}: simulation starting")
            }
            Event::HourPassed { hour } => write!(f, "hour {hour}: one hour has passed"),
            Event::DayEnded { day, hour } => write!(f, "hour {hour}: day {day} ended"),
            Event::SimulationEnded { hour } => write!(f, "hour {hour}: simulation ended"),
        }
    }
}

impl EventKind {
    /// Convert to usize index for array lookups.
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer — pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer for events. Fixed capacity; when full, the
/// oldest events are dropped.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<Event>>,
    /// Write position (wraps around).
    head: usize,
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
}

impl EventBuffer {
    /// Create a new ring buffer with the given capacity.
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Push an event. If full, the oldest event is dropped.
    pub fn push(&mut self, event: Event) {
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total events written since creation (including dropped).
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Iterate over events in order from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        let start = if self.len < self.capacity() {
            0
        } else {
            // head points to the next write position, which is the oldest entry
            self.head
        };
        (0..self.len).filter_map(move |i| self.events[(start + i) % self.capacity()].as_ref())
    }

    /// Clear all events from the buffer.
    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// A listener receives events read-only.
pub type Listener = Box<dyn FnMut(&Event)>;

/// Priority level for listeners. Lower priorities run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerPriority {
    Pre = 0,
    Normal = 1,
    Post = 2,
}

struct ListenerEntry {
    listener: Listener,
    priority: ListenerPriority,
    insertion_order: u64,
}

impl std::fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("listener", &"<fn>")
            .field("priority", &self.priority)
            .field("insertion_order", &self.insertion_order)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// The central event bus. Holds one ring buffer per event kind, listener
/// lists, and suppression flags.
pub struct EventBus {
    /// One ring buffer per event kind, allocated lazily on first emit.
    buffers: [Option<EventBuffer>; EVENT_KIND_COUNT],
    suppressed: [bool; EVENT_KIND_COUNT],
    /// Listeners indexed by event kind.
    listeners: [Vec<ListenerEntry>; EVENT_KIND_COUNT],
    default_capacity: usize,
    /// Monotonically increasing counter for stable sort ordering.
    next_insertion_order: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("buffers", &self.buffers)
            .field("suppressed", &self.suppressed)
            .field("default_capacity", &self.default_capacity)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    /// Create a new event bus with the given default buffer capacity per kind.
    pub fn new(default_capacity: usize) -> Self {
        Self {
            buffers: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            listeners: std::array::from_fn(|_| Vec::new()),
            default_capacity,
            next_insertion_order: 0,
        }
    }

    /// Suppress an event kind. Suppressed events are never allocated or buffered.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.buffers[kind.index()] = None;
    }

    /// Check if an event kind is suppressed.
    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Emit an event into its ring buffer. No-op if the kind is suppressed.
    pub fn emit(&mut self, event: Event) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        let buffer = self.buffers[idx].get_or_insert_with(|| EventBuffer::new(self.default_capacity));
        buffer.push(event);
    }

    /// Register a listener for an event kind with Normal priority.
    pub fn on(&mut self, kind: EventKind, listener: Listener) {
        self.on_with_priority(kind, ListenerPriority::Normal, listener);
    }

    /// Register a listener with an explicit priority.
    pub fn on_with_priority(
        &mut self,
        kind: EventKind,
        priority: ListenerPriority,
        listener: Listener,
    ) {
        let order = self.next_insertion_order;
        self.next_insertion_order += 1;
        self.listeners[kind.index()].push(ListenerEntry {
            listener,
            priority,
            insertion_order: order,
        });
    }

    /// Deliver all buffered events to listeners and clear the buffers.
    ///
    /// For each event kind with buffered events, listeners are sorted by
    /// `(priority, insertion_order)` and called for every event, oldest to
    /// newest. Delivery is synchronous; the scheduler calls this once at the
    /// end of every hour.
    ///
    /// Ordering is per kind, not global: buffers drain in a fixed kind
    /// order, so a listener registered on several kinds sees each kind's
    /// events in emission order but may see kinds out of their interleaved
    /// emission order within the hour.
    pub fn deliver(&mut self) {
        for idx in 0..EVENT_KIND_COUNT {
            if self.suppressed[idx] {
                continue;
            }
            let Some(buffer) = self.buffers[idx].as_ref() else {
                continue;
            };
            if buffer.is_empty() {
                continue;
            }

            // Collect into a temporary Vec to avoid borrow conflicts between
            // the buffer and the listeners.
            let events: Vec<Event> = buffer.iter().copied().collect();

            self.listeners[idx].sort_by_key(|e| (e.priority as u8, e.insertion_order));
            for entry in &mut self.listeners[idx] {
                for event in &events {
                    (entry.listener)(event);
                }
            }

            if let Some(buffer) = self.buffers[idx].as_mut() {
                buffer.clear();
            }
        }
    }

    /// Events currently buffered for a kind.
    pub fn buffered_count(&self, kind: EventKind) -> usize {
        self.buffers[kind.index()].as_ref().map_or(0, EventBuffer::len)
    }

    /// Total events ever emitted for a kind (including dropped).
    pub fn total_emitted(&self, kind: EventKind) -> u64 {
        self.buffers[kind.index()]
            .as_ref()
            .map_or(0, EventBuffer::total_written)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
