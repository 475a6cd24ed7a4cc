//! Status vocabulary and append-only entity history.
//!
//! Every ship and container keeps an ordered, append-only log of
//! [`StatusRecord`]s. The "current status" of an entity is always the last
//! record; nothing in the simulation ever rewrites or removes a record, so
//! the log doubles as the per-entity audit trail consumed by reporting
//! collaborators after a run.

use crate::id::Location;
use crate::time::Hours;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// The full transition vocabulary of the harbor's state machines. Ships use
/// the anchoring/docking/loading/transit values; containers use
/// `InStorage`, `Transit` and `ArrivedAtDestination`; trucks use `Queuing`
/// and `Transit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Anchoring,
    Anchored,
    DockingToLoadingDock,
    DockedToLoadingDock,
    Unloading,
    UnloadingDone,
    Loading,
    LoadingDone,
    Undocking,
    Transit,
    DockingToShipDock,
    DockedToShipDock,
    InStorage,
    ArrivedAtDestination,
    Queuing,
    None,
}

// ---------------------------------------------------------------------------
// StatusRecord
// ---------------------------------------------------------------------------

/// One immutable history entry: where the entity was and what it became,
/// stamped with the simulated hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// The entity's location at the time of the transition.
    pub location: Location,
    /// Simulated hour the transition happened.
    pub timestamp: Hours,
    /// The status the entity entered.
    pub status: Status,
}

// ---------------------------------------------------------------------------
// HistoryLog
// ---------------------------------------------------------------------------

/// Append-only sequence of [`StatusRecord`]s with non-decreasing timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLog {
    records: Vec<StatusRecord>,
}

impl HistoryLog {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Timestamps must be non-decreasing; the single-threaded
    /// scheduler only ever appends at the current clock hour, so a regression
    /// here would be a scheduler defect and is debug-asserted.
    pub fn record(&mut self, location: Location, timestamp: Hours, status: Status) {
        debug_assert!(
            self.records.last().is_none_or(|last| last.timestamp <= timestamp),
            "history timestamps must be non-decreasing"
        );
        self.records.push(StatusRecord {
            location,
            timestamp,
            status,
        });
    }

    /// The current status: the last record, or [`Status::None`] if empty.
    pub fn current(&self) -> Status {
        self.records.last().map_or(Status::None, |r| r.status)
    }

    /// The timestamp of the last record, if any.
    pub fn last_change(&self) -> Option<Hours> {
        self.records.last().map(|r| r.timestamp)
    }

    /// How long the entity has held its current status as of `now`, or
    /// `None` for an empty history.
    pub fn hours_in_current_status(&self, now: Hours) -> Option<Hours> {
        self.last_change().map(|t| now.saturating_sub(t))
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[StatusRecord] {
        &self.records
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no transition has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
