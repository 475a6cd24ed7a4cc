//! Harbor storage: a size-partitioned pool of container slots.
//!
//! Each size class owns a fixed number of slots. A slot holds one container,
//! except for the half-size (Small) class where two containers share a slot.
//! All operations are non-blocking O(pool size) scans; `store`/`retrieve`
//! either complete in full or change nothing.

use crate::container::ContainerSize;
use crate::id::ContainerId;
use serde::{Deserialize, Serialize};

/// One storage slot. Capacity is decided by the size class of the partition
/// the slot belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSlot {
    containers: Vec<ContainerId>,
}

/// The slots of one size class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SizePartition {
    size: ContainerSize,
    slots: Vec<StorageSlot>,
}

impl SizePartition {
    fn capacity_per_slot(&self) -> usize {
        self.size.per_storage_slot()
    }

    fn free_slot_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.containers.len() < self.capacity_per_slot())
            .count()
    }

    fn stored_count(&self) -> usize {
        self.slots.iter().map(|s| s.containers.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// StorageArea
// ---------------------------------------------------------------------------

/// The whole storage yard: one partition per container size class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageArea {
    partitions: [SizePartition; 3],
}

impl StorageArea {
    /// Create a storage area with the given slot counts per size class.
    pub fn new(small_slots: usize, medium_slots: usize, large_slots: usize) -> Self {
        let partition = |size, count| SizePartition {
            size,
            slots: vec![StorageSlot::default(); count],
        };
        Self {
            partitions: [
                partition(ContainerSize::Small, small_slots),
                partition(ContainerSize::Medium, medium_slots),
                partition(ContainerSize::Large, large_slots),
            ],
        }
    }

    fn partition(&self, size: ContainerSize) -> &SizePartition {
        &self.partitions[size as usize]
    }

    fn partition_mut(&mut self, size: ContainerSize) -> &mut SizePartition {
        &mut self.partitions[size as usize]
    }

    /// Whether at least one more container of this size fits.
    pub fn has_free_space(&self, size: ContainerSize) -> bool {
        self.partition(size).free_slot_count() > 0
    }

    /// Put a container into the first slot with room. Returns the slot
    /// index, or `None` (nothing changed) when the partition is full.
    pub fn store(&mut self, size: ContainerSize, container: ContainerId) -> Option<usize> {
        let partition = self.partition_mut(size);
        let cap = partition.capacity_per_slot();
        let idx = partition
            .slots
            .iter()
            .position(|s| s.containers.len() < cap)?;
        partition.slots[idx].containers.push(container);
        Some(idx)
    }

    /// Take out a stored container of the given size, oldest-in-slot first.
    /// `None` when none of that size is stored.
    pub fn retrieve(&mut self, size: ContainerSize) -> Option<ContainerId> {
        let partition = self.partition_mut(size);
        let slot = partition
            .slots
            .iter_mut()
            .find(|s| !s.containers.is_empty())?;
        Some(slot.containers.remove(0))
    }

    /// Remove a specific container wherever it is stored. Returns false if
    /// it is not in the yard.
    pub fn release(&mut self, container: ContainerId) -> bool {
        for partition in &mut self.partitions {
            for slot in &mut partition.slots {
                if let Some(pos) = slot.containers.iter().position(|&c| c == container) {
                    slot.containers.remove(pos);
                    return true;
                }
            }
        }
        false
    }

    /// Slots with remaining room, per size class.
    pub fn free_slot_count(&self, size: ContainerSize) -> usize {
        self.partition(size).free_slot_count()
    }

    /// Containers currently stored, per size class.
    pub fn stored_count(&self, size: ContainerSize) -> usize {
        self.partition(size).stored_count()
    }

    /// Total containers stored across all size classes.
    pub fn total_stored(&self) -> usize {
        self.partitions.iter().map(SizePartition::stored_count).sum()
    }

    /// Every stored container id, in partition/slot order. Used by the
    /// daily snapshot.
    pub fn all_stored(&self) -> Vec<ContainerId> {
        self.partitions
            .iter()
            .flat_map(|p| p.slots.iter())
            .flat_map(|s| s.containers.iter().copied())
            .collect()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
