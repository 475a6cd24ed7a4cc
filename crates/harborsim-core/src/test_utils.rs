//! Shared helpers for tests and demo harnesses. Compiled only with the
//! `test-utils` feature (or under `cfg(test)`).

use crate::container::ContainerSize;
use crate::harbor::{DockCounts, Harbor, HarborConfig, ShipSpec};
use crate::ship::ShipSize;
use crate::time::Hours;

/// Builder for [`ShipSpec`]s with sensible defaults: a small recurring ship
/// starting at hour 0 with a two-day round trip and no cargo.
#[derive(Debug, Clone)]
pub struct ShipSpecBuilder {
    spec: ShipSpec,
}

impl ShipSpecBuilder {
    pub fn named(name: &str) -> Self {
        Self {
            spec: ShipSpec {
                name: name.to_string(),
                size: ShipSize::Small,
                start_hour: 0,
                round_trip_days: 2,
                single_trip: false,
                cargo: Vec::new(),
            },
        }
    }

    pub fn size(mut self, size: ShipSize) -> Self {
        self.spec.size = size;
        self
    }

    pub fn start_hour(mut self, hour: Hours) -> Self {
        self.spec.start_hour = hour;
        self
    }

    pub fn round_trip_days(mut self, days: Hours) -> Self {
        self.spec.round_trip_days = days;
        self
    }

    pub fn single_trip(mut self) -> Self {
        self.spec.single_trip = true;
        self.spec.round_trip_days = 0;
        self
    }

    /// Append `count` containers of one size to the arrival cargo.
    pub fn cargo(mut self, size: ContainerSize, count: usize) -> Self {
        self.spec.cargo.extend(std::iter::repeat_n(size, count));
        self
    }

    pub fn build(self) -> ShipSpec {
        self.spec
    }
}

/// A config with trucks and direct delivery turned off, so every container
/// flows through storage and tests see fully deterministic routing without
/// consulting the RNG.
pub fn storage_only_config() -> HarborConfig {
    HarborConfig {
        trucks_per_hour: 0,
        direct_delivery_percent: 0,
        ..HarborConfig::default()
    }
}

/// A config with exactly one small loading dock and nothing else to dock at.
pub fn single_small_dock_config() -> HarborConfig {
    HarborConfig {
        loading_docks: DockCounts {
            small: 1,
            medium: 0,
            large: 0,
        },
        ship_docks: DockCounts::default(),
        ..storage_only_config()
    }
}

/// Build a harbor from specs with the default config, panicking on invalid
/// input. Test-only convenience.
pub fn harbor_with(specs: Vec<ShipSpec>, config: HarborConfig) -> Harbor {
    match Harbor::new(specs, config) {
        Ok(harbor) => harbor,
        Err(err) => panic!("invalid test harbor: {err}"),
    }
}
