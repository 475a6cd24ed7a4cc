//! Property-based tests for the harbor scheduler.
//!
//! Uses proptest to generate random fleets and configurations, runs each
//! harbor to completion, and verifies structural invariants hold.

use harborsim_core::container::ContainerSize;
use harborsim_core::dock::DockKind;
use harborsim_core::harbor::{Harbor, HarborConfig, ShipSpec};
use harborsim_core::scheduler::Simulation;
use harborsim_core::ship::ShipSize;
use harborsim_core::status::Status;
use harborsim_core::time::HOURS_PER_DAY;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_ship_size() -> impl Strategy<Value = ShipSize> {
    prop_oneof![
        Just(ShipSize::Small),
        Just(ShipSize::Medium),
        Just(ShipSize::Large),
    ]
}

fn arb_container_size() -> impl Strategy<Value = ContainerSize> {
    prop_oneof![
        Just(ContainerSize::Small),
        Just(ContainerSize::Medium),
        Just(ContainerSize::Large),
    ]
}

/// A random fleet of one to four ships. Cargo counts stay at or below
/// twelve, which every size class can carry within its weight limit.
fn arb_fleet() -> impl Strategy<Value = Vec<ShipSpec>> {
    proptest::collection::vec(
        (
            arb_ship_size(),
            proptest::collection::vec(arb_container_size(), 0..=12),
            any::<bool>(),
            0u64..24,
            1u64..=3,
        ),
        1..=4,
    )
    .prop_map(|ships| {
        ships
            .into_iter()
            .enumerate()
            .map(|(i, (size, cargo, single_trip, start_hour, round_trip_days))| ShipSpec {
                name: format!("ship-{i}"),
                size,
                start_hour,
                round_trip_days,
                single_trip,
                cargo,
            })
            .collect()
    })
}

fn arb_config() -> impl Strategy<Value = HarborConfig> {
    (0u8..=100, 0usize..=6, 1u64..=12, any::<u64>()).prop_map(
        |(direct_delivery_percent, trucks_per_hour, truck_transit_hours, rng_seed)| HarborConfig {
            direct_delivery_percent,
            trucks_per_hour,
            truck_transit_hours,
            rng_seed,
            ..HarborConfig::default()
        },
    )
}

fn run(specs: Vec<ShipSpec>, config: HarborConfig, hours: u64) -> Simulation {
    let harbor = Harbor::new(specs, config).expect("generated fleet must be valid");
    let mut sim = Simulation::new(harbor, 0, hours);
    sim.run();
    sim
}

fn container_census(harbor: &Harbor) -> usize {
    let on_ships: usize = harbor
        .ship_ids()
        .into_iter()
        .filter_map(|id| harbor.ship(id).map(|s| s.cargo.len()))
        .sum();
    on_ships
        + harbor.storage().total_stored()
        + harbor.trucks_in_transit_count()
        + harbor.arrived_containers().len()
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// No container is ever created or lost mid-run.
    #[test]
    fn containers_are_conserved(specs in arb_fleet(), config in arb_config()) {
        let initial: usize = specs.iter().map(|s| s.cargo.len()).sum();
        let sim = run(specs, config, 96);
        prop_assert_eq!(container_census(sim.harbor()), initial);
    }

    /// Every history is append-only with strictly increasing timestamps:
    /// at most one transition per entity per hour.
    #[test]
    fn histories_are_strictly_ordered(specs in arb_fleet(), config in arb_config()) {
        let sim = run(specs, config, 96);
        for id in sim.harbor().ship_ids() {
            let records = sim.harbor().ship_history(id).unwrap();
            for pair in records.windows(2) {
                prop_assert!(pair[0].timestamp < pair[1].timestamp);
            }
        }
    }

    /// Delivered containers are terminal: `ArrivedAtDestination` is their
    /// last record and each appears exactly once in the arrived collection.
    #[test]
    fn deliveries_are_terminal(specs in arb_fleet(), config in arb_config()) {
        let sim = run(specs, config, 96);
        let arrived = sim.harbor().arrived_containers();
        for &container in arrived {
            let records = sim.harbor().container_history(container).unwrap();
            prop_assert_eq!(
                records.last().map(|r| r.status),
                Some(Status::ArrivedAtDestination)
            );
        }
        let mut deduped = arrived.to_vec();
        deduped.sort_unstable();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), arrived.len());
    }

    /// Dock accounting never drifts: free + occupied == total for every
    /// kind and size class, at the end of any run.
    #[test]
    fn dock_counts_are_conserved(specs in arb_fleet(), config in arb_config()) {
        let sim = run(specs, config, 96);
        let docks = sim.harbor().docks();
        for kind in [DockKind::Loading, DockKind::Ship] {
            for size in [ShipSize::Small, ShipSize::Medium, ShipSize::Large] {
                prop_assert_eq!(
                    docks.free_count(kind, size) + docks.occupied_count(kind, size),
                    docks.total_count(kind, size)
                );
            }
        }
    }

    /// Two runs with the same fleet and config are identical.
    #[test]
    fn runs_are_deterministic(specs in arb_fleet(), config in arb_config()) {
        let sim_a = run(specs.clone(), config.clone(), 72);
        let sim_b = run(specs, config, 72);
        for (a, b) in sim_a
            .harbor()
            .ship_ids()
            .into_iter()
            .zip(sim_b.harbor().ship_ids())
        {
            prop_assert_eq!(
                sim_a.harbor().ship_history(a).unwrap(),
                sim_b.harbor().ship_history(b).unwrap()
            );
        }
        prop_assert_eq!(
            sim_a.harbor().arrived_containers().len(),
            sim_b.harbor().arrived_containers().len()
        );
        prop_assert_eq!(
            sim_a.harbor().storage().total_stored(),
            sim_b.harbor().storage().total_stored()
        );
    }

    /// A recurring ship that puts to sea at hour T with a round trip of R
    /// days re-enters `Anchoring` no earlier than T + R * 24, never sooner.
    #[test]
    fn round_trips_never_return_early(specs in arb_fleet(), config in arb_config()) {
        let sim = run(specs, config, 96);
        for id in sim.harbor().ship_ids() {
            let round_trip =
                sim.harbor().ship(id).unwrap().round_trip_days * HOURS_PER_DAY;
            let records = sim.harbor().ship_history(id).unwrap();
            for (i, record) in records.iter().enumerate() {
                if record.status != Status::Transit {
                    continue;
                }
                if let Some(back) = records[i + 1..]
                    .iter()
                    .find(|r| r.status == Status::Anchoring)
                {
                    prop_assert!(
                        back.timestamp >= record.timestamp + round_trip,
                        "back after {} hours, round trip is {}",
                        back.timestamp - record.timestamp,
                        round_trip
                    );
                }
            }
        }
    }

    /// A berthed single-trip ship never moves again: once
    /// `DockedToShipDock` appears it is the final record.
    #[test]
    fn berthing_is_terminal(specs in arb_fleet(), config in arb_config()) {
        let sim = run(specs, config, 96);
        for id in sim.harbor().ship_ids() {
            let records = sim.harbor().ship_history(id).unwrap();
            if let Some(pos) = records
                .iter()
                .position(|r| r.status == Status::DockedToShipDock)
            {
                prop_assert_eq!(pos, records.len() - 1);
            }
        }
    }
}
