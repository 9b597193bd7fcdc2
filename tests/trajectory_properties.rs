use orbital_crossover::config::constants::BACKLOG_FLOOR_UNSERVED_FRACTION;
use orbital_crossover::config::simulation_config::{
    CrossoverBasis, FinanceConfig, LaunchModelKind, MobilizationConfig, SimulationConfig, StrictnessMode,
};
use orbital_crossover::config::year_params::{default_trajectory, ScenarioToggles, YearParams};
use orbital_crossover::core::crossover::{find_crossover, CrossoverSummary};
use orbital_crossover::core::errors::SimulationError;
use orbital_crossover::core::ground_metrics::GroundMetrics;
use orbital_crossover::core::trajectory::{Trajectory, TrajectoryRunner};
use orbital_crossover::core::validation::Diagnostics;
use orbital_crossover::models::ground_penalties::GroundConstraintPenalties;
use orbital_crossover::models::ground_supply::regional::RegionSpec;
use orbital_crossover::models::ground_supply::{ClosedFormQueue, GroundSupplyModel, RegionalAggregate};

fn run_with(config: SimulationConfig) -> Trajectory {
    TrajectoryRunner::new(config)
        .run_default(ScenarioToggles::default())
        .unwrap()
}

fn baseline() -> Trajectory {
    run_with(SimulationConfig::default())
}

#[test]
fn backlog_and_wait_stay_consistent() {
    for year in baseline().years {
        let metrics = &year.ground.metrics;
        assert!(metrics.backlog_gw >= 0.0, "{}: backlog {}", year.year, metrics.backlog_gw);
        assert!(metrics.wait_years.is_finite() && metrics.wait_years >= 0.0);
        if metrics.backlog_gw > 0.0 {
            assert!(metrics.wait_years > 0.0, "{}: backlog without wait", year.year);
        }
        assert!(metrics.backlog_gw >= BACKLOG_FLOOR_UNSERVED_FRACTION * metrics.unserved_gw - 1e-9);
        assert!((0.0..=1.0).contains(&metrics.utilization));
    }
}

#[test]
fn cost_ledgers_reconcile_every_year() {
    for year in baseline().years {
        assert!(year.cost_accounting_valid, "{} failed accounting", year.year);

        let ground = &year.ground.cost;
        let ground_sum = ground.energy + ground.hardware + ground.site + ground.operations;
        assert!((ground_sum - ground.base_total).abs() / ground.base_total < 0.01);
        assert!(ground.effective_total >= ground.base_total);

        let orbit = &year.orbit.cost;
        let orbit_sum: f64 = orbit.components().iter().map(|(_, value)| value).sum();
        assert!((orbit_sum - orbit.effective_total).abs() / orbit.effective_total < 0.01);

        let launch = &year.orbit.launch;
        let launch_sum: f64 = launch.components().iter().map(|(_, value)| value).sum();
        assert!((launch_sum - launch.price_per_kg).abs() / launch.price_per_kg < 1e-6);
    }
}

#[test]
fn launch_price_never_rises() {
    for launch_model in [LaunchModelKind::MarginalCostCurve, LaunchModelKind::WrightsLaw] {
        let config = SimulationConfig {
            launch_model,
            ..SimulationConfig::default()
        };
        let trajectory = run_with(config);
        for pair in trajectory.years.windows(2) {
            assert!(
                pair[1].orbit.launch.price_per_kg <= pair[0].orbit.launch.price_per_kg + 1e-9,
                "{:?}: launch rose from {} to {} in {}",
                launch_model,
                pair[0].orbit.launch.price_per_kg,
                pair[1].orbit.launch.price_per_kg,
                pair[1].year
            );
        }
    }
}

#[test]
fn thermal_cap_is_a_fraction() {
    for year in baseline().years {
        let satellite = &year.orbit.satellite;
        assert!((0.0..=1.0).contains(&satellite.thermal_cap_factor));
        assert!((0.0..=1.0).contains(&satellite.first_pass_thermal_cap_factor));
    }
}

#[test]
fn impossible_power_budget_fails_the_run() {
    let mut row = YearParams::default_for_year(2030);
    row.satellite_power_kw = 10_000.0;
    let config = SimulationConfig {
        strictness: StrictnessMode::Lenient,
        ..SimulationConfig::default()
    };
    let result = TrajectoryRunner::new(config).run(&[row]);
    assert!(matches!(result, Err(SimulationError::ThermalInfeasible { .. })));
}

#[test]
fn market_shares_sum_to_one() {
    for year in baseline().years {
        let market = &year.market;
        if market.total_served_gw > 0.0 {
            assert!((market.ground_share + market.orbital_share - 1.0).abs() <= 1e-6);
        }
        assert!((0.0..=1.0).contains(&market.orbital_share));
        assert!(market.unserved_gw >= 0.0);
    }
}

#[test]
fn repeat_runs_are_identical() {
    let first = baseline();
    let second = baseline();
    assert_eq!(first, second);
}

#[test]
fn demand_anchors_hold_with_feedback_disabled() {
    let config = SimulationConfig {
        mobilization: MobilizationConfig::toggles_disabled(),
        ..SimulationConfig::default()
    };
    let trajectory = run_with(config);
    for (year, anchor) in [(2025, 120.0), (2040, 450.0)] {
        let demand = trajectory.year(year).unwrap().ground.metrics.market_demand_gw;
        assert!((demand - anchor).abs() / anchor < 0.03, "{}: {} vs {}", year, demand, anchor);
    }
}

#[test]
fn no_backlog_means_no_scarcity() {
    let penalties = GroundConstraintPenalties::new(FinanceConfig::default());
    let metrics = GroundMetrics {
        year: 2030,
        demand_gw: 150.0,
        market_demand_gw: 150.0,
        capacity_gw: 200.0,
        backlog_gw: 0.0,
        build_rate_gw_yr: 20.0,
        wait_years: 0.0,
        utilization: 0.75,
        unserved_gw: 0.0,
        pipeline_gw: 0.0,
    };
    let mut diagnostics = Diagnostics::new(StrictnessMode::Strict);
    let result = penalties.compute(&metrics, 9_000.0, &mut diagnostics).unwrap();
    assert_eq!(result.scarcity_multiplier, 1.0);
    assert_eq!(result.delay_penalty_per_kw, 0.0);

    for year in baseline().years {
        let metrics = &year.ground.metrics;
        if metrics.backlog_gw == 0.0 && metrics.utilization < 0.85 {
            assert_eq!(year.ground.penalties.scarcity_multiplier, 1.0);
        }
    }
}

#[test]
fn doubled_failure_rate_costs_more_than_double_in_replacements() {
    let base = baseline();
    let mut config = SimulationConfig::default();
    config.orbital.failure_rate_multiplier = 2.0;
    let doubled = run_with(config);

    let base_2035 = base.year(2035).unwrap().orbit.cost.replacement;
    let doubled_2035 = doubled.year(2035).unwrap().orbit.cost.replacement;
    let ratio = doubled_2035 / base_2035;
    assert!(ratio > 2.0, "ratio {}", ratio);
    assert!(ratio < 5.0, "ratio {}", ratio);
}

#[test]
fn constellation_resplits_at_most_once() {
    for year in baseline().years {
        let design = &year.orbit.constellation;
        assert!(design.resplit_count <= 1);
        if design.resplit_count == 0 {
            assert!(design.warnings.is_empty());
        }
    }
}

#[test]
fn crossover_summary_agrees_with_trajectory() {
    let trajectory = baseline();
    let summary = CrossoverSummary::from_years(&trajectory.years);
    assert_eq!(summary, trajectory.crossovers);
    assert_eq!(trajectory.crossover_year, summary.effective);
    if let Some(year) = trajectory.crossover_year {
        assert!(trajectory.years.iter().filter(|y| y.year < year).all(|y| !y.crossover));
        assert!(trajectory.year(year).unwrap().crossover);
    }
    assert_eq!(find_crossover(&trajectory.years, CrossoverBasis::Base), trajectory.crossovers.base);
}

#[test]
fn short_horizon_matches_prefix_of_full_run() {
    let full = baseline();
    let params = default_trajectory(2025, 2032, ScenarioToggles::default());
    let short = TrajectoryRunner::new(SimulationConfig::default()).run(&params).unwrap();
    assert_eq!(short.years.len(), 8);
    for (a, b) in short.years.iter().zip(full.years.iter()) {
        assert_eq!(a, b);
    }
}

#[test]
fn default_run_has_no_alternating_zero_wait_years() {
    let trajectory = baseline();
    let waits: Vec<f64> = trajectory.years.iter().map(|year| year.ground.metrics.wait_years).collect();
    for (position, window) in waits.windows(3).enumerate() {
        assert!(
            !(window[0] > 0.25 && window[1] == 0.0 && window[2] > 0.25),
            "wait snaps to zero in {} between {:.2} and {:.2}: {:?}",
            trajectory.years[position + 1].year,
            window[0],
            window[2],
            waits
        );
    }
    let zero_wait_years = waits.iter().filter(|wait| **wait == 0.0).count();
    assert!(zero_wait_years * 4 < waits.len(), "{} zero-wait years: {:?}", zero_wait_years, waits);

    let costs: Vec<f64> = trajectory.years.iter().map(|year| year.ground.cost.effective_total).collect();
    let direction_flips = costs
        .windows(3)
        .filter(|window| (window[1] - window[0]) * (window[2] - window[1]) < 0.0)
        .count();
    assert!(direction_flips < 6, "ground effective cost zigzags {} times: {:?}", direction_flips, costs);
}

#[test]
fn wait_jump_is_flagged_as_discontinuity() {
    // The build rate collapses tenfold in the second year, so the backlog
    // that cleared in about a year now takes several.
    let queue = ClosedFormQueue {
        initial_capacity_gw: 20.0,
        initial_build_rate_gw_yr: 100.0,
        build_rate_growth: -0.9,
    };
    let config = SimulationConfig {
        strictness: StrictnessMode::Lenient,
        ..SimulationConfig::default()
    };
    let params = default_trajectory(2025, 2026, ScenarioToggles::default());
    let trajectory = TrajectoryRunner::with_supply_model(config, GroundSupplyModel::ClosedFormQueue(queue))
        .run(&params)
        .unwrap();

    let first = &trajectory.years[0];
    let second = &trajectory.years[1];
    assert!(!first.ground.wait_discontinuity);
    assert!(second.ground.metrics.wait_years - first.ground.metrics.wait_years > 4.0);
    assert!(second.ground.wait_discontinuity);
    assert!(second.warnings.iter().any(|warning| warning.contains("wait time jumped")));
}

#[test]
fn baseline_wait_never_jumps() {
    assert!(baseline().years.iter().all(|year| !year.ground.wait_discontinuity));
}

fn split_grid() -> GroundSupplyModel {
    // One region sits on idle capacity while the other queues for a decade:
    // the aggregate has a long wait at low utilization.
    GroundSupplyModel::RegionalAggregate(RegionalAggregate {
        regions: vec![
            RegionSpec {
                name: "Surplus",
                demand_share: 0.5,
                initial_capacity_gw: 300.0,
                initial_build_rate_gw_yr: 10.0,
                build_rate_growth: 0.0,
            },
            RegionSpec {
                name: "Starved",
                demand_share: 0.5,
                initial_capacity_gw: 1.0,
                initial_build_rate_gw_yr: 1.0,
                build_rate_growth: 0.0,
            },
        ],
    })
}

#[test]
fn suppressed_scarcity_gate_fails_strict_runs() {
    let params = default_trajectory(2025, 2026, ScenarioToggles::default());
    let result = TrajectoryRunner::with_supply_model(SimulationConfig::default(), split_grid()).run(&params);
    assert!(matches!(result, Err(SimulationError::GateSuppressed { year: 2025, .. })));
}

#[test]
fn suppressed_scarcity_gate_is_a_warning_in_lenient_runs() {
    let config = SimulationConfig {
        strictness: StrictnessMode::Lenient,
        ..SimulationConfig::default()
    };
    let params = default_trajectory(2025, 2026, ScenarioToggles::default());
    let trajectory = TrajectoryRunner::with_supply_model(config, split_grid()).run(&params).unwrap();

    let first = &trajectory.years[0];
    assert!(first.ground.metrics.utilization < 0.5);
    assert!(first.ground.metrics.wait_years > 2.0);
    assert!(first.ground.penalties.scarcity_gate < 0.05);
    assert!(first.warnings.iter().any(|warning| warning.contains("scarcity gate")));
}
