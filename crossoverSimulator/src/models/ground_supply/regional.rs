use serde::Serialize;

use crate::config::const_funcs::{calc_growth_factor, smooth_wait_years};
use crate::config::constants::*;
use crate::config::year_params::YearParams;
use crate::core::errors::SimResult;

use super::queue::{clean_backlog, queue_advance, queue_initial, snapshot_of, GroundSupplyState};
use super::{baseline_demand_gw, utilization, MarketSignals, SupplyModel, SupplySnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionSpec {
    pub name: &'static str,
    pub demand_share: f64,
    pub initial_capacity_gw: f64,
    pub initial_build_rate_gw_yr: f64,
    pub build_rate_growth: f64,
}

pub const DEFAULT_REGIONS: [RegionSpec; 4] = [
    RegionSpec {
        name: "North America",
        demand_share: 0.45,
        initial_capacity_gw: 45.0,
        initial_build_rate_gw_yr: 5.5,
        build_rate_growth: 0.07,
    },
    RegionSpec {
        name: "Europe",
        demand_share: 0.15,
        initial_capacity_gw: 16.0,
        initial_build_rate_gw_yr: 1.8,
        build_rate_growth: 0.05,
    },
    RegionSpec {
        name: "China",
        demand_share: 0.25,
        initial_capacity_gw: 27.0,
        initial_build_rate_gw_yr: 3.5,
        build_rate_growth: 0.10,
    },
    RegionSpec {
        name: "Rest of World",
        demand_share: 0.15,
        initial_capacity_gw: 12.0,
        initial_build_rate_gw_yr: 1.2,
        build_rate_growth: 0.08,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalState {
    pub year: u32,
    pub regions: Vec<(&'static str, GroundSupplyState)>,
    pub aggregate: GroundSupplyState,
}

/// Independent regional queues; the aggregate sums GW and backlog-weights wait.
#[derive(Debug, Clone)]
pub struct RegionalAggregate {
    pub regions: Vec<RegionSpec>,
}

impl Default for RegionalAggregate {
    fn default() -> Self {
        Self {
            regions: DEFAULT_REGIONS.to_vec(),
        }
    }
}

impl RegionalAggregate {
    fn region_build_rate(spec: &RegionSpec, params: &YearParams) -> f64 {
        spec.initial_build_rate_gw_yr
            * calc_growth_factor(spec.build_rate_growth, params.year)
            * params.ground_scenario.build_rate_multiplier()
    }

    fn aggregate(year: u32, regions: &[(&'static str, GroundSupplyState)]) -> GroundSupplyState {
        let sum = |f: fn(&GroundSupplyState) -> f64| regions.iter().map(|(_, state)| f(state)).sum::<f64>();
        let demand = sum(|s| s.demand_gw);
        let capacity = sum(|s| s.capacity_gw);
        let backlog = clean_backlog(sum(|s| s.backlog_gw));
        let build = sum(|s| s.max_build_rate_gw_year).max(MIN_BUILD_RATE_GW_YR);

        let wait = if backlog > 0.0 {
            sum(|s| s.backlog_gw * s.avg_wait_years) / sum(|s| s.backlog_gw)
        } else {
            0.0
        };
        // A backlog always carries a wait, even if every regional wait rounds away.
        let wait = if backlog > 0.0 && wait <= 0.0 {
            smooth_wait_years(backlog / build, WAIT_CAP_YEARS)
        } else {
            wait
        };

        GroundSupplyState {
            year,
            demand_gw: demand,
            capacity_gw: capacity,
            backlog_gw: backlog,
            max_build_rate_gw_year: build,
            avg_wait_years: wait,
            utilization_pct: utilization(demand, capacity) * 100.0,
            unserved_gw: sum(|s| s.unserved_gw),
            delivered_from_backlog_gw: sum(|s| s.delivered_from_backlog_gw),
        }
    }
}

impl SupplyModel for RegionalAggregate {
    type State = RegionalState;

    fn name(&self) -> &'static str {
        "RegionalAggregate"
    }

    fn initial_state(&self, params: &YearParams) -> SimResult<RegionalState> {
        let total_demand = baseline_demand_gw(params);
        let regions: Vec<_> = self
            .regions
            .iter()
            .map(|spec| {
                let state = queue_initial(
                    params.year,
                    total_demand * spec.demand_share,
                    spec.initial_capacity_gw,
                    Self::region_build_rate(spec, params),
                );
                (spec.name, state)
            })
            .collect();
        let aggregate = Self::aggregate(params.year, &regions);
        Ok(RegionalState {
            year: params.year,
            regions,
            aggregate,
        })
    }

    fn step(&self, previous: &RegionalState, params: &YearParams, _signals: &MarketSignals) -> SimResult<RegionalState> {
        let total_demand = baseline_demand_gw(params);
        let regions: Vec<_> = self
            .regions
            .iter()
            .zip(previous.regions.iter())
            .map(|(spec, (name, prev))| {
                let state = queue_advance(
                    prev,
                    params.year,
                    total_demand * spec.demand_share,
                    Self::region_build_rate(spec, params),
                );
                (*name, state)
            })
            .collect();
        let aggregate = Self::aggregate(params.year, &regions);
        Ok(RegionalState {
            year: params.year,
            regions,
            aggregate,
        })
    }

    fn snapshot(&self, state: &RegionalState) -> SupplySnapshot {
        snapshot_of(&state.aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions_cover_whole_market() {
        let total_share: f64 = DEFAULT_REGIONS.iter().map(|r| r.demand_share).sum();
        let total_capacity: f64 = DEFAULT_REGIONS.iter().map(|r| r.initial_capacity_gw).sum();
        assert!((total_share - 1.0).abs() < 1e-12);
        assert!((total_capacity - INITIAL_GRID_CAPACITY_GW).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_sums_regions() {
        let model = RegionalAggregate::default();
        let mut state = model.initial_state(&YearParams::default_for_year(2025)).unwrap();
        for year in 2026..=2040 {
            state = model
                .step(&state, &YearParams::default_for_year(year), &MarketSignals::neutral(0.2))
                .unwrap();
        }
        let capacity: f64 = state.regions.iter().map(|(_, s)| s.capacity_gw).sum();
        assert!((state.aggregate.capacity_gw - capacity).abs() < 1e-9);
        assert!((state.aggregate.demand_gw - 450.0).abs() < 1e-6);
        if state.aggregate.backlog_gw > 0.0 {
            assert!(state.aggregate.avg_wait_years > 0.0);
        }
    }
}
