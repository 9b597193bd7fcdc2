use serde::{Deserialize, Serialize};

use crate::config::const_funcs::{calc_growth_factor, smooth_wait_years};
use crate::config::constants::*;
use crate::config::year_params::YearParams;
use crate::core::errors::SimResult;

use super::{baseline_demand_gw, utilization, MarketSignals, SupplyModel, SupplySnapshot, BACKLOG_EPSILON_GW};

const SMR_QUEUE_BUILD_BOOST: f64 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundSupplyState {
    pub year: u32,
    pub demand_gw: f64,
    pub capacity_gw: f64,
    pub backlog_gw: f64,
    pub max_build_rate_gw_year: f64,
    pub avg_wait_years: f64,
    pub utilization_pct: f64,
    pub unserved_gw: f64,
    pub delivered_from_backlog_gw: f64,
}

pub(crate) fn queue_initial(year: u32, demand_gw: f64, capacity_gw: f64, build_rate_gw_yr: f64) -> GroundSupplyState {
    let build = build_rate_gw_yr.max(MIN_BUILD_RATE_GW_YR);
    let backlog = clean_backlog((demand_gw - capacity_gw).max(0.0));
    GroundSupplyState {
        year,
        demand_gw,
        capacity_gw,
        backlog_gw: backlog,
        max_build_rate_gw_year: build,
        avg_wait_years: smooth_wait_years(backlog / build, WAIT_CAP_YEARS),
        utilization_pct: utilization(demand_gw, capacity_gw) * 100.0,
        unserved_gw: (demand_gw - capacity_gw).max(0.0),
        delivered_from_backlog_gw: 0.0,
    }
}

/// One queue year: unmet requests join the backlog, the backlog drains by at
/// most the build rate, and wait is the smoothed backlog over build rate.
pub(crate) fn queue_advance(
    previous: &GroundSupplyState,
    year: u32,
    demand_gw: f64,
    build_rate_gw_yr: f64,
) -> GroundSupplyState {
    let build = build_rate_gw_yr.max(MIN_BUILD_RATE_GW_YR);
    let new_requests = (demand_gw - previous.capacity_gw - previous.backlog_gw).max(0.0);
    let queue = previous.backlog_gw + new_requests;
    let delivered = queue.min(build);
    let capacity = previous.capacity_gw + delivered;
    let backlog = clean_backlog(queue - delivered);

    GroundSupplyState {
        year,
        demand_gw,
        capacity_gw: capacity,
        backlog_gw: backlog,
        max_build_rate_gw_year: build,
        avg_wait_years: smooth_wait_years(backlog / build, WAIT_CAP_YEARS),
        utilization_pct: utilization(demand_gw, capacity) * 100.0,
        unserved_gw: (demand_gw - capacity).max(0.0),
        delivered_from_backlog_gw: previous.backlog_gw.min(delivered),
    }
}

pub(crate) fn clean_backlog(backlog_gw: f64) -> f64 {
    if backlog_gw < BACKLOG_EPSILON_GW {
        0.0
    } else {
        backlog_gw
    }
}

pub(crate) fn snapshot_of(state: &GroundSupplyState) -> SupplySnapshot {
    SupplySnapshot {
        year: state.year,
        demand_gw: state.demand_gw,
        organic_demand_gw: state.demand_gw,
        capacity_gw: state.capacity_gw,
        backlog_gw: state.backlog_gw,
        build_rate_gw_yr: state.max_build_rate_gw_year,
        avg_wait_years: state.avg_wait_years,
        utilization: state.utilization_pct / 100.0,
        unserved_gw: state.unserved_gw,
        pipeline_gw: state.backlog_gw.min(state.max_build_rate_gw_year * PIPELINE_LEAD_TIME_YEARS),
    }
}

/// Anchor-curve demand against an exponentially growing build rate.
#[derive(Debug, Clone)]
pub struct ClosedFormQueue {
    pub initial_capacity_gw: f64,
    pub initial_build_rate_gw_yr: f64,
    pub build_rate_growth: f64,
}

impl Default for ClosedFormQueue {
    fn default() -> Self {
        Self {
            initial_capacity_gw: INITIAL_GRID_CAPACITY_GW,
            initial_build_rate_gw_yr: INITIAL_BUILD_RATE_GW_YR,
            build_rate_growth: QUEUE_BUILD_RATE_GROWTH,
        }
    }
}

impl ClosedFormQueue {
    pub fn max_build_rate(&self, params: &YearParams) -> f64 {
        let mut rate = self.initial_build_rate_gw_yr
            * calc_growth_factor(self.build_rate_growth, params.year)
            * params.ground_scenario.build_rate_multiplier();
        if params.toggles.smr_mitigation && params.year >= SMR_AVAILABLE_YEAR {
            rate *= SMR_QUEUE_BUILD_BOOST;
        }
        rate
    }
}

impl SupplyModel for ClosedFormQueue {
    type State = GroundSupplyState;

    fn name(&self) -> &'static str {
        "ClosedFormQueue"
    }

    fn initial_state(&self, params: &YearParams) -> SimResult<GroundSupplyState> {
        Ok(queue_initial(
            params.year,
            baseline_demand_gw(params),
            self.initial_capacity_gw,
            self.max_build_rate(params),
        ))
    }

    fn step(&self, previous: &GroundSupplyState, params: &YearParams, _signals: &MarketSignals) -> SimResult<GroundSupplyState> {
        Ok(queue_advance(
            previous,
            params.year,
            baseline_demand_gw(params),
            self.max_build_rate(params),
        ))
    }

    fn snapshot(&self, state: &GroundSupplyState) -> SupplySnapshot {
        snapshot_of(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::year_params::default_trajectory;
    use crate::config::year_params::ScenarioToggles;

    fn run_queue() -> Vec<GroundSupplyState> {
        let model = ClosedFormQueue::default();
        let params = default_trajectory(2025, 2050, ScenarioToggles::default());
        let signals = MarketSignals::neutral(0.2);
        let mut states = vec![model.initial_state(&params[0]).unwrap()];
        for year_params in &params[1..] {
            let next = model.step(states.last().unwrap(), year_params, &signals).unwrap();
            states.push(next);
        }
        states
    }

    #[test]
    fn test_backlog_and_wait_invariants() {
        for state in run_queue() {
            assert!(state.backlog_gw >= 0.0);
            assert!(state.avg_wait_years.is_finite() && state.avg_wait_years >= 0.0);
            if state.backlog_gw > 0.0 {
                assert!(state.avg_wait_years > 0.0, "zero wait with backlog in {}", state.year);
            }
        }
    }

    #[test]
    fn test_delivery_bounded_by_build_rate() {
        let states = run_queue();
        for pair in states.windows(2) {
            let delivered = pair[1].capacity_gw - pair[0].capacity_gw;
            assert!(delivered <= pair[1].max_build_rate_gw_year + 1e-9);
            assert!(delivered >= 0.0);
        }
    }

    #[test]
    fn test_demand_follows_anchor() {
        let states = run_queue();
        assert!((states[0].demand_gw - 120.0).abs() < 1e-9);
        assert!((states[15].demand_gw - 450.0).abs() < 1e-6);
    }

    #[test]
    fn test_surplus_capacity_has_no_backlog() {
        let state = queue_initial(2025, 80.0, 100.0, 12.0);
        assert_eq!(state.backlog_gw, 0.0);
        assert_eq!(state.avg_wait_years, 0.0);
        assert!((state.utilization_pct - 80.0).abs() < 1e-9);
    }
}
