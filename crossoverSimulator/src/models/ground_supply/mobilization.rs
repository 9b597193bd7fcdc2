//! Ramping mobilization: demand answers to price and wait, the build rate
//! answers to margin and backlog, and both are bounded by ramp and supply-chain
//! limits.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::const_funcs::{calc_bottleneck_curve, smooth_wait_years};
use crate::config::constants::*;
use crate::config::simulation_config::MobilizationConfig;
use crate::config::year_params::YearParams;
use crate::core::errors::SimResult;
use crate::core::validation::ensure_non_negative;

use super::queue::clean_backlog;
use super::{baseline_demand_gw, utilization, MarketSignals, SupplyModel, SupplySnapshot};

/// Orbit can absorb at most this share of organic demand.
const MAX_SUBSTITUTION_SHARE: f64 = 0.9;
const MIN_WAIT_DEMAND_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MobilizationState {
    pub year: u32,
    pub demand_gw: f64,
    pub demand_new_gw: f64,
    pub build_rate_gw_yr: f64,
    pub capacity_gw: f64,
    pub pipeline_gw: f64,
    pub backlog_gw: f64,
    pub avg_wait_years: f64,
    pub organic_demand_gw: f64,
    pub substituted_gw: f64,
    /// Smoothed price/wait demand multiplier (1.0 = unconstrained).
    pub demand_factor: f64,
}

pub(crate) fn snapshot_of(state: &MobilizationState) -> SupplySnapshot {
    SupplySnapshot {
        year: state.year,
        demand_gw: state.demand_gw,
        organic_demand_gw: state.organic_demand_gw,
        capacity_gw: state.capacity_gw,
        backlog_gw: state.backlog_gw,
        build_rate_gw_yr: state.build_rate_gw_yr,
        avg_wait_years: state.avg_wait_years,
        utilization: utilization(state.demand_gw, state.capacity_gw),
        unserved_gw: (state.demand_gw - state.capacity_gw).max(0.0),
        pipeline_gw: state.pipeline_gw,
    }
}

/// Tightest of the four supply-chain curves in GW/yr.
pub fn bottleneck_limit_gw_yr(params: &YearParams) -> f64 {
    let year = params.year;
    let mut generation = calc_bottleneck_curve(GENERATION_CAPACITY_GW_YR, year);
    if params.toggles.smr_mitigation && year >= SMR_AVAILABLE_YEAR {
        generation *= SMR_BOTTLENECK_RELIEF;
    }
    [
        calc_bottleneck_curve(TRANSFORMER_CAPACITY_GW_YR, year),
        calc_bottleneck_curve(SUBSTATION_CAPACITY_GW_YR, year),
        calc_bottleneck_curve(TRANSMISSION_CAPACITY_GW_YR, year),
        generation,
    ]
    .into_iter()
    .fold(f64::INFINITY, f64::min)
        * params.ground_scenario.build_rate_multiplier()
}

#[derive(Debug, Clone)]
pub struct RampingMobilization {
    config: MobilizationConfig,
}

impl RampingMobilization {
    pub fn new(config: MobilizationConfig) -> Self {
        Self { config }
    }

    /// Organic demand and the demand response factor behind it. The factor
    /// closes only part of the gap to the current price and wait response each
    /// year, so buyers react to a lagged signal instead of last year's spike.
    fn organic_demand(&self, params: &YearParams, previous: &MobilizationState, signals: &MarketSignals) -> (f64, f64) {
        let baseline = baseline_demand_gw(params);
        if !self.config.demand_responsive {
            return (baseline, 1.0);
        }
        let price_index = if signals.ground_price_index > 0.0 {
            signals.ground_price_index
        } else {
            1.0
        };
        let price_factor = price_index.powf(self.config.price_elasticity);
        let wait_factor = (1.0 + self.config.wait_elasticity * previous.avg_wait_years).max(MIN_WAIT_DEMAND_FACTOR);
        let response = price_factor * wait_factor;
        let factor = previous.demand_factor + self.config.demand_adjustment_rate * (response - previous.demand_factor);
        (baseline * factor, factor)
    }

    fn next_build_rate(
        &self,
        params: &YearParams,
        previous: &MobilizationState,
        signals: &MarketSignals,
        demand_gw: f64,
    ) -> f64 {
        let backlog_ratio = if previous.demand_gw > 0.0 {
            previous.backlog_gw / previous.demand_gw
        } else {
            0.0
        };
        let growth = self.config.margin_elasticity * (signals.ground_margin - self.config.target_margin)
            + self.config.backlog_elasticity * (backlog_ratio - self.config.target_backlog_ratio);
        let mut desired = previous.build_rate_gw_yr * (1.0 + growth);

        // Shrinking demand cuts investment as well as backlog.
        if demand_gw < previous.demand_gw && previous.demand_gw > 0.0 {
            desired *= demand_gw / previous.demand_gw;
        }

        let ramp = self.config.max_ramp;
        let mut rate = desired.clamp(
            previous.build_rate_gw_yr * (1.0 - ramp),
            previous.build_rate_gw_yr * (1.0 + ramp),
        );
        if self.config.bottleneck_limits {
            rate = rate.min(bottleneck_limit_gw_yr(params));
        }
        rate.max(MIN_BUILD_RATE_GW_YR)
    }
}

impl SupplyModel for RampingMobilization {
    type State = MobilizationState;

    fn name(&self) -> &'static str {
        "RampingMobilization"
    }

    fn initial_state(&self, params: &YearParams) -> SimResult<MobilizationState> {
        let demand = baseline_demand_gw(params);
        let capacity = self.config.initial_capacity_gw;
        let build = (self.config.initial_build_rate_gw_yr * params.ground_scenario.build_rate_multiplier())
            .max(MIN_BUILD_RATE_GW_YR);
        let backlog = clean_backlog((demand - capacity).max(0.0));
        Ok(MobilizationState {
            year: params.year,
            demand_gw: demand,
            demand_new_gw: 0.0,
            build_rate_gw_yr: build,
            capacity_gw: capacity,
            pipeline_gw: backlog.min(build * PIPELINE_LEAD_TIME_YEARS),
            backlog_gw: backlog,
            avg_wait_years: smooth_wait_years(backlog / build, WAIT_CAP_YEARS),
            organic_demand_gw: demand,
            substituted_gw: 0.0,
            demand_factor: 1.0,
        })
    }

    fn step(&self, previous: &MobilizationState, params: &YearParams, signals: &MarketSignals) -> SimResult<MobilizationState> {
        let year = params.year;
        let (organic, demand_factor) = self.organic_demand(params, previous, signals);
        let substituted = if self.config.orbital_substitution {
            signals.orbital_served_gw.max(0.0).min(organic * MAX_SUBSTITUTION_SHARE)
        } else {
            0.0
        };
        let demand = organic - substituted;
        let demand_new = demand - previous.demand_gw;

        let build = self.next_build_rate(params, previous, signals, demand);

        let requested = previous.backlog_gw + demand_new.max(0.0);
        let gap = (demand - previous.capacity_gw).max(0.0);
        let delivered = build.min(requested).min(gap);
        let capacity = previous.capacity_gw + delivered;

        let net_organic_change = organic - previous.organic_demand_gw;
        let substitution_drain = substituted - previous.substituted_gw;
        let raw_backlog = previous.backlog_gw + net_organic_change - delivered - substitution_drain;

        let unserved = (demand - capacity).max(0.0);
        let backlog_floor = BACKLOG_FLOOR_UNSERVED_FRACTION * unserved;
        // Nothing can be queued beyond the gap that is actually unserved.
        let backlog = clean_backlog(raw_backlog.max(backlog_floor).min(unserved).max(0.0));
        let backlog = ensure_non_negative(year, "ground.mobilization", "backlog_gw", backlog)?;

        let wait = smooth_wait_years(backlog / build, WAIT_CAP_YEARS);

        debug!(
            year,
            organic,
            demand_factor,
            substituted,
            capacity,
            backlog,
            build,
            wait,
            "mobilization step"
        );

        Ok(MobilizationState {
            year,
            demand_gw: demand,
            demand_new_gw: demand_new,
            build_rate_gw_yr: build,
            capacity_gw: capacity,
            pipeline_gw: backlog.min(build * PIPELINE_LEAD_TIME_YEARS),
            backlog_gw: backlog,
            avg_wait_years: wait,
            organic_demand_gw: organic,
            substituted_gw: substituted,
            demand_factor,
        })
    }

    fn snapshot(&self, state: &MobilizationState) -> SupplySnapshot {
        snapshot_of(state)
    }
}
