//! Feasibility-gated logit split of compute demand between ground and orbit.

use serde::Serialize;

use crate::config::const_funcs::logistic;
use crate::config::constants::SHARE_SUM_TOLERANCE;
use crate::config::simulation_config::MarketConfig;
use crate::core::errors::{SimResult, SimulationError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketInputs {
    pub year: u32,
    pub demand_gw: f64,
    pub ground_capacity_gw: f64,
    pub ground_wait_years: f64,
    pub ground_backlog_gw: f64,
    pub orbital_capacity_gw: f64,
    pub ground_cost: f64,
    pub orbital_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketAllocation {
    pub year: u32,
    pub demand_gw: f64,
    pub cost_ratio: f64,
    pub desired_orbital_share: f64,
    pub queue_pressure: bool,
    pub ground_feasible_gw: f64,
    pub orbital_feasible_gw: f64,
    pub ground_served_gw: f64,
    pub orbital_served_gw: f64,
    pub total_served_gw: f64,
    pub unserved_gw: f64,
    pub ground_share: f64,
    pub orbital_share: f64,
}

/// Orbit's desired share from the orbit/ground cost ratio; 0.5 at parity.
pub fn desired_orbital_share(cost_ratio: f64, steepness: f64) -> f64 {
    if !(cost_ratio.is_finite() && cost_ratio > 0.0) {
        return if cost_ratio == 0.0 { 1.0 } else { 0.0 };
    }
    logistic(-steepness * cost_ratio.ln())
}

/// Each side's share of the served total. The shares are derived separately
/// from each side's GW, so a mismatch with the total is reported, not hidden.
pub fn served_shares(year: u32, ground_served_gw: f64, orbital_served_gw: f64, total_served_gw: f64) -> SimResult<(f64, f64)> {
    if total_served_gw <= 0.0 {
        // Nothing served: conservative default is the grid.
        return Ok((1.0, 0.0));
    }
    let ground_share = ground_served_gw / total_served_gw;
    let orbital_share = orbital_served_gw / total_served_gw;
    if ((ground_share + orbital_share) - 1.0).abs() > SHARE_SUM_TOLERANCE {
        return Err(SimulationError::ShareSum {
            year,
            orbital_share,
            ground_share,
            served_gw: total_served_gw,
        });
    }
    Ok((ground_share, orbital_share))
}

pub struct MarketShareAllocator {
    config: MarketConfig,
}

impl MarketShareAllocator {
    pub fn new(config: MarketConfig) -> Self {
        Self { config }
    }

    pub fn queue_pressure(&self, inputs: &MarketInputs) -> bool {
        inputs.ground_wait_years > self.config.queue_pressure_wait_years
            || inputs.ground_backlog_gw > self.config.queue_pressure_backlog_fraction * inputs.demand_gw
    }

    pub fn allocate(&self, inputs: &MarketInputs) -> SimResult<MarketAllocation> {
        let demand = inputs.demand_gw.max(0.0);
        let cost_ratio = if inputs.ground_cost > 0.0 {
            inputs.orbital_cost / inputs.ground_cost
        } else {
            f64::INFINITY
        };
        let desired = desired_orbital_share(cost_ratio, self.config.logit_steepness);
        let pressure = self.queue_pressure(inputs);

        let mut ground_feasible = inputs.ground_capacity_gw.max(0.0).min(demand);
        if pressure {
            ground_feasible = ground_feasible.min(self.config.queue_pressure_ground_cap * demand);
        }
        let orbital_feasible = inputs.orbital_capacity_gw.max(0.0).min(demand);

        // Unserved demand is tracked on its own so the share check below can catch
        // served GW that do not add back up to what left the residual.
        let (ground_served, orbital_served, residual) = match (ground_feasible > 0.0, orbital_feasible > 0.0) {
            (false, false) => (0.0, 0.0, demand),
            (true, false) => (ground_feasible, 0.0, demand - ground_feasible),
            (false, true) => (0.0, orbital_feasible, demand - orbital_feasible),
            (true, true) => {
                let mut orbit = (desired * demand).min(orbital_feasible);
                let mut ground = ((1.0 - desired) * demand).min(ground_feasible);
                let mut residual = (demand - orbit - ground).max(0.0);
                // Cheaper side takes leftover demand first.
                let orbit_first = cost_ratio < 1.0;
                for take_orbit in [orbit_first, !orbit_first] {
                    if residual <= 0.0 {
                        break;
                    }
                    if take_orbit {
                        let extra = (orbital_feasible - orbit).max(0.0).min(residual);
                        orbit += extra;
                        residual -= extra;
                    } else {
                        let extra = (ground_feasible - ground).max(0.0).min(residual);
                        ground += extra;
                        residual -= extra;
                    }
                }
                (ground, orbit, residual)
            }
        };

        let total_served = (demand - residual).max(0.0);
        let (ground_share, orbital_share) = served_shares(inputs.year, ground_served, orbital_served, total_served)?;

        Ok(MarketAllocation {
            year: inputs.year,
            demand_gw: demand,
            cost_ratio,
            desired_orbital_share: desired,
            queue_pressure: pressure,
            ground_feasible_gw: ground_feasible,
            orbital_feasible_gw: orbital_feasible,
            ground_served_gw: ground_served,
            orbital_served_gw: orbital_served,
            total_served_gw: total_served,
            unserved_gw: residual.max(0.0),
            ground_share,
            orbital_share,
        })
    }
}
