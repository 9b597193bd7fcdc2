use serde::{Deserialize, Serialize};

use crate::config::const_funcs::calc_growth_factor;
use crate::config::simulation_config::FleetConfig;
use crate::models::constellation::ConstellationDesign;

/// Orbital capacity actually in service. Threaded year to year like the grid state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalFleetState {
    pub year: u32,
    pub deployed_gw: f64,
    pub cumulative_launched_kg: f64,
}

impl OrbitalFleetState {
    pub fn empty(year: u32) -> Self {
        Self {
            year,
            deployed_gw: 0.0,
            cumulative_launched_kg: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FleetStep {
    pub state: OrbitalFleetState,
    pub launched_kg: f64,
    pub added_gw: f64,
    pub launch_capacity_kg: f64,
}

/// Launch mass available to compute deployments in `year`.
pub fn launch_capacity_kg(config: &FleetConfig, year: u32) -> f64 {
    config.launch_mass_kg_2025 * calc_growth_factor(config.launch_mass_growth, year)
}

/// Adds the GW that this year's launch capacity can carry, scaled by how much of
/// the market wanted orbit last year (never below the pilot share), and capped
/// at the year's orbital compute target.
pub fn step_fleet(
    previous: &OrbitalFleetState,
    year: u32,
    design: &ConstellationDesign,
    desired_orbital_share: f64,
    target_compute_gw: f64,
    config: &FleetConfig,
) -> FleetStep {
    let capacity_kg = launch_capacity_kg(config, year);
    let gw_per_kg = if design.mass_per_sat_kg > 0.0 {
        design.power_per_sat_kw / design.mass_per_sat_kg / 1e6
    } else {
        0.0
    };
    let share = desired_orbital_share.clamp(0.0, 1.0).max(config.pilot_deployment_share);
    let launchable_gw = capacity_kg * gw_per_kg * share;

    let ceiling = target_compute_gw.max(0.0);
    let deployed_gw = (previous.deployed_gw + launchable_gw).min(ceiling.max(previous.deployed_gw));
    let added_gw = (deployed_gw - previous.deployed_gw).max(0.0);
    let launched_kg = if gw_per_kg > 0.0 { added_gw / gw_per_kg } else { 0.0 };

    FleetStep {
        state: OrbitalFleetState {
            year,
            deployed_gw,
            cumulative_launched_kg: previous.cumulative_launched_kg + launched_kg,
        },
        launched_kg,
        added_gw,
        launch_capacity_kg: capacity_kg,
    }
}
