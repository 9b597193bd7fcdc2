use serde::Serialize;

use crate::config::const_funcs::calc_capital_recovery_factor;
use crate::config::constants::*;
use crate::config::simulation_config::FinanceConfig;
use crate::core::errors::{SimResult, SimulationError};
use crate::models::constellation::ConstellationDesign;

use super::SatelliteHybridCostResult;

/// Orbital cost in $/PFLOP-year of delivered compute. Orbit carries no grid
/// scarcity, so `base_total` and `effective_total` coincide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitalCostBreakdown {
    pub year: u32,
    pub power: f64,
    pub compute_payload: f64,
    pub thermal: f64,
    pub radiation_shielding: f64,
    pub bus: f64,
    pub networking: f64,
    pub interconnect: f64,
    pub regulatory: f64,
    pub launch: f64,
    pub operations: f64,
    pub replacement: f64,
    pub constellation_overhead: f64,
    pub base_total: f64,
    pub effective_total: f64,
    pub delivered_pflops_per_sat: f64,
    pub capital_recovery_factor: f64,
}

impl OrbitalCostBreakdown {
    pub fn components(&self) -> [(&'static str, f64); 12] {
        [
            ("power", self.power),
            ("compute_payload", self.compute_payload),
            ("thermal", self.thermal),
            ("radiation_shielding", self.radiation_shielding),
            ("bus", self.bus),
            ("networking", self.networking),
            ("interconnect", self.interconnect),
            ("regulatory", self.regulatory),
            ("launch", self.launch),
            ("operations", self.operations),
            ("replacement", self.replacement),
            ("constellation_overhead", self.constellation_overhead),
        ]
    }

    pub fn replacement_cost_per_pflop_year(&self) -> f64 {
        self.replacement
    }
}

pub fn compute_orbital_cost(
    satellite: &SatelliteHybridCostResult,
    design: &ConstellationDesign,
    launch_price_per_kg: f64,
    finance: &FinanceConfig,
) -> SimResult<OrbitalCostBreakdown> {
    let year = satellite.year;
    let delivered = satellite.effective_pflops * design.scaling_efficiency;
    if !(delivered.is_finite() && delivered > 0.0) {
        return Err(SimulationError::PhysicalInfeasibility {
            year,
            path: "orbital.cost",
            description: format!("satellite delivers {} PFLOPS", delivered),
        });
    }

    let crf = calc_capital_recovery_factor(finance.base_wacc, MISSION_LIFETIME_YEARS);
    let per_pflop_year = |capex: f64| capex * crf / delivered;
    let cost = &satellite.cost;

    let power = per_pflop_year(cost.power);
    let compute_payload = per_pflop_year(cost.compute_payload);
    let thermal = per_pflop_year(cost.thermal);
    let radiation_shielding = per_pflop_year(cost.radiation_shielding);
    let bus = per_pflop_year(cost.bus);
    let networking = per_pflop_year(cost.networking);
    let interconnect = per_pflop_year(cost.interconnect);
    let regulatory = per_pflop_year(cost.regulatory);
    let launch = per_pflop_year(satellite.total_mass_kg * launch_price_per_kg);
    let operations = ORBITAL_OPS_COST_PER_SAT_YEAR / delivered;
    let replacement = satellite.annual_replacement_cost_usd / delivered;

    let direct = power
        + compute_payload
        + thermal
        + radiation_shielding
        + bus
        + networking
        + interconnect
        + regulatory
        + launch
        + operations
        + replacement;
    let constellation_overhead = direct * design.constellation_overhead;
    let total = direct + constellation_overhead;

    Ok(OrbitalCostBreakdown {
        year,
        power,
        compute_payload,
        thermal,
        radiation_shielding,
        bus,
        networking,
        interconnect,
        regulatory,
        launch,
        operations,
        replacement,
        constellation_overhead,
        base_total: total,
        effective_total: total,
        delivered_pflops_per_sat: delivered,
        capital_recovery_factor: crf,
    })
}
