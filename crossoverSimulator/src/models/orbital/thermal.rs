//! Radiator sizing from Stefan-Boltzmann rejection against a warm sink.

use serde::{Deserialize, Serialize};

use crate::config::const_funcs::calc_learning_factor;
use crate::config::constants::*;
use crate::core::errors::{SimResult, SimulationError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalDesign {
    pub waste_heat_kw: f64,
    pub net_flux_w_per_m2: f64,
    pub required_area_m2: f64,
    pub area_limit_m2: f64,
    pub installed_area_m2: f64,
    pub max_rejectable_kw: f64,
    pub thermal_cap_factor: f64,
    pub mass_kg: f64,
    pub cost_usd: f64,
}

/// Net rejected flux per m² of panel, both faces, after view factor and fouling.
pub fn net_flux_w_per_m2() -> f64 {
    RADIATOR_EMISSIVITY
        * STEFAN_BOLTZMANN
        * (RADIATOR_TEMP_K.powi(4) - SINK_TEMP_K.powi(4))
        * RADIATOR_SIDES
        * RADIATOR_VIEW_FACTOR
        * (1.0 - RADIATOR_FOULING)
}

pub fn areal_density_kg_m2(year: u32) -> f64 {
    RADIATOR_AREAL_DENSITY_KG_M2 * calc_learning_factor(RADIATOR_DENSITY_LEARNING, year)
}

/// Sizes the radiator for `waste_heat_kw`. Installed area is limited by the
/// deployable ceiling and by a mass allowance tied to `host_mass_kg`
/// (power system plus payload). When the limit binds, the cap factor derates
/// compute; below the floor the design is rejected unless overridden.
pub fn size_radiator(
    year: u32,
    waste_heat_kw: f64,
    host_mass_kg: f64,
    structure_mass_factor: f64,
    allow_override: bool,
) -> SimResult<ThermalDesign> {
    let flux = net_flux_w_per_m2();
    let density = areal_density_kg_m2(year) * structure_mass_factor;
    let required_area_m2 = waste_heat_kw * 1_000.0 / flux * RADIATOR_MARGIN;
    let mass_limited_area = RADIATOR_MASS_ALLOWANCE * host_mass_kg / density;
    let area_limit_m2 = MAX_DEPLOYABLE_RADIATOR_M2.min(mass_limited_area);
    let installed_area_m2 = required_area_m2.min(area_limit_m2);
    let max_rejectable_kw = installed_area_m2 * flux / 1_000.0;

    let thermal_cap_factor = if waste_heat_kw <= 0.0 {
        1.0
    } else {
        (max_rejectable_kw / waste_heat_kw).clamp(0.0, 1.0)
    };

    if thermal_cap_factor < THERMAL_CAP_FLOOR && !allow_override {
        return Err(SimulationError::ThermalInfeasible {
            year,
            max_rejectable_kw,
            waste_heat_kw,
            cap_factor: thermal_cap_factor,
            floor: THERMAL_CAP_FLOOR,
        });
    }

    let cost_per_m2 = RADIATOR_COST_PER_M2 * calc_learning_factor(RADIATOR_COST_LEARNING, year);
    Ok(ThermalDesign {
        waste_heat_kw,
        net_flux_w_per_m2: flux,
        required_area_m2,
        area_limit_m2,
        installed_area_m2,
        max_rejectable_kw,
        thermal_cap_factor,
        mass_kg: installed_area_m2 * density,
        cost_usd: installed_area_m2 * cost_per_m2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flux_is_plausible() {
        let flux = net_flux_w_per_m2();
        assert!(flux > 500.0 && flux < 900.0, "flux {}", flux);
    }

    #[test]
    fn test_unconstrained_radiator_has_full_cap() {
        let design = size_radiator(2030, 100.0, 2_000.0, 1.0, false).unwrap();
        assert_eq!(design.thermal_cap_factor, 1.0);
        assert!(design.installed_area_m2 >= 100_000.0 / design.net_flux_w_per_m2);
    }

    #[test]
    fn test_oversized_heat_load_is_infeasible() {
        // 10 MW against a 2500 m² ceiling rejects well under 20% of the heat.
        let result = size_radiator(2030, 10_000.0, 100_000.0, 1.0, false);
        assert!(matches!(result, Err(SimulationError::ThermalInfeasible { .. })));
    }

    #[test]
    fn test_override_allows_derated_design() {
        let design = size_radiator(2030, 10_000.0, 100_000.0, 1.0, true).unwrap();
        assert!(design.thermal_cap_factor < THERMAL_CAP_FLOOR);
        assert_eq!(design.installed_area_m2, MAX_DEPLOYABLE_RADIATOR_M2);
    }

    #[test]
    fn test_mass_allowance_derates() {
        let light_host = size_radiator(2025, 100.0, 200.0, 1.0, false).unwrap();
        assert!(light_host.thermal_cap_factor < 1.0);
        assert!(light_host.thermal_cap_factor >= THERMAL_CAP_FLOOR);
    }
}
