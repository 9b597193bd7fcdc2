use serde::Serialize;

use crate::config::const_funcs::calc_hardware_cost_per_pflop;
use crate::config::constants::*;
use crate::config::simulation_config::OrbitalConfig;
use crate::config::year_params::YearParams;
use crate::core::errors::{SimResult, SimulationError};

/// Accelerator generation flown from `from_year` onwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChipGeneration {
    pub name: &'static str,
    pub from_year: u32,
    pub annual_failure_rate: f64,
    pub radiation_degradation_per_year: f64,
    pub ecc_overhead: f64,
    pub mass_per_kw: f64,
    pub qualification_premium: f64,
}

pub const CHIP_GENERATIONS: [ChipGeneration; 4] = [
    ChipGeneration {
        name: "Gen1-COTS",
        from_year: 2025,
        annual_failure_rate: 0.09,
        radiation_degradation_per_year: 0.020,
        ecc_overhead: 0.10,
        mass_per_kw: 5.0,
        qualification_premium: 1.30,
    },
    ChipGeneration {
        name: "Gen2-Hardened-COTS",
        from_year: 2030,
        annual_failure_rate: 0.06,
        radiation_degradation_per_year: 0.015,
        ecc_overhead: 0.07,
        mass_per_kw: 4.0,
        qualification_premium: 1.20,
    },
    ChipGeneration {
        name: "Gen3-Space-Native",
        from_year: 2035,
        annual_failure_rate: 0.04,
        radiation_degradation_per_year: 0.010,
        ecc_overhead: 0.05,
        mass_per_kw: 3.2,
        qualification_premium: 1.12,
    },
    ChipGeneration {
        name: "Gen4-Chiplet",
        from_year: 2042,
        annual_failure_rate: 0.03,
        radiation_degradation_per_year: 0.008,
        ecc_overhead: 0.04,
        mass_per_kw: 2.6,
        qualification_premium: 1.08,
    },
];

pub fn chip_generation_for_year(year: u32) -> &'static ChipGeneration {
    CHIP_GENERATIONS
        .iter()
        .rev()
        .find(|generation| year >= generation.from_year)
        .unwrap_or(&CHIP_GENERATIONS[0])
}

/// Mean surviving fraction over a mission for a constant annual failure probability.
pub fn average_survival(annual_failure_rate: f64, lifetime_years: f64) -> f64 {
    let rate = annual_failure_rate.clamp(0.0, 0.999_999);
    if rate <= 0.0 || lifetime_years <= 0.0 {
        return 1.0;
    }
    let hazard_life = -(1.0 - rate).ln() * lifetime_years;
    (1.0 - (-hazard_life).exp()) / hazard_life
}

/// Mean throughput retained under linear radiation degradation.
pub fn average_radiation_factor(degradation_per_year: f64, lifetime_years: f64) -> f64 {
    (1.0 - degradation_per_year * lifetime_years / 2.0).max(0.5)
}

/// Expected yearly spend on replacing failed compute hardware.
pub fn replacement_cost_per_year(hardware_cost_usd: f64, failure_rate: f64, config: &OrbitalConfig) -> f64 {
    hardware_cost_usd * failure_rate * (1.0 - config.repairability_fraction) * config.spares_multiplier
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputePayload {
    pub generation: &'static str,
    pub compute_kw: f64,
    pub chip_count: u64,
    pub active_chip_kw: f64,
    pub system_gflops_per_w: f64,
    pub nominal_pflops: f64,
    pub hardware_cost_usd: f64,
    pub mass_kg: f64,
    pub annual_failure_rate: f64,
    pub survival_factor: f64,
    pub radiation_factor: f64,
    pub ecc_factor: f64,
    pub hardware_degradation_factor: f64,
    pub annual_replacement_cost_usd: f64,
}

pub fn size_payload(params: &YearParams, config: &OrbitalConfig, compute_kw: f64) -> SimResult<ComputePayload> {
    let year = params.year;
    let chip_count = (compute_kw / CHIP_POWER_KW).floor().max(0.0) as u64;
    if chip_count == 0 {
        return Err(SimulationError::PhysicalInfeasibility {
            year,
            path: "orbital.payload",
            description: format!(
                "{:.3} kW of compute power fits zero {:.1} kW chips",
                compute_kw, CHIP_POWER_KW
            ),
        });
    }

    let generation = chip_generation_for_year(year);
    let rad_hard = params.toggles.radiation_hardened_chips;

    let mut system_gflops_per_w = params.orbital_efficiency_gflops_per_w;
    if rad_hard {
        system_gflops_per_w *= RAD_HARD_EFFICIENCY_MULTIPLIER;
    }
    if !(MIN_SYSTEM_GFLOPS_PER_W..=MAX_SYSTEM_GFLOPS_PER_W).contains(&system_gflops_per_w) {
        return Err(SimulationError::UnitRange {
            year,
            path: "orbital.payload",
            quantity: "system_gflops_per_w",
            value: system_gflops_per_w,
            min: MIN_SYSTEM_GFLOPS_PER_W,
            max: MAX_SYSTEM_GFLOPS_PER_W,
        });
    }

    let active_chip_kw = chip_count as f64 * CHIP_POWER_KW;
    let nominal_pflops = active_chip_kw * 1_000.0 * system_gflops_per_w / 1e6;

    let mut hardware_cost_usd = nominal_pflops
        * calc_hardware_cost_per_pflop(year)
        * generation.qualification_premium
        * config.chip_cost_multiplier;
    if rad_hard {
        hardware_cost_usd *= RAD_HARD_COST_MULTIPLIER;
    }

    let mut annual_failure_rate = config
        .failure_rate_override
        .unwrap_or(generation.annual_failure_rate * config.failure_rate_multiplier);
    if rad_hard && config.failure_rate_override.is_none() {
        annual_failure_rate *= RAD_HARD_FAILURE_MULTIPLIER;
    }
    let annual_failure_rate = annual_failure_rate.clamp(0.0, 0.99);

    let survival_factor = average_survival(annual_failure_rate, MISSION_LIFETIME_YEARS);
    let radiation_per_year = if rad_hard {
        generation.radiation_degradation_per_year * RAD_HARD_FAILURE_MULTIPLIER
    } else {
        generation.radiation_degradation_per_year
    };
    let radiation_factor = average_radiation_factor(radiation_per_year, MISSION_LIFETIME_YEARS);
    let ecc_factor = 1.0 - generation.ecc_overhead;

    Ok(ComputePayload {
        generation: generation.name,
        compute_kw,
        chip_count,
        active_chip_kw,
        system_gflops_per_w,
        nominal_pflops,
        hardware_cost_usd,
        mass_kg: active_chip_kw * generation.mass_per_kw,
        annual_failure_rate,
        survival_factor,
        radiation_factor,
        ecc_factor,
        hardware_degradation_factor: survival_factor * radiation_factor * ecc_factor,
        annual_replacement_cost_usd: replacement_cost_per_year(hardware_cost_usd, annual_failure_rate, config),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::year_params::ScenarioToggles;

    #[test]
    fn test_generation_lookup() {
        assert_eq!(chip_generation_for_year(2025).name, "Gen1-COTS");
        assert_eq!(chip_generation_for_year(2031).name, "Gen2-Hardened-COTS");
        assert_eq!(chip_generation_for_year(2050).name, "Gen4-Chiplet");
        assert_eq!(chip_generation_for_year(2000).name, "Gen1-COTS");
    }

    #[test]
    fn test_survival_bounds() {
        assert_eq!(average_survival(0.0, 6.0), 1.0);
        let survival = average_survival(0.1, 6.0);
        assert!(survival > 0.0 && survival < 1.0);
        assert!(average_survival(0.2, 6.0) < survival);
    }

    #[test]
    fn test_zero_chips_is_infeasible() {
        let params = YearParams::default_for_year(2030);
        let result = size_payload(&params, &OrbitalConfig::default(), 0.5);
        assert!(matches!(result, Err(SimulationError::PhysicalInfeasibility { .. })));
    }

    #[test]
    fn test_rad_hard_trades_efficiency_for_reliability() {
        let config = OrbitalConfig::default();
        let params = YearParams::default_for_year(2030);
        let hardened = params.clone().with_toggles(ScenarioToggles {
            radiation_hardened_chips: true,
            ..ScenarioToggles::default()
        });
        let cots = size_payload(&params, &config, 90.0).unwrap();
        let rad = size_payload(&hardened, &config, 90.0).unwrap();
        assert!(rad.system_gflops_per_w < cots.system_gflops_per_w);
        assert!(rad.annual_failure_rate < cots.annual_failure_rate);
        assert!(rad.hardware_cost_usd > cots.hardware_cost_usd);
    }

    #[test]
    fn test_replacement_scales_with_failure_rate() {
        let config = OrbitalConfig::default();
        let low = replacement_cost_per_year(1e6, 0.05, &config);
        let high = replacement_cost_per_year(1e6, 0.10, &config);
        assert!((high / low - 2.0).abs() < 1e-9);
    }
}
