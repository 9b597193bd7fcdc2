use serde::{Deserialize, Serialize};

use crate::config::const_funcs::interpolate_by_year;
use crate::config::constants::{BASE_YEAR, MAX_SYSTEM_GFLOPS_PER_W, MIN_SYSTEM_GFLOPS_PER_W};
use crate::core::errors::{SimResult, SimulationError};

/// Static runs hold the launch cost at `launch_cost_base_per_kg`; dynamic runs
/// walk the launch model's curve from that base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ParamMode {
    Static,
    #[default]
    Dynamic,
}

/// Grid outlook for the ground side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GroundScenario {
    #[default]
    Baseline,
    Constrained,
    Abundant,
}

impl GroundScenario {
    pub fn build_rate_multiplier(&self) -> f64 {
        match self {
            GroundScenario::Baseline => 1.0,
            GroundScenario::Constrained => 0.7,
            GroundScenario::Abundant => 1.4,
        }
    }

    pub fn energy_price_multiplier(&self) -> f64 {
        match self {
            GroundScenario::Baseline => 1.0,
            GroundScenario::Constrained => 1.3,
            GroundScenario::Abundant => 0.85,
        }
    }
}

/// Independent what-if switches. All off reproduces the reference trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScenarioToggles {
    pub radiation_hardened_chips: bool,
    pub fusion_power: bool,
    pub smr_mitigation: bool,
    pub aggressive_discount: bool,
    pub global_latency: bool,
    pub space_manufacturing: bool,
    pub ai_winter: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearParams {
    pub year: u32,
    pub mode: ParamMode,
    pub launch_cost_base_per_kg: f64,
    pub specific_power_w_per_kg: f64,
    pub ground_efficiency_gflops_per_w: f64,
    pub orbital_efficiency_gflops_per_w: f64,
    pub pue_ground: f64,
    pub pue_orbital: f64,
    pub capacity_factor: f64,
    pub target_compute_gw: f64,
    pub satellite_power_kw: f64,
    pub ground_scenario: GroundScenario,
    pub toggles: ScenarioToggles,
}

const SPECIFIC_POWER_TABLE: [(u32, f64); 4] = [(2025, 120.0), (2030, 160.0), (2040, 240.0), (2050, 300.0)];
const GROUND_EFFICIENCY_TABLE: [(u32, f64); 5] =
    [(2025, 600.0), (2030, 1_200.0), (2035, 2_000.0), (2040, 2_800.0), (2050, 4_000.0)];
const PUE_GROUND_TABLE: [(u32, f64); 3] = [(2025, 1.30), (2035, 1.22), (2050, 1.15)];
const TARGET_COMPUTE_TABLE: [(u32, f64); 5] =
    [(2025, 0.05), (2030, 1.0), (2035, 10.0), (2040, 40.0), (2050, 200.0)];
const ORBITAL_EFFICIENCY_RATIO: f64 = 0.9;

impl YearParams {
    pub fn default_for_year(year: u32) -> Self {
        let ground_efficiency = interpolate_by_year(&GROUND_EFFICIENCY_TABLE, year);
        Self {
            year,
            mode: ParamMode::Dynamic,
            launch_cost_base_per_kg: 1_500.0,
            specific_power_w_per_kg: interpolate_by_year(&SPECIFIC_POWER_TABLE, year),
            ground_efficiency_gflops_per_w: ground_efficiency,
            orbital_efficiency_gflops_per_w: ground_efficiency * ORBITAL_EFFICIENCY_RATIO,
            pue_ground: interpolate_by_year(&PUE_GROUND_TABLE, year),
            pue_orbital: 1.08,
            capacity_factor: 0.90,
            target_compute_gw: interpolate_by_year(&TARGET_COMPUTE_TABLE, year),
            satellite_power_kw: 100.0,
            ground_scenario: GroundScenario::Baseline,
            toggles: ScenarioToggles::default(),
        }
    }

    pub fn with_toggles(mut self, toggles: ScenarioToggles) -> Self {
        self.toggles = toggles;
        self
    }

    pub fn years_from_base(&self) -> f64 {
        self.year.saturating_sub(BASE_YEAR) as f64
    }

    pub fn validate(&self) -> SimResult<()> {
        let positive = [
            ("launch_cost_base_per_kg", self.launch_cost_base_per_kg),
            ("specific_power_w_per_kg", self.specific_power_w_per_kg),
            ("ground_efficiency_gflops_per_w", self.ground_efficiency_gflops_per_w),
            ("orbital_efficiency_gflops_per_w", self.orbital_efficiency_gflops_per_w),
            ("satellite_power_kw", self.satellite_power_kw),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimulationError::InvalidInput(format!(
                    "{} for {} must be positive and finite, got {}",
                    name, self.year, value
                )));
            }
        }
        if self.pue_ground < 1.0 || self.pue_orbital < 1.0 {
            return Err(SimulationError::InvalidInput(format!(
                "PUE below 1.0 in {} (ground {}, orbital {})",
                self.year, self.pue_ground, self.pue_orbital
            )));
        }
        if !(self.capacity_factor > 0.0 && self.capacity_factor <= 1.0) {
            return Err(SimulationError::InvalidInput(format!(
                "capacity factor {} in {} must be in (0, 1]",
                self.capacity_factor, self.year
            )));
        }
        if self.target_compute_gw < 0.0 {
            return Err(SimulationError::InvalidInput(format!(
                "negative target compute {} GW in {}",
                self.target_compute_gw, self.year
            )));
        }
        for (quantity, value) in [
            ("ground_efficiency_gflops_per_w", self.ground_efficiency_gflops_per_w),
            ("orbital_efficiency_gflops_per_w", self.orbital_efficiency_gflops_per_w),
        ] {
            if !(MIN_SYSTEM_GFLOPS_PER_W..=MAX_SYSTEM_GFLOPS_PER_W).contains(&value) {
                return Err(SimulationError::UnitRange {
                    year: self.year,
                    path: "year_params",
                    quantity,
                    value,
                    min: MIN_SYSTEM_GFLOPS_PER_W,
                    max: MAX_SYSTEM_GFLOPS_PER_W,
                });
            }
        }
        Ok(())
    }
}

/// Default parameter rows for every year in `start..=end`.
pub fn default_trajectory(start: u32, end: u32, toggles: ScenarioToggles) -> Vec<YearParams> {
    (start..=end)
        .map(|year| YearParams::default_for_year(year).with_toggles(toggles))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rows_validate() {
        for params in default_trajectory(2025, 2050, ScenarioToggles::default()) {
            assert!(params.validate().is_ok(), "year {} invalid", params.year);
        }
    }

    #[test]
    fn test_efficiency_improves_over_time() {
        let early = YearParams::default_for_year(2025);
        let late = YearParams::default_for_year(2050);
        assert!(late.ground_efficiency_gflops_per_w > early.ground_efficiency_gflops_per_w);
        assert!(late.specific_power_w_per_kg > early.specific_power_w_per_kg);
    }

    #[test]
    fn test_bad_capacity_factor_rejected() {
        let mut params = YearParams::default_for_year(2030);
        params.capacity_factor = 1.5;
        assert!(matches!(params.validate(), Err(SimulationError::InvalidInput(_))));
    }

    #[test]
    fn test_out_of_band_efficiency_is_unit_error() {
        let mut params = YearParams::default_for_year(2030);
        params.orbital_efficiency_gflops_per_w = 9_000.0;
        assert!(matches!(params.validate(), Err(SimulationError::UnitRange { .. })));
    }
}
