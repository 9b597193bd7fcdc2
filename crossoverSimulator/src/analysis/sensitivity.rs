//! One-at-a-time sensitivity sweeps around the configured baseline.

use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use crate::config::simulation_config::SimulationConfig;
use crate::config::year_params::YearParams;
use crate::core::trajectory::TrajectoryRunner;
use crate::utils::logging::{start_timing, OperationCategory};

pub const DEFAULT_SWING: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SensitivityParameter {
    LaunchCost,
    FailureRate,
    SolarCost,
    ChipCost,
    EnergyPrice,
    GroundHardwareCost,
    SatellitePower,
    SpecificPower,
}

impl SensitivityParameter {
    pub const ALL: [SensitivityParameter; 8] = [
        SensitivityParameter::LaunchCost,
        SensitivityParameter::FailureRate,
        SensitivityParameter::SolarCost,
        SensitivityParameter::ChipCost,
        SensitivityParameter::EnergyPrice,
        SensitivityParameter::GroundHardwareCost,
        SensitivityParameter::SatellitePower,
        SensitivityParameter::SpecificPower,
    ];

    /// Scales this parameter by `multiplier` in a copy of the inputs.
    pub fn apply(&self, config: &SimulationConfig, params: &[YearParams], multiplier: f64) -> (SimulationConfig, Vec<YearParams>) {
        let mut config = config.clone();
        let mut params = params.to_vec();
        match self {
            SensitivityParameter::LaunchCost => config.orbital.launch_cost_multiplier *= multiplier,
            SensitivityParameter::FailureRate => config.orbital.failure_rate_multiplier *= multiplier,
            SensitivityParameter::SolarCost => config.orbital.solar_learning_multiplier *= multiplier,
            SensitivityParameter::ChipCost => config.orbital.chip_cost_multiplier *= multiplier,
            SensitivityParameter::EnergyPrice => config.finance.energy_price_multiplier *= multiplier,
            SensitivityParameter::GroundHardwareCost => config.finance.hardware_cost_multiplier *= multiplier,
            SensitivityParameter::SatellitePower => {
                params.iter_mut().for_each(|row| row.satellite_power_kw *= multiplier)
            }
            SensitivityParameter::SpecificPower => {
                params.iter_mut().for_each(|row| row.specific_power_w_per_kg *= multiplier)
            }
        }
        (config, params)
    }
}

impl fmt::Display for SensitivityParameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SensitivityParameter::LaunchCost => write!(f, "Launch cost"),
            SensitivityParameter::FailureRate => write!(f, "Failure rate"),
            SensitivityParameter::SolarCost => write!(f, "Solar array cost"),
            SensitivityParameter::ChipCost => write!(f, "Chip cost"),
            SensitivityParameter::EnergyPrice => write!(f, "Ground energy price"),
            SensitivityParameter::GroundHardwareCost => write!(f, "Ground hardware cost"),
            SensitivityParameter::SatellitePower => write!(f, "Satellite power"),
            SensitivityParameter::SpecificPower => write!(f, "Array specific power"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityEntry {
    pub parameter: SensitivityParameter,
    pub low_multiplier: f64,
    pub high_multiplier: f64,
    pub low_crossover: Option<u32>,
    pub base_crossover: Option<u32>,
    pub high_crossover: Option<u32>,
    /// Orbit/ground effective cost ratio in the final year, low and high.
    pub low_final_ratio: Option<f64>,
    pub high_final_ratio: Option<f64>,
    /// Error that stopped the low or high run; its crossover and ratio are then `None`.
    pub low_failure: Option<String>,
    pub high_failure: Option<String>,
}

impl SensitivityEntry {
    pub fn failed(&self) -> bool {
        self.low_failure.is_some() || self.high_failure.is_some()
    }

    /// Crossover-year spread between the two ends; `None` if either end never crosses.
    pub fn swing_years(&self) -> Option<u32> {
        match (self.low_crossover, self.high_crossover) {
            (Some(low), Some(high)) => Some(low.abs_diff(high)),
            _ => None,
        }
    }

    pub fn ratio_swing(&self) -> f64 {
        match (self.low_final_ratio, self.high_final_ratio) {
            (Some(low), Some(high)) => (high - low).abs(),
            _ => f64::INFINITY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct SweepPoint {
    crossover: Option<u32>,
    final_ratio: Option<f64>,
    failure: Option<String>,
}

fn run_point(parameter: Option<SensitivityParameter>, multiplier: f64, config: SimulationConfig, params: &[YearParams]) -> SweepPoint {
    match TrajectoryRunner::new(config).run(params) {
        Ok(trajectory) => SweepPoint {
            crossover: trajectory.crossover_year,
            final_ratio: trajectory.years.last().map(|year| year.cost_ratio()),
            failure: None,
        },
        Err(error) => {
            warn!(
                parameter = ?parameter,
                multiplier,
                error = %error,
                "sensitivity run failed"
            );
            SweepPoint {
                failure: Some(error.to_string()),
                ..SweepPoint::default()
            }
        }
    }
}

pub struct SensitivityAnalyzer {
    base: SimulationConfig,
    swing: f64,
}

impl SensitivityAnalyzer {
    pub fn new(base: SimulationConfig, swing: f64) -> Self {
        Self { base, swing: swing.clamp(0.0, 0.95) }
    }

    pub fn sweep(&self, parameter: SensitivityParameter, params: &[YearParams], base_crossover: Option<u32>) -> SensitivityEntry {
        let low_multiplier = 1.0 - self.swing;
        let high_multiplier = 1.0 + self.swing;
        let (low_config, low_params) = parameter.apply(&self.base, params, low_multiplier);
        let (high_config, high_params) = parameter.apply(&self.base, params, high_multiplier);
        let low = run_point(Some(parameter), low_multiplier, low_config, &low_params);
        let high = run_point(Some(parameter), high_multiplier, high_config, &high_params);

        SensitivityEntry {
            parameter,
            low_multiplier,
            high_multiplier,
            low_crossover: low.crossover,
            base_crossover,
            high_crossover: high.crossover,
            low_final_ratio: low.final_ratio,
            high_final_ratio: high.final_ratio,
            low_failure: low.failure,
            high_failure: high.failure,
        }
    }

    /// Every parameter swept, widest final-year ratio swing first (tornado order).
    pub fn run(&self, params: &[YearParams], parallel: bool) -> Vec<SensitivityEntry> {
        let _timing = start_timing("run_sensitivity", OperationCategory::Analysis);
        let base_crossover = run_point(None, 1.0, self.base.clone(), params).crossover;

        let mut entries: Vec<SensitivityEntry> = if parallel {
            SensitivityParameter::ALL
                .par_iter()
                .map(|parameter| self.sweep(*parameter, params, base_crossover))
                .collect()
        } else {
            SensitivityParameter::ALL
                .iter()
                .map(|parameter| self.sweep(*parameter, params, base_crossover))
                .collect()
        };
        entries.sort_by(|a, b| b.ratio_swing().total_cmp(&a.ratio_swing()));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::year_params::{default_trajectory, ScenarioToggles};

    #[test]
    fn test_apply_touches_only_its_parameter() {
        let config = SimulationConfig::default();
        let params = default_trajectory(2025, 2027, ScenarioToggles::default());
        let (scaled, rows) = SensitivityParameter::SatellitePower.apply(&config, &params, 1.2);
        assert_eq!(scaled.orbital.launch_cost_multiplier, 1.0);
        assert!((rows[0].satellite_power_kw - params[0].satellite_power_kw * 1.2).abs() < 1e-9);

        let (scaled, rows) = SensitivityParameter::LaunchCost.apply(&config, &params, 0.8);
        assert!((scaled.orbital.launch_cost_multiplier - 0.8).abs() < 1e-12);
        assert_eq!(rows, params);
    }

    #[test]
    fn test_swing_years() {
        let entry = SensitivityEntry {
            parameter: SensitivityParameter::LaunchCost,
            low_multiplier: 0.8,
            high_multiplier: 1.2,
            low_crossover: Some(2036),
            base_crossover: Some(2038),
            high_crossover: Some(2041),
            low_final_ratio: Some(0.5),
            high_final_ratio: Some(0.7),
            low_failure: None,
            high_failure: None,
        };
        assert_eq!(entry.swing_years(), Some(5));
        assert!((entry.ratio_swing() - 0.2).abs() < 1e-12);
        assert!(!entry.failed());
    }

    #[test]
    fn test_launch_cost_sweep_orders_final_ratio() {
        let analyzer = SensitivityAnalyzer::new(SimulationConfig::default(), DEFAULT_SWING);
        // Early years: launch dominates the orbital bill and the fleet is tiny.
        let params = default_trajectory(2025, 2030, ScenarioToggles::default());
        let entry = analyzer.sweep(SensitivityParameter::LaunchCost, &params, None);
        assert!(entry.low_final_ratio.unwrap() < entry.high_final_ratio.unwrap());
        assert!(!entry.failed());
    }

    #[test]
    fn test_failed_point_is_recorded_not_hidden() {
        let analyzer = SensitivityAnalyzer::new(SimulationConfig::default(), DEFAULT_SWING);
        let mut params = default_trajectory(2025, 2027, ScenarioToggles::default());
        // 0.9 kW fits one 0.7 kW chip; the low end (0.72 kW) fits none.
        params.iter_mut().for_each(|row| row.satellite_power_kw = 0.9);
        let entry = analyzer.sweep(SensitivityParameter::SatellitePower, &params, None);

        assert!(entry.failed());
        let failure = entry.low_failure.as_deref().unwrap();
        assert!(failure.contains("zero"), "{}", failure);
        assert_eq!(entry.low_crossover, None);
        assert_eq!(entry.low_final_ratio, None);
    }
}
