use serde::Serialize;
use tracing::warn;

use crate::config::constants::*;
use crate::config::year_params::YearParams;
use crate::core::errors::SimResult;
use crate::core::validation::Diagnostics;
use crate::models::orbital::{OrbitalPhysicsModel, SatelliteHybridCostResult};
use crate::utils::logging::{start_timing, OperationCategory};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstellationDesign {
    pub num_satellites: u64,
    pub power_per_sat_kw: f64,
    pub compute_per_sat_kw: f64,
    pub mass_per_sat_kg: f64,
    pub radiator_area_per_sat_m2: f64,
    pub sats_per_launch: u64,
    pub launches_required: u64,
    pub constellation_overhead: f64,
    pub scaling_efficiency: f64,
    pub resplit_count: u8,
    pub warnings: Vec<String>,
}

impl ConstellationDesign {
    /// One-satellite design, for costing a satellite outside a sized constellation.
    pub fn single(satellite: &SatelliteHybridCostResult, scaling_efficiency: f64) -> Self {
        Self {
            num_satellites: 1,
            power_per_sat_kw: satellite.power_kw,
            compute_per_sat_kw: satellite.compute_kw,
            mass_per_sat_kg: satellite.total_mass_kg,
            radiator_area_per_sat_m2: satellite.radiator_area_m2,
            sats_per_launch: 1,
            launches_required: 1,
            constellation_overhead: CONSTELLATION_SPARES_OVERHEAD,
            scaling_efficiency,
            resplit_count: 0,
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizedConstellation {
    pub design: ConstellationDesign,
    pub satellite: SatelliteHybridCostResult,
}

pub fn scaling_efficiency(num_satellites: u64) -> f64 {
    let n = num_satellites.max(1) as f64;
    (1.0 - SCALING_EFFICIENCY_LOSS_PER_DECADE * n.log10()).max(MIN_SCALING_EFFICIENCY)
}

pub struct ConstellationSizer<'a> {
    physics: &'a OrbitalPhysicsModel,
}

impl<'a> ConstellationSizer<'a> {
    pub fn new(physics: &'a OrbitalPhysicsModel) -> Self {
        Self { physics }
    }

    /// Splits `params.target_compute_gw` into satellites. A satellite over the
    /// mass ceiling is shrunk and re-sized once; if it is still too heavy the
    /// design carries a warning instead of looping.
    pub fn size(
        &self,
        params: &YearParams,
        launch_cost_per_kg: f64,
        diagnostics: &mut Diagnostics,
    ) -> SimResult<SizedConstellation> {
        let _timing = start_timing("size_constellation", OperationCategory::Constellation);
        let config = self.physics.config();
        let ceiling = config.max_satellite_mass_kg;

        let mut warnings = Vec::new();
        let mut resplit_count = 0u8;
        let mut satellite = self.physics.compute_satellite(params, launch_cost_per_kg, diagnostics)?;

        if satellite.total_mass_kg > ceiling {
            let shrink = RESPLIT_SAFETY_FACTOR * ceiling / satellite.total_mass_kg;
            let mut resized = params.clone();
            resized.satellite_power_kw = params.satellite_power_kw * shrink;
            warn!(
                year = params.year,
                mass_kg = satellite.total_mass_kg,
                ceiling_kg = ceiling,
                new_power_kw = resized.satellite_power_kw,
                "satellite over mass ceiling, re-splitting"
            );
            resplit_count = 1;
            satellite = self.physics.compute_satellite(&resized, launch_cost_per_kg, diagnostics)?;

            if satellite.total_mass_kg > ceiling {
                let message = format!(
                    "[{}] satellite mass {:.0} kg still exceeds {:.0} kg ceiling after re-split",
                    params.year, satellite.total_mass_kg, ceiling
                );
                diagnostics.note(message.clone());
                warnings.push(message);
            }
        }

        let target_kw = params.target_compute_gw * 1e6;
        let num_satellites = ((target_kw / satellite.power_kw).ceil() as u64).max(1);
        let sats_per_launch = ((config.launch_vehicle_payload_kg / satellite.total_mass_kg).floor() as u64).max(1);
        let launches_required = num_satellites.div_ceil(sats_per_launch);

        let design = ConstellationDesign {
            num_satellites,
            power_per_sat_kw: satellite.power_kw,
            compute_per_sat_kw: satellite.compute_kw,
            mass_per_sat_kg: satellite.total_mass_kg,
            radiator_area_per_sat_m2: satellite.radiator_area_m2,
            sats_per_launch,
            launches_required,
            constellation_overhead: CONSTELLATION_SPARES_OVERHEAD,
            scaling_efficiency: scaling_efficiency(num_satellites),
            resplit_count,
            warnings,
        };
        Ok(SizedConstellation { design, satellite })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::simulation_config::{OrbitalConfig, StrictnessMode};

    fn size_with_ceiling(ceiling: f64) -> SizedConstellation {
        let physics = OrbitalPhysicsModel::new(OrbitalConfig {
            max_satellite_mass_kg: ceiling,
            ..OrbitalConfig::default()
        });
        let mut diagnostics = Diagnostics::new(StrictnessMode::Strict);
        ConstellationSizer::new(&physics)
            .size(&YearParams::default_for_year(2030), 200.0, &mut diagnostics)
            .unwrap()
    }

    #[test]
    fn test_count_covers_target() {
        let sized = size_with_ceiling(MAX_SATELLITE_MASS_KG);
        let params = YearParams::default_for_year(2030);
        assert_eq!(sized.design.resplit_count, 0);
        assert!(sized.design.num_satellites as f64 * sized.design.power_per_sat_kw >= params.target_compute_gw * 1e6);
        assert!(sized.design.launches_required * sized.design.sats_per_launch >= sized.design.num_satellites);
    }

    #[test]
    fn test_heavy_satellite_resplits_once_under_ceiling() {
        let unconstrained = size_with_ceiling(MAX_SATELLITE_MASS_KG);
        let ceiling = unconstrained.satellite.total_mass_kg * 0.7;
        let sized = size_with_ceiling(ceiling);
        assert_eq!(sized.design.resplit_count, 1);
        assert!(sized.design.mass_per_sat_kg <= ceiling);
        assert!(sized.design.warnings.is_empty());
        assert!(sized.design.num_satellites > unconstrained.design.num_satellites);
    }

    #[test]
    fn test_impossible_ceiling_warns_instead_of_looping() {
        let sized = size_with_ceiling(50.0);
        assert_eq!(sized.design.resplit_count, 1);
        assert!(sized.design.mass_per_sat_kg > 50.0);
        assert_eq!(sized.design.warnings.len(), 1);
    }

    #[test]
    fn test_scaling_efficiency_bounded() {
        assert_eq!(scaling_efficiency(1), 1.0);
        assert!(scaling_efficiency(10_000) < 1.0);
        assert_eq!(scaling_efficiency(u64::MAX), MIN_SCALING_EFFICIENCY);
    }
}
