//! Per-satellite physics and cost: power, two-pass thermal, compute payload and
//! the supporting subsystems, in that order.

pub mod cost;
pub mod payload;
pub mod power;
pub mod thermal;

use serde::Serialize;
use tracing::debug;

use crate::config::const_funcs::{calc_learning_factor, relative_difference};
use crate::config::constants::*;
use crate::config::simulation_config::OrbitalConfig;
use crate::config::year_params::YearParams;
use crate::core::errors::{SimResult, SimulationError};
use crate::core::validation::{check_range, ensure_non_negative, Diagnostics};
use crate::utils::logging::{start_timing, OperationCategory};

use payload::{size_payload, ComputePayload};
use power::{select_power_system, PowerSource, PowerSystem};
use thermal::{size_radiator, ThermalDesign};

/// One value per satellite subsystem. Used for both cost ($) and mass (kg).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SubsystemLedger {
    pub power: f64,
    pub compute_payload: f64,
    pub thermal: f64,
    pub radiation_shielding: f64,
    pub bus: f64,
    pub networking: f64,
    pub interconnect: f64,
    pub regulatory: f64,
}

impl SubsystemLedger {
    pub fn components(&self) -> [(&'static str, f64); 8] {
        [
            ("power", self.power),
            ("compute_payload", self.compute_payload),
            ("thermal", self.thermal),
            ("radiation_shielding", self.radiation_shielding),
            ("bus", self.bus),
            ("networking", self.networking),
            ("interconnect", self.interconnect),
            ("regulatory", self.regulatory),
        ]
    }

    pub fn total(&self) -> f64 {
        self.components().iter().map(|(_, value)| value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatelliteHybridCostResult {
    pub year: u32,
    pub power_source: PowerSource,
    pub power_kw: f64,
    pub compute_kw: f64,
    pub chip_generation: &'static str,
    pub chip_count: u64,
    pub cost: SubsystemLedger,
    pub mass: SubsystemLedger,
    pub total_cost_usd: f64,
    pub total_mass_kg: f64,
    pub radiator_area_m2: f64,
    pub nominal_pflops: f64,
    pub effective_pflops: f64,
    pub capacity_factor: f64,
    pub first_pass_thermal_cap_factor: f64,
    pub thermal_cap_factor: f64,
    pub hardware_degradation_factor: f64,
    pub system_gflops_per_w: f64,
    pub delivered_gflops_per_w: f64,
    pub annual_failure_rate: f64,
    pub annual_replacement_cost_usd: f64,
}

/// Nominal PFLOPS after hardware degradation, thermal throttling and duty cycle.
pub fn effective_pflops(payload: &ComputePayload, thermal_cap_factor: f64, capacity_factor: f64) -> f64 {
    payload.nominal_pflops * payload.hardware_degradation_factor * thermal_cap_factor * capacity_factor
}

/// Delivered PFLOPS over the power that actually feeds chips.
pub fn delivered_gflops_per_w(payload: &ComputePayload, effective_pflops: f64) -> f64 {
    if payload.active_chip_kw > 0.0 {
        effective_pflops * 1e6 / (payload.active_chip_kw * 1_000.0)
    } else {
        0.0
    }
}

/// Chip-table efficiency times each derate taken from its own factor. Shares
/// nothing with the PFLOPS path, so a derate folded in twice there shows up as
/// a mismatch here.
pub fn expected_gflops_per_w(
    params: &YearParams,
    payload: &ComputePayload,
    thermal_cap_factor: f64,
    capacity_factor: f64,
) -> f64 {
    let mut chip_gflops_per_w = params.orbital_efficiency_gflops_per_w;
    if params.toggles.radiation_hardened_chips {
        chip_gflops_per_w *= RAD_HARD_EFFICIENCY_MULTIPLIER;
    }
    chip_gflops_per_w
        * payload.survival_factor
        * payload.radiation_factor
        * payload.ecc_factor
        * thermal_cap_factor
        * capacity_factor
}

pub fn check_delivered_efficiency(
    year: u32,
    delivered: f64,
    expected: f64,
    diagnostics: &mut Diagnostics,
) -> SimResult<()> {
    if relative_difference(delivered, expected) > EFFICIENCY_CHECK_TOLERANCE {
        diagnostics.report(SimulationError::EfficiencyMismatch {
            year,
            delivered,
            expected,
        })?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct OrbitalPhysicsModel {
    config: OrbitalConfig,
}

impl OrbitalPhysicsModel {
    pub fn new(config: OrbitalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OrbitalConfig {
        &self.config
    }

    /// Sizes one satellite drawing `params.satellite_power_kw` in `params.year`.
    pub fn compute_satellite(
        &self,
        params: &YearParams,
        launch_cost_per_kg: f64,
        diagnostics: &mut Diagnostics,
    ) -> SimResult<SatelliteHybridCostResult> {
        let _timing = start_timing("compute_satellite", OperationCategory::OrbitalPhysics);
        let year = params.year;
        let structure_factor = if params.toggles.space_manufacturing {
            SPACE_MANUFACTURING_MASS_FACTOR
        } else {
            1.0
        };

        let power: PowerSystem =
            select_power_system(params, launch_cost_per_kg, self.config.solar_learning_multiplier);

        // All bus power ends up as heat; the PUE share never reaches the chips.
        let waste_heat_kw = params.satellite_power_kw;
        let compute_kw = params.satellite_power_kw / params.pue_orbital;

        let estimated_payload_kg = compute_kw * ESTIMATED_PAYLOAD_KG_PER_KW;
        let first_pass: ThermalDesign = size_radiator(
            year,
            waste_heat_kw,
            power.mass_kg + estimated_payload_kg,
            structure_factor,
            self.config.allow_thermal_override,
        )?;

        let payload: ComputePayload = size_payload(params, &self.config, compute_kw)?;

        let thermal: ThermalDesign = size_radiator(
            year,
            waste_heat_kw,
            power.mass_kg + payload.mass_kg,
            structure_factor,
            self.config.allow_thermal_override,
        )?;

        let (cost, mass) = self.subsystem_ledgers(params, &power, &payload, &thermal, structure_factor);

        for (name, value) in cost.components().iter().chain(mass.components().iter()) {
            ensure_non_negative(year, "orbital.subsystems", name, *value)?;
        }

        let thermal_cap_factor = thermal.thermal_cap_factor.clamp(0.0, 1.0);
        let effective_pflops = effective_pflops(&payload, thermal_cap_factor, params.capacity_factor);

        let delivered_gflops_per_w = check_range(
            diagnostics,
            year,
            "orbital.delivered_efficiency",
            "delivered_gflops_per_w",
            delivered_gflops_per_w(&payload, effective_pflops),
            MIN_PLAUSIBLE_GFLOPS_PER_W,
            MAX_PLAUSIBLE_GFLOPS_PER_W,
        )?;
        let expected = expected_gflops_per_w(params, &payload, thermal_cap_factor, params.capacity_factor);
        check_delivered_efficiency(year, delivered_gflops_per_w, expected, diagnostics)?;

        debug!(
            year,
            power_source = %power.source,
            chips = payload.chip_count,
            mass_kg = mass.total(),
            cost_usd = cost.total(),
            thermal_cap = thermal_cap_factor,
            effective_pflops,
            "satellite sized"
        );

        Ok(SatelliteHybridCostResult {
            year,
            power_source: power.source,
            power_kw: params.satellite_power_kw,
            compute_kw,
            chip_generation: payload.generation,
            chip_count: payload.chip_count,
            total_cost_usd: cost.total(),
            total_mass_kg: mass.total(),
            cost,
            mass,
            radiator_area_m2: thermal.installed_area_m2,
            nominal_pflops: payload.nominal_pflops,
            effective_pflops,
            capacity_factor: params.capacity_factor,
            first_pass_thermal_cap_factor: first_pass.thermal_cap_factor,
            thermal_cap_factor,
            hardware_degradation_factor: payload.hardware_degradation_factor,
            system_gflops_per_w: payload.system_gflops_per_w,
            delivered_gflops_per_w,
            annual_failure_rate: payload.annual_failure_rate,
            annual_replacement_cost_usd: payload.annual_replacement_cost_usd,
        })
    }

    fn subsystem_ledgers(
        &self,
        params: &YearParams,
        power: &PowerSystem,
        payload: &ComputePayload,
        thermal: &ThermalDesign,
        structure_factor: f64,
    ) -> (SubsystemLedger, SubsystemLedger) {
        let year = params.year;
        let workload = self.config.workload;
        let chips = payload.chip_count as f64;

        let interconnect_cost = chips
            * INTERCONNECT_COST_PER_CHIP
            * workload.interconnect_multiplier()
            * calc_learning_factor(INTERCONNECT_LEARNING, year);
        let interconnect_mass = chips * INTERCONNECT_MASS_PER_CHIP_KG;

        let shielding_fraction = if params.toggles.radiation_hardened_chips {
            RAD_HARD_SHIELDING_MASS_FRACTION
        } else {
            SHIELDING_MASS_FRACTION
        };
        let shielding_mass = payload.mass_kg * shielding_fraction;
        let shielding_cost = shielding_mass * SHIELDING_COST_PER_KG;

        let latency = if params.toggles.global_latency {
            GLOBAL_LATENCY_NETWORK_MULTIPLIER
        } else {
            1.0
        };
        let networking_cost = NETWORKING_BASE_COST
            * workload.networking_multiplier()
            * latency
            * calc_learning_factor(NETWORKING_LEARNING, year);

        let carried_mass = power.mass_kg
            + payload.mass_kg
            + thermal.mass_kg
            + shielding_mass
            + NETWORKING_MASS_KG
            + interconnect_mass;
        let bus_mass = carried_mass * BUS_MASS_FRACTION * structure_factor;
        let bus_cost = bus_mass * BUS_COST_PER_KG * calc_learning_factor(BUS_COST_LEARNING, year);

        let hardware_cost = power.cost_usd
            + payload.hardware_cost_usd
            + thermal.cost_usd
            + shielding_cost
            + bus_cost
            + networking_cost
            + interconnect_cost;
        let regulatory_cost = REGULATORY_COST_PER_SAT + DEORBIT_RESERVE_FRACTION * hardware_cost;

        let cost = SubsystemLedger {
            power: power.cost_usd,
            compute_payload: payload.hardware_cost_usd,
            thermal: thermal.cost_usd,
            radiation_shielding: shielding_cost,
            bus: bus_cost,
            networking: networking_cost,
            interconnect: interconnect_cost,
            regulatory: regulatory_cost,
        };
        let mass = SubsystemLedger {
            power: power.mass_kg,
            compute_payload: payload.mass_kg,
            thermal: thermal.mass_kg,
            radiation_shielding: shielding_mass,
            bus: bus_mass,
            networking: NETWORKING_MASS_KG,
            interconnect: interconnect_mass,
            regulatory: 0.0,
        };
        (cost, mass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::simulation_config::StrictnessMode;
    use crate::config::year_params::ScenarioToggles;

    fn satellite(params: &YearParams) -> SatelliteHybridCostResult {
        let model = OrbitalPhysicsModel::new(OrbitalConfig::default());
        let mut diagnostics = Diagnostics::new(StrictnessMode::Strict);
        model.compute_satellite(params, 500.0, &mut diagnostics).unwrap()
    }

    #[test]
    fn test_default_satellites_are_feasible_every_year() {
        for year in 2025..=2050 {
            let result = satellite(&YearParams::default_for_year(year));
            assert!(result.thermal_cap_factor > THERMAL_CAP_FLOOR && result.thermal_cap_factor <= 1.0);
            assert!(result.effective_pflops > 0.0);
            assert!((result.cost.total() - result.total_cost_usd).abs() < 1e-6);
        }
    }

    #[test]
    fn test_derates_applied_once() {
        let params = YearParams::default_for_year(2035);
        let result = satellite(&params);
        let payload = size_payload(&params, &OrbitalConfig::default(), result.compute_kw).unwrap();
        let expected = params.orbital_efficiency_gflops_per_w
            * payload.survival_factor
            * payload.radiation_factor
            * payload.ecc_factor
            * result.thermal_cap_factor
            * result.capacity_factor;
        assert!((result.delivered_gflops_per_w - expected).abs() / expected < 1e-9);
        assert!(result.delivered_gflops_per_w < result.system_gflops_per_w);
    }

    #[test]
    fn test_double_applied_derate_is_caught() {
        let params = YearParams::default_for_year(2035);
        let mut payload = size_payload(&params, &OrbitalConfig::default(), 90.0).unwrap();
        let expected = expected_gflops_per_w(&params, &payload, 1.0, params.capacity_factor);
        let clean = delivered_gflops_per_w(&payload, effective_pflops(&payload, 1.0, params.capacity_factor));
        let mut strict = Diagnostics::new(StrictnessMode::Strict);
        assert!(check_delivered_efficiency(2035, clean, expected, &mut strict).is_ok());

        // Survival folded into the degradation factor a second time.
        payload.hardware_degradation_factor *= payload.survival_factor;
        let doubled = delivered_gflops_per_w(&payload, effective_pflops(&payload, 1.0, params.capacity_factor));
        let result = check_delivered_efficiency(2035, doubled, expected, &mut strict);
        assert!(matches!(result, Err(SimulationError::EfficiencyMismatch { .. })));

        let mut lenient = Diagnostics::new(StrictnessMode::Lenient);
        assert!(check_delivered_efficiency(2035, doubled, expected, &mut lenient).is_ok());
        assert_eq!(lenient.warnings().len(), 1);
    }

    #[test]
    fn test_thermal_derate_does_not_discount_hardware() {
        let params = YearParams::default_for_year(2030);
        let result = satellite(&params);
        let payload = size_payload(&params, &OrbitalConfig::default(), result.compute_kw).unwrap();
        assert_eq!(result.cost.compute_payload, payload.hardware_cost_usd);
    }

    #[test]
    fn test_oversized_power_budget_is_thermally_infeasible() {
        let mut params = YearParams::default_for_year(2030);
        params.satellite_power_kw = 10_000.0;
        let model = OrbitalPhysicsModel::new(OrbitalConfig::default());
        let mut diagnostics = Diagnostics::new(StrictnessMode::Lenient);
        let result = model.compute_satellite(&params, 500.0, &mut diagnostics);
        assert!(matches!(result, Err(SimulationError::ThermalInfeasible { .. })));
    }

    #[test]
    fn test_space_manufacturing_lightens_structure() {
        let params = YearParams::default_for_year(2040);
        let built = params.clone().with_toggles(ScenarioToggles {
            space_manufacturing: true,
            ..ScenarioToggles::default()
        });
        assert!(satellite(&built).mass.bus < satellite(&params).mass.bus);
    }

    #[test]
    fn test_global_latency_raises_networking_cost() {
        let params = YearParams::default_for_year(2040);
        let global = params.clone().with_toggles(ScenarioToggles {
            global_latency: true,
            ..ScenarioToggles::default()
        });
        assert!(satellite(&global).cost.networking > satellite(&params).cost.networking);
    }
}
