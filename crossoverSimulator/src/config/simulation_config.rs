use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::constants::*;

/// Whether range and plumbing violations abort the run or degrade to warnings.
/// Physical infeasibility and accounting mismatches are fatal in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StrictnessMode {
    #[default]
    Strict,
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GroundModelKind {
    ClosedFormQueue,
    RegionalAggregate,
    #[default]
    RampingMobilization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LaunchModelKind {
    #[default]
    MarginalCostCurve,
    WrightsLaw,
}

impl FromStr for GroundModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queue" | "closed-form-queue" => Ok(GroundModelKind::ClosedFormQueue),
            "regional" | "regional-aggregate" => Ok(GroundModelKind::RegionalAggregate),
            "mobilization" | "ramping-mobilization" => Ok(GroundModelKind::RampingMobilization),
            _ => Err(format!("Unknown ground model: {}", s)),
        }
    }
}

impl FromStr for LaunchModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "curve" | "marginal-cost-curve" => Ok(LaunchModelKind::MarginalCostCurve),
            "wright" | "wrights-law" => Ok(LaunchModelKind::WrightsLaw),
            _ => Err(format!("Unknown launch model: {}", s)),
        }
    }
}

/// Which ground total the crossover flag compares against the orbital total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CrossoverBasis {
    #[default]
    Effective,
    Base,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Workload {
    #[default]
    Training,
    Inference,
}

impl Workload {
    pub fn networking_multiplier(&self) -> f64 {
        match self {
            Workload::Training => 1.6,
            Workload::Inference => 1.0,
        }
    }

    pub fn interconnect_multiplier(&self) -> f64 {
        match self {
            Workload::Training => 1.4,
            Workload::Inference => 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceConfig {
    pub base_wacc: f64,
    pub rationing_premium: f64,               // Added WACC at the critical backlog ratio
    pub critical_backlog_ratio: f64,
    pub delay_penalty_cap_fraction: f64,
    pub hardware_lifetime_years: f64,
    pub site_lifetime_years: f64,
    pub energy_price_per_kwh: f64,
    pub energy_price_multiplier: f64,
    pub hardware_cost_multiplier: f64,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            base_wacc: BASE_WACC,
            rationing_premium: WACC_RATIONING_PREMIUM,
            critical_backlog_ratio: CRITICAL_BACKLOG_RATIO,
            delay_penalty_cap_fraction: DELAY_PENALTY_CAP_FRACTION,
            hardware_lifetime_years: HARDWARE_LIFETIME_YEARS,
            site_lifetime_years: SITE_LIFETIME_YEARS,
            energy_price_per_kwh: GROUND_ENERGY_PRICE_PER_KWH,
            energy_price_multiplier: 1.0,
            hardware_cost_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobilizationConfig {
    pub initial_capacity_gw: f64,
    pub initial_build_rate_gw_yr: f64,
    pub demand_responsive: bool,
    pub price_elasticity: f64,                // Applied to ground price index (negative)
    pub wait_elasticity: f64,                 // Demand loss per year of wait (negative)
    pub demand_adjustment_rate: f64,          // Share of the gap to the price/wait response closed per year
    pub orbital_substitution: bool,
    pub bottleneck_limits: bool,
    pub margin_elasticity: f64,
    pub backlog_elasticity: f64,
    pub target_margin: f64,
    pub target_backlog_ratio: f64,
    pub max_ramp: f64,
}

impl Default for MobilizationConfig {
    fn default() -> Self {
        Self {
            initial_capacity_gw: INITIAL_GRID_CAPACITY_GW,
            initial_build_rate_gw_yr: INITIAL_BUILD_RATE_GW_YR,
            demand_responsive: true,
            price_elasticity: -0.25,
            wait_elasticity: -0.02,
            demand_adjustment_rate: DEMAND_ADJUSTMENT_RATE,
            orbital_substitution: true,
            bottleneck_limits: true,
            margin_elasticity: 0.6,
            backlog_elasticity: 0.8,
            target_margin: 0.20,
            target_backlog_ratio: 0.10,
            max_ramp: MAX_BUILD_RAMP,
        }
    }
}

impl MobilizationConfig {
    /// Pure anchor-curve demand: no elasticities, no substitution, no bottlenecks.
    pub fn toggles_disabled() -> Self {
        Self {
            demand_responsive: false,
            orbital_substitution: false,
            bottleneck_limits: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitalConfig {
    pub workload: Workload,
    pub failure_rate_override: Option<f64>,   // Replaces the chip-generation failure rate
    pub failure_rate_multiplier: f64,
    pub repairability_fraction: f64,          // Share of failures fixed without a new unit
    pub spares_multiplier: f64,
    pub max_satellite_mass_kg: f64,
    pub launch_vehicle_payload_kg: f64,
    pub allow_thermal_override: bool,
    pub solar_learning_multiplier: f64,
    pub chip_cost_multiplier: f64,
    pub launch_cost_multiplier: f64,
}

impl Default for OrbitalConfig {
    fn default() -> Self {
        Self {
            workload: Workload::Training,
            failure_rate_override: None,
            failure_rate_multiplier: 1.0,
            repairability_fraction: 0.3,
            spares_multiplier: 1.2,
            max_satellite_mass_kg: MAX_SATELLITE_MASS_KG,
            launch_vehicle_payload_kg: LAUNCH_VEHICLE_PAYLOAD_KG,
            allow_thermal_override: false,
            solar_learning_multiplier: 1.0,
            chip_cost_multiplier: 1.0,
            launch_cost_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub target_utilization: f64,
    pub target_nines: f64,
    pub sla_credit_fraction: f64,
    pub reference_gpu_hour_price: f64,
    pub operator_margin: f64,
    pub pflops_per_gpu: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            target_utilization: TARGET_UTILIZATION,
            target_nines: TARGET_AVAILABILITY_NINES,
            sla_credit_fraction: SLA_CREDIT_FRACTION,
            reference_gpu_hour_price: REFERENCE_GPU_HOUR_PRICE,
            operator_margin: OPERATOR_MARGIN,
            pflops_per_gpu: REFERENCE_PFLOPS_PER_GPU,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub logit_steepness: f64,
    pub queue_pressure_wait_years: f64,
    pub queue_pressure_backlog_fraction: f64,
    pub queue_pressure_ground_cap: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            logit_steepness: LOGIT_STEEPNESS,
            queue_pressure_wait_years: QUEUE_PRESSURE_WAIT_YEARS,
            queue_pressure_backlog_fraction: QUEUE_PRESSURE_BACKLOG_FRACTION,
            queue_pressure_ground_cap: QUEUE_PRESSURE_GROUND_CAP,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    pub launch_mass_kg_2025: f64,
    pub launch_mass_growth: f64,
    pub pilot_deployment_share: f64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            launch_mass_kg_2025: ORBITAL_LAUNCH_MASS_KG_2025,
            launch_mass_growth: ORBITAL_LAUNCH_MASS_GROWTH,
            pilot_deployment_share: PILOT_DEPLOYMENT_SHARE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub strictness: StrictnessMode,
    pub ground_model: GroundModelKind,
    pub launch_model: LaunchModelKind,
    pub crossover_basis: CrossoverBasis,
    pub start_year: u32,
    pub end_year: u32,
    pub finance: FinanceConfig,
    pub mobilization: MobilizationConfig,
    pub orbital: OrbitalConfig,
    pub pricing: PricingConfig,
    pub market: MarketConfig,
    pub fleet: FleetConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            strictness: StrictnessMode::Strict,
            ground_model: GroundModelKind::RampingMobilization,
            launch_model: LaunchModelKind::MarginalCostCurve,
            crossover_basis: CrossoverBasis::Effective,
            start_year: BASE_YEAR,
            end_year: END_YEAR,
            finance: FinanceConfig::default(),
            mobilization: MobilizationConfig::default(),
            orbital: OrbitalConfig::default(),
            pricing: PricingConfig::default(),
            market: MarketConfig::default(),
            fleet: FleetConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: SimulationConfig = serde_json::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.start_year <= self.end_year,
            "start year {} after end year {}",
            self.start_year,
            self.end_year
        );
        anyhow::ensure!(
            self.pricing.target_utilization > 0.0 && self.pricing.target_utilization <= 1.0,
            "target utilization {} must be in (0, 1]",
            self.pricing.target_utilization
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.orbital.repairability_fraction),
            "repairability fraction {} must be in [0, 1]",
            self.orbital.repairability_fraction
        );
        anyhow::ensure!(
            self.orbital.max_satellite_mass_kg > 0.0,
            "satellite mass ceiling must be positive"
        );
        anyhow::ensure!(
            self.mobilization.demand_adjustment_rate > 0.0 && self.mobilization.demand_adjustment_rate <= 1.0,
            "demand adjustment rate {} must be in (0, 1]",
            self.mobilization.demand_adjustment_rate
        );
        Ok(())
    }

    pub fn years(&self) -> impl Iterator<Item = u32> {
        self.start_year..=self.end_year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kinds_parse() {
        assert_eq!("regional".parse::<GroundModelKind>().unwrap(), GroundModelKind::RegionalAggregate);
        assert_eq!("wrights-law".parse::<LaunchModelKind>().unwrap(), LaunchModelKind::WrightsLaw);
        assert!("tidal".parse::<GroundModelKind>().is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.years().count(), 26);
        assert_eq!(config.strictness, StrictnessMode::Strict);
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let mut config = SimulationConfig::default();
        config.ground_model = GroundModelKind::ClosedFormQueue;
        config.strictness = StrictnessMode::Lenient;
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.ground_model, GroundModelKind::ClosedFormQueue);
        assert_eq!(parsed.strictness, StrictnessMode::Lenient);
    }

    #[test]
    fn test_zero_demand_adjustment_rejected() {
        let mut config = SimulationConfig::default();
        config.mobilization.demand_adjustment_rate = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_years_rejected() {
        let config = SimulationConfig {
            start_year: 2040,
            end_year: 2030,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
