use serde::Serialize;

use crate::core::ground_metrics::GroundMetrics;
use crate::core::market_share::MarketAllocation;
use crate::models::constellation::ConstellationDesign;
use crate::models::fleet::OrbitalFleetState;
use crate::models::ground_cost::GroundCostBreakdown;
use crate::models::ground_penalties::{BuildoutState, ConstraintPenalties};
use crate::models::launch_cost::LaunchQuote;
use crate::models::orbital::cost::OrbitalCostBreakdown;
use crate::models::orbital::SatelliteHybridCostResult;
use crate::models::pricing::{GpuHourPrice, TokenPrice};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundBreakdown {
    pub model: &'static str,
    pub metrics: GroundMetrics,
    pub penalties: ConstraintPenalties,
    pub buildout: BuildoutState,
    pub cost: GroundCostBreakdown,
    pub gpu_hour: GpuHourPrice,
    pub tokens: Vec<TokenPrice>,
    /// Wait moved by more than the discontinuity threshold since last year.
    pub wait_discontinuity: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitBreakdown {
    /// Quote actually charged, after multipliers and the monotone clamp.
    pub launch: LaunchQuote,
    pub launch_clamped: bool,
    pub satellite: SatelliteHybridCostResult,
    pub constellation: ConstellationDesign,
    pub cost: OrbitalCostBreakdown,
    pub gpu_hour: GpuHourPrice,
    pub tokens: Vec<TokenPrice>,
    pub fleet: OrbitalFleetState,
    pub launched_kg: f64,
}

/// Everything the simulator knows about one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyBreakdown {
    pub year: u32,
    pub ground: GroundBreakdown,
    pub orbit: OrbitBreakdown,
    pub market: MarketAllocation,
    /// Orbit cheaper than ground on the configured basis.
    pub crossover: bool,
    /// Orbit cheaper than ground before any constraint penalty.
    pub base_crossover: bool,
    pub cost_accounting_valid: bool,
    pub warnings: Vec<String>,
}

impl YearlyBreakdown {
    /// Orbital over ground effective cost per PFLOP-year.
    pub fn cost_ratio(&self) -> f64 {
        if self.ground.cost.effective_total > 0.0 {
            self.orbit.cost.effective_total / self.ground.cost.effective_total
        } else {
            f64::INFINITY
        }
    }

    pub fn orbit_cheaper_per_gpu_hour(&self) -> bool {
        self.orbit.gpu_hour.total < self.ground.gpu_hour.total
    }
}

/// Flat, CSV-friendly projection of a `YearlyBreakdown`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlySummaryRow {
    pub year: u32,
    pub ground_model: &'static str,
    pub demand_gw: f64,
    pub ground_capacity_gw: f64,
    pub backlog_gw: f64,
    pub wait_years: f64,
    pub utilization: f64,
    pub scarcity_multiplier: f64,
    pub ground_base_per_pflop_year: f64,
    pub ground_effective_per_pflop_year: f64,
    pub orbit_effective_per_pflop_year: f64,
    pub launch_price_per_kg: f64,
    pub thermal_cap_factor: f64,
    pub num_satellites: u64,
    pub orbital_fleet_gw: f64,
    pub ground_gpu_hour: f64,
    pub orbit_gpu_hour: f64,
    pub orbital_share: f64,
    pub unserved_gw: f64,
    pub crossover: bool,
    pub warning_count: usize,
}

impl From<&YearlyBreakdown> for YearlySummaryRow {
    fn from(year: &YearlyBreakdown) -> Self {
        Self {
            year: year.year,
            ground_model: year.ground.model,
            demand_gw: year.ground.metrics.market_demand_gw,
            ground_capacity_gw: year.ground.metrics.capacity_gw,
            backlog_gw: year.ground.metrics.backlog_gw,
            wait_years: year.ground.metrics.wait_years,
            utilization: year.ground.metrics.utilization,
            scarcity_multiplier: year.ground.penalties.scarcity_multiplier,
            ground_base_per_pflop_year: year.ground.cost.base_total,
            ground_effective_per_pflop_year: year.ground.cost.effective_total,
            orbit_effective_per_pflop_year: year.orbit.cost.effective_total,
            launch_price_per_kg: year.orbit.launch.price_per_kg,
            thermal_cap_factor: year.orbit.satellite.thermal_cap_factor,
            num_satellites: year.orbit.constellation.num_satellites,
            orbital_fleet_gw: year.orbit.fleet.deployed_gw,
            ground_gpu_hour: year.ground.gpu_hour.total,
            orbit_gpu_hour: year.orbit.gpu_hour.total,
            orbital_share: year.market.orbital_share,
            unserved_gw: year.market.unserved_gw,
            crossover: year.crossover,
            warning_count: year.warnings.len(),
        }
    }
}
