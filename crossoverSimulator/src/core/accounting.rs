use tracing::error;

use crate::config::const_funcs::relative_difference;
use crate::config::constants::ACCOUNTING_TOLERANCE;
use crate::core::errors::{SimResult, SimulationError};
use crate::models::ground_cost::GroundCostBreakdown;
use crate::models::launch_cost::LaunchQuote;
use crate::models::orbital::cost::OrbitalCostBreakdown;
use crate::models::orbital::SatelliteHybridCostResult;
use crate::models::pricing::GpuHourPrice;

/// Everything that must reconcile for one year.
pub struct YearLedgers<'a> {
    pub year: u32,
    pub ground: &'a GroundCostBreakdown,
    pub orbit: &'a OrbitalCostBreakdown,
    pub satellite: &'a SatelliteHybridCostResult,
    pub launch: &'a LaunchQuote,
    pub ground_gpu_hour: &'a GpuHourPrice,
    pub orbit_gpu_hour: &'a GpuHourPrice,
}

/// Checks that every itemized breakdown sums to its declared total. A mismatch
/// is always fatal: it is how double counting shows up.
#[derive(Debug, Clone, Copy)]
pub struct CostAccountingValidator {
    tolerance: f64,
}

impl Default for CostAccountingValidator {
    fn default() -> Self {
        Self {
            tolerance: ACCOUNTING_TOLERANCE,
        }
    }
}

impl CostAccountingValidator {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn check_ledger(&self, year: u32, ledger: &str, components: &[(&'static str, f64)], total: f64) -> SimResult<()> {
        let component_sum: f64 = components.iter().map(|(_, value)| value).sum();
        let relative_error = relative_difference(component_sum, total);
        if relative_error > self.tolerance || !component_sum.is_finite() {
            error!(year, ledger, component_sum, total, relative_error, "cost ledger does not reconcile");
            return Err(SimulationError::AccountingMismatch {
                year,
                ledger: ledger.to_string(),
                component_sum,
                total,
                relative_error,
            });
        }
        Ok(())
    }

    /// Scarcity is priced only through the GPU-hour multiplier, so the ground
    /// ledger's effective total may exceed base by the delay penalty and nothing else.
    pub fn check_scarcity_single_path(&self, year: u32, ground: &GroundCostBreakdown, scarcity_multiplier: f64) -> SimResult<()> {
        let additive_rent = ground.effective_total - ground.base_total - ground.delay_penalty;
        if additive_rent.abs() > self.tolerance * ground.effective_total.abs().max(1.0) {
            return Err(SimulationError::ScarcityDoubleCounted {
                year,
                multiplier: scarcity_multiplier,
                additive_rent,
            });
        }
        Ok(())
    }

    pub fn validate(&self, ledgers: &YearLedgers, scarcity_multiplier: f64) -> SimResult<()> {
        let year = ledgers.year;
        self.check_ledger(year, "ground.base", &ledgers.ground.base_components(), ledgers.ground.base_total)?;
        self.check_ledger(
            year,
            "ground.effective",
            &ledgers.ground.effective_components(),
            ledgers.ground.effective_total,
        )?;
        self.check_scarcity_single_path(year, ledgers.ground, scarcity_multiplier)?;
        self.check_ledger(year, "orbit.effective", &ledgers.orbit.components(), ledgers.orbit.effective_total)?;
        self.check_ledger(
            year,
            "orbit.satellite_cost",
            &ledgers.satellite.cost.components(),
            ledgers.satellite.total_cost_usd,
        )?;
        self.check_ledger(
            year,
            "orbit.satellite_mass",
            &ledgers.satellite.mass.components(),
            ledgers.satellite.total_mass_kg,
        )?;
        self.check_ledger(year, "launch.quote", &ledgers.launch.components(), ledgers.launch.price_per_kg)?;
        self.check_ledger(
            year,
            "ground.gpu_hour",
            &ledgers.ground_gpu_hour.components(),
            ledgers.ground_gpu_hour.total,
        )?;
        self.check_ledger(
            year,
            "orbit.gpu_hour",
            &ledgers.orbit_gpu_hour.components(),
            ledgers.orbit_gpu_hour.total,
        )?;
        Ok(())
    }
}
