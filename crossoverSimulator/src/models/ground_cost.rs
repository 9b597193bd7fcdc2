use serde::Serialize;

use crate::config::const_funcs::*;
use crate::config::constants::*;
use crate::config::simulation_config::FinanceConfig;
use crate::config::year_params::YearParams;
use crate::core::errors::SimResult;
use crate::core::validation::ensure_non_negative;
use crate::models::ground_penalties::{BuildoutState, ConstraintPenalties};

/// Ground cost in $/PFLOP-year. `base_total` is engineering cost only;
/// `effective_total` adds the delay penalty. Scarcity is not in either total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundCostBreakdown {
    pub year: u32,
    pub energy: f64,
    pub hardware: f64,
    pub site: f64,
    pub operations: f64,
    pub base_total: f64,
    pub delay_penalty: f64,
    pub effective_total: f64,
    pub all_in_total: f64,
    pub energy_price_per_kwh: f64,
    pub kwh_per_pflop_year: f64,
    pub facility_kw_per_pflop: f64,
    pub effective_wacc: f64,
}

impl GroundCostBreakdown {
    pub fn base_components(&self) -> [(&'static str, f64); 4] {
        [
            ("energy", self.energy),
            ("hardware", self.hardware),
            ("site", self.site),
            ("operations", self.operations),
        ]
    }

    pub fn effective_components(&self) -> [(&'static str, f64); 5] {
        [
            ("energy", self.energy),
            ("hardware", self.hardware),
            ("site", self.site),
            ("operations", self.operations),
            ("delay_penalty", self.delay_penalty),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct GroundCostModel {
    finance: FinanceConfig,
}

impl GroundCostModel {
    pub fn new(finance: FinanceConfig) -> Self {
        Self { finance }
    }

    pub fn energy_price_per_kwh(&self, params: &YearParams) -> f64 {
        let mut price = self.finance.energy_price_per_kwh
            * calc_growth_factor(GROUND_ENERGY_PRICE_DRIFT, params.year)
            * params.ground_scenario.energy_price_multiplier()
            * self.finance.energy_price_multiplier;
        if params.toggles.smr_mitigation && params.year >= SMR_AVAILABLE_YEAR {
            price *= SMR_ENERGY_DISCOUNT;
        }
        price
    }

    /// Facility draw (IT load times PUE) per PFLOPS.
    pub fn facility_kw_per_pflop(&self, params: &YearParams) -> f64 {
        calc_it_kw_per_pflop(params.ground_efficiency_gflops_per_w) * params.pue_ground
    }

    pub fn hardware_cost_per_pflop(&self, params: &YearParams) -> f64 {
        calc_hardware_cost_per_pflop(params.year) * self.finance.hardware_cost_multiplier
    }

    /// Capex stranded while a site waits for power: shell plus the idle hardware.
    pub fn at_risk_capex_per_kw(&self, params: &YearParams) -> f64 {
        SITE_CAPEX_PER_KW + self.hardware_cost_per_pflop(params) / self.facility_kw_per_pflop(params)
    }

    pub fn compute(
        &self,
        params: &YearParams,
        penalties: &ConstraintPenalties,
        buildout: &BuildoutState,
    ) -> SimResult<GroundCostBreakdown> {
        let year = params.year;
        let wacc = penalties.effective_wacc;
        let facility_kw = self.facility_kw_per_pflop(params);
        let kwh = calc_kwh_per_pflop_year(params.ground_efficiency_gflops_per_w, params.pue_ground);
        let price = self.energy_price_per_kwh(params);

        let hardware_capex = self.hardware_cost_per_pflop(params);
        let site_capex = buildout.buildout_capex_per_kw * facility_kw;

        let energy = price * kwh * params.capacity_factor;
        let hardware = hardware_capex * calc_capital_recovery_factor(wacc, self.finance.hardware_lifetime_years);
        let site = site_capex * calc_capital_recovery_factor(wacc, self.finance.site_lifetime_years);
        let operations = GROUND_OM_FRACTION * (hardware_capex + site_capex);
        let delay_penalty = penalties.delay_penalty_per_kw_year * facility_kw;

        for (name, value) in [
            ("energy", energy),
            ("hardware", hardware),
            ("site", site),
            ("operations", operations),
            ("delay_penalty", delay_penalty),
        ] {
            ensure_non_negative(year, "ground.cost", name, value)?;
        }

        let base_total = energy + hardware + site + operations;
        let effective_total = base_total + delay_penalty;
        Ok(GroundCostBreakdown {
            year,
            energy,
            hardware,
            site,
            operations,
            base_total,
            delay_penalty,
            effective_total,
            all_in_total: effective_total,
            energy_price_per_kwh: price,
            kwh_per_pflop_year: kwh,
            facility_kw_per_pflop: facility_kw,
            effective_wacc: wacc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::simulation_config::StrictnessMode;
    use crate::config::year_params::ScenarioToggles;
    use crate::core::ground_metrics::GroundMetrics;
    use crate::core::validation::Diagnostics;
    use crate::models::ground_penalties::GroundConstraintPenalties;

    fn breakdown(params: &YearParams, backlog_gw: f64, wait_years: f64) -> GroundCostBreakdown {
        let finance = FinanceConfig::default();
        let model = GroundCostModel::new(finance.clone());
        let metrics = GroundMetrics {
            year: params.year,
            demand_gw: 300.0,
            market_demand_gw: 300.0,
            capacity_gw: 300.0 - backlog_gw,
            backlog_gw,
            build_rate_gw_yr: 30.0,
            wait_years,
            utilization: if backlog_gw > 0.0 { 1.0 } else { 0.8 },
            unserved_gw: backlog_gw,
            pipeline_gw: backlog_gw,
        };
        let penalties = GroundConstraintPenalties::new(finance.clone())
            .compute(&metrics, model.at_risk_capex_per_kw(params), &mut Diagnostics::new(StrictnessMode::Strict))
            .unwrap();
        let buildout = BuildoutState::initial(params.year - 1).advance(&metrics, &penalties, &finance);
        model.compute(params, &penalties, &buildout).unwrap()
    }

    #[test]
    fn test_components_reconcile() {
        let cost = breakdown(&YearParams::default_for_year(2035), 40.0, 2.5);
        let base: f64 = cost.base_components().iter().map(|(_, v)| v).sum();
        let effective: f64 = cost.effective_components().iter().map(|(_, v)| v).sum();
        assert!((base - cost.base_total).abs() < 1e-9);
        assert!((effective - cost.effective_total).abs() < 1e-9);
        assert_eq!(cost.all_in_total, cost.effective_total);
    }

    #[test]
    fn test_unconstrained_grid_has_no_delay_penalty() {
        let cost = breakdown(&YearParams::default_for_year(2035), 0.0, 0.0);
        assert_eq!(cost.delay_penalty, 0.0);
        assert_eq!(cost.base_total, cost.effective_total);
    }

    #[test]
    fn test_energy_not_scaled_by_wait() {
        let params = YearParams::default_for_year(2035);
        let calm = breakdown(&params, 0.0, 0.0);
        let tight = breakdown(&params, 60.0, 6.0);
        assert_eq!(calm.energy, tight.energy);
        assert!(tight.effective_total > calm.effective_total);
    }

    #[test]
    fn test_smr_discounts_energy() {
        let model = GroundCostModel::new(FinanceConfig::default());
        let params = YearParams::default_for_year(2035);
        let smr = params.clone().with_toggles(ScenarioToggles {
            smr_mitigation: true,
            ..ScenarioToggles::default()
        });
        assert!(model.energy_price_per_kwh(&smr) < model.energy_price_per_kwh(&params));
    }
}
