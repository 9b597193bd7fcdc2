//! Grid-constraint penalties: capital rationing, delay carry and the scarcity
//! multiplier, plus the buildout state threaded between years.

use serde::{Deserialize, Serialize};

use crate::config::const_funcs::{calc_capital_recovery_factor, logistic};
use crate::config::constants::*;
use crate::config::simulation_config::FinanceConfig;
use crate::core::errors::{SimResult, SimulationError};
use crate::core::ground_metrics::GroundMetrics;
use crate::core::validation::Diagnostics;

/// Yearly decay of a buildout premium once the wait that caused it eases.
const BUILDOUT_PREMIUM_DECAY: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstraintPenalties {
    pub year: u32,
    pub backlog_ratio: f64,
    pub effective_wacc: f64,
    pub wait_years: f64,
    pub utilization: f64,
    pub at_risk_capex_per_kw: f64,
    pub delay_fraction: f64,
    pub delay_penalty_per_kw: f64,
    pub delay_penalty_per_kw_year: f64,
    pub scarcity_gate: f64,
    pub scarcity_multiplier: f64,
}

/// Base WACC plus a rationing premium that grows with the square of the backlog
/// ratio and saturates at the critical ratio.
pub fn effective_wacc(finance: &FinanceConfig, backlog_ratio: f64) -> f64 {
    let critical = finance.critical_backlog_ratio.max(1e-9);
    let pressure = (backlog_ratio.max(0.0).min(critical) / critical).powi(2);
    finance.base_wacc + finance.rationing_premium * pressure
}

/// Linear carry on at-risk capex, capped as a fraction of that capex.
pub fn delay_penalty(at_risk_capex: f64, wacc: f64, wait_years: f64, cap_fraction: f64) -> f64 {
    (wacc * wait_years.max(0.0)).min(cap_fraction) * at_risk_capex
}

pub fn scarcity_gate(utilization: f64) -> f64 {
    logistic((utilization - SCARCITY_UTILIZATION_THRESHOLD) * SCARCITY_GATE_STEEPNESS)
}

/// `1 + c·ln(1 + wait)·gate`, capped. The log keeps separating very long waits
/// where a sigmoid would already be flat. Exactly 1.0 when there is no wait.
pub fn scarcity_multiplier(wait_years: f64, utilization: f64) -> (f64, f64) {
    let gate = scarcity_gate(utilization);
    if wait_years <= 0.0 {
        return (1.0, gate);
    }
    let multiplier = 1.0 + SCARCITY_LOG_COEFFICIENT * wait_years.ln_1p() * gate;
    (multiplier.min(SCARCITY_MULTIPLIER_CAP), gate)
}

#[derive(Debug, Clone)]
pub struct GroundConstraintPenalties {
    finance: FinanceConfig,
}

impl GroundConstraintPenalties {
    pub fn new(finance: FinanceConfig) -> Self {
        Self { finance }
    }

    pub fn compute(
        &self,
        metrics: &GroundMetrics,
        at_risk_capex_per_kw: f64,
        diagnostics: &mut Diagnostics,
    ) -> SimResult<ConstraintPenalties> {
        let backlog_ratio = if metrics.demand_gw > 0.0 {
            metrics.backlog_gw / metrics.demand_gw
        } else {
            0.0
        };
        let wacc = effective_wacc(&self.finance, backlog_ratio);
        let delay_fraction = (wacc * metrics.wait_years).min(self.finance.delay_penalty_cap_fraction);
        let delay_per_kw = delay_penalty(
            at_risk_capex_per_kw,
            wacc,
            metrics.wait_years,
            self.finance.delay_penalty_cap_fraction,
        );
        let (multiplier, gate) = scarcity_multiplier(metrics.wait_years, metrics.utilization);

        if metrics.backlog_gw > 0.0
            && metrics.wait_years > GATE_SUPPRESSION_WAIT_YEARS
            && gate < GATE_SUPPRESSION_FLOOR
        {
            diagnostics.report(SimulationError::GateSuppressed {
                year: metrics.year,
                gate,
                wait_years: metrics.wait_years,
                backlog_gw: metrics.backlog_gw,
            })?;
        }

        Ok(ConstraintPenalties {
            year: metrics.year,
            backlog_ratio,
            effective_wacc: wacc,
            wait_years: metrics.wait_years,
            utilization: metrics.utilization,
            at_risk_capex_per_kw,
            delay_fraction,
            delay_penalty_per_kw: delay_per_kw,
            // Carry is recovered over the hardware life it delays.
            delay_penalty_per_kw_year: delay_per_kw / self.finance.hardware_lifetime_years.max(1.0),
            scarcity_gate: gate,
            scarcity_multiplier: multiplier,
        })
    }
}

/// Site-buildout conditions in $/kW terms. The premium is sticky: contracts
/// signed during a long wait keep prices elevated for a few years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildoutState {
    pub year: u32,
    pub backlog_gw: f64,
    pub time_to_power_years: f64,
    pub scarcity_index: f64,
    pub buildout_capex_per_kw: f64,
    pub annualized_premium_per_kw_year: f64,
    pub delay_penalty_per_year: f64,
    pub value_of_time_per_year: f64,
}

impl BuildoutState {
    pub fn initial(year: u32) -> Self {
        Self {
            year,
            backlog_gw: 0.0,
            time_to_power_years: 0.0,
            scarcity_index: 0.0,
            buildout_capex_per_kw: SITE_CAPEX_PER_KW,
            annualized_premium_per_kw_year: 0.0,
            delay_penalty_per_year: 0.0,
            value_of_time_per_year: 0.0,
        }
    }

    pub fn premium_per_kw(&self) -> f64 {
        (self.buildout_capex_per_kw - SITE_CAPEX_PER_KW).max(0.0)
    }

    pub fn advance(&self, metrics: &GroundMetrics, penalties: &ConstraintPenalties, finance: &FinanceConfig) -> Self {
        let target = BUILDOUT_PREMIUM_PER_KW_PER_WAIT_YEAR * metrics.wait_years;
        let premium = target.max(self.premium_per_kw() * (1.0 - BUILDOUT_PREMIUM_DECAY));
        let crf = calc_capital_recovery_factor(penalties.effective_wacc, finance.site_lifetime_years);
        Self {
            year: metrics.year,
            backlog_gw: metrics.backlog_gw,
            time_to_power_years: metrics.wait_years,
            scarcity_index: penalties.scarcity_multiplier - 1.0,
            buildout_capex_per_kw: SITE_CAPEX_PER_KW + premium,
            annualized_premium_per_kw_year: premium * crf,
            delay_penalty_per_year: penalties.delay_penalty_per_kw_year,
            value_of_time_per_year: VALUE_OF_TIME_PER_KW_YEAR * metrics.wait_years,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::simulation_config::StrictnessMode;

    fn metrics(backlog_gw: f64, wait_years: f64, utilization: f64) -> GroundMetrics {
        GroundMetrics {
            year: 2030,
            demand_gw: 200.0,
            market_demand_gw: 200.0,
            capacity_gw: 200.0 * utilization.max(0.01),
            backlog_gw,
            build_rate_gw_yr: 20.0,
            wait_years,
            utilization,
            unserved_gw: backlog_gw,
            pipeline_gw: backlog_gw,
        }
    }

    #[test]
    fn test_no_backlog_means_no_scarcity() {
        let (multiplier, _) = scarcity_multiplier(0.0, 0.6);
        assert_eq!(multiplier, 1.0);
        let penalties = GroundConstraintPenalties::new(FinanceConfig::default())
            .compute(&metrics(0.0, 0.0, 0.8), 20_000.0, &mut Diagnostics::new(StrictnessMode::Strict))
            .unwrap();
        assert_eq!(penalties.scarcity_multiplier, 1.0);
        assert_eq!(penalties.delay_penalty_per_kw, 0.0);
        assert_eq!(penalties.effective_wacc, FinanceConfig::default().base_wacc);
    }

    #[test]
    fn test_multiplier_distinguishes_long_waits_and_caps() {
        let (twenty, _) = scarcity_multiplier(20.0, 1.0);
        let (two_hundred, _) = scarcity_multiplier(200.0, 1.0);
        assert!(two_hundred > twenty);
        assert!(scarcity_multiplier(1e12, 1.0).0 <= SCARCITY_MULTIPLIER_CAP);
    }

    #[test]
    fn test_delay_penalty_linear_then_capped() {
        let one = delay_penalty(1_000.0, 0.1, 1.0, 0.75);
        let two = delay_penalty(1_000.0, 0.1, 2.0, 0.75);
        assert!((two - 2.0 * one).abs() < 1e-9);
        assert_eq!(delay_penalty(1_000.0, 0.1, 50.0, 0.75), 750.0);
    }

    #[test]
    fn test_wacc_convex_and_saturating() {
        let finance = FinanceConfig::default();
        let quarter = effective_wacc(&finance, 0.125) - finance.base_wacc;
        let half = effective_wacc(&finance, 0.25) - finance.base_wacc;
        assert!((half - 4.0 * quarter).abs() < 1e-12);
        assert_eq!(effective_wacc(&finance, 5.0), finance.base_wacc + finance.rationing_premium);
    }

    #[test]
    fn test_suppressed_gate_flagged() {
        let model = GroundConstraintPenalties::new(FinanceConfig::default());
        let strict = model.compute(&metrics(50.0, 5.0, 0.3), 20_000.0, &mut Diagnostics::new(StrictnessMode::Strict));
        assert!(matches!(strict, Err(SimulationError::GateSuppressed { .. })));

        let mut lenient = Diagnostics::new(StrictnessMode::Lenient);
        assert!(model.compute(&metrics(50.0, 5.0, 0.3), 20_000.0, &mut lenient).is_ok());
        assert_eq!(lenient.warnings().len(), 1);
    }

    #[test]
    fn test_buildout_premium_is_sticky() {
        let finance = FinanceConfig::default();
        let model = GroundConstraintPenalties::new(finance.clone());
        let mut diagnostics = Diagnostics::new(StrictnessMode::Strict);
        let tight = metrics(40.0, 4.0, 1.0);
        let penalties = model.compute(&tight, 20_000.0, &mut diagnostics).unwrap();
        let after_tight = BuildoutState::initial(2029).advance(&tight, &penalties, &finance);
        assert!((after_tight.premium_per_kw() - 2_400.0).abs() < 1e-9);

        let calm = metrics(0.0, 0.0, 0.8);
        let calm_penalties = model.compute(&calm, 20_000.0, &mut diagnostics).unwrap();
        let after_calm = after_tight.advance(&calm, &calm_penalties, &finance);
        assert!(after_calm.premium_per_kw() > 0.0);
        assert!(after_calm.premium_per_kw() < after_tight.premium_per_kw());
    }
}
