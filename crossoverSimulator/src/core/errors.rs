use thiserror::Error;

/// Failure modes of a single simulated year. Every variant carries the year and
/// the offending values so one log line is enough to reproduce the failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("[{year}] thermal infeasible: max rejectable {max_rejectable_kw:.1} kW vs waste heat {waste_heat_kw:.1} kW (cap factor {cap_factor:.3} < {floor})")]
    ThermalInfeasible {
        year: u32,
        max_rejectable_kw: f64,
        waste_heat_kw: f64,
        cap_factor: f64,
        floor: f64,
    },

    #[error("[{year}] physically infeasible in {path}: {description}")]
    PhysicalInfeasibility {
        year: u32,
        path: &'static str,
        description: String,
    },

    #[error("[{year}] {quantity} = {value} outside [{min}, {max}] in {path}")]
    UnitRange {
        year: u32,
        path: &'static str,
        quantity: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("[{year}] accounting mismatch in {ledger}: components sum {component_sum:.4} vs total {total:.4} (rel err {relative_error:.5})")]
    AccountingMismatch {
        year: u32,
        ledger: String,
        component_sum: f64,
        total: f64,
        relative_error: f64,
    },

    #[error("[{year}] scarcity counted twice: multiplicative {multiplier:.3} with additive rent {additive_rent:.2}")]
    ScarcityDoubleCounted {
        year: u32,
        multiplier: f64,
        additive_rent: f64,
    },

    #[error("[{year}] market shares orbit {orbital_share} + ground {ground_share} != 1 with {served_gw:.2} GW served")]
    ShareSum {
        year: u32,
        orbital_share: f64,
        ground_share: f64,
        served_gw: f64,
    },

    #[error("[{year}] delivered efficiency {delivered:.2} GFLOPS/W diverges from expected {expected:.2}")]
    EfficiencyMismatch {
        year: u32,
        delivered: f64,
        expected: f64,
    },

    #[error("[{year}] scarcity gate {gate:.4} suppresses wait {wait_years:.2} y / backlog {backlog_gw:.1} GW")]
    GateSuppressed {
        year: u32,
        gate: f64,
        wait_years: f64,
        backlog_gw: f64,
    },

    #[error("[{year}] ground supply model {model} was stepped with a {state} state")]
    StateMismatch {
        year: u32,
        model: &'static str,
        state: &'static str,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SimulationError {
    /// Physical infeasibility and accounting errors abort the year regardless of
    /// strictness; the rest may degrade to warnings in lenient mode.
    pub fn is_always_fatal(&self) -> bool {
        matches!(
            self,
            SimulationError::ThermalInfeasible { .. }
                | SimulationError::PhysicalInfeasibility { .. }
                | SimulationError::AccountingMismatch { .. }
                | SimulationError::ScarcityDoubleCounted { .. }
                | SimulationError::ShareSum { .. }
                | SimulationError::StateMismatch { .. }
                | SimulationError::InvalidInput(_)
        )
    }
}

pub type SimResult<T> = Result<T, SimulationError>;
