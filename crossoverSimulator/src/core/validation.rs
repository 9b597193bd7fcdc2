use tracing::warn;

use crate::config::simulation_config::StrictnessMode;
use crate::core::errors::{SimResult, SimulationError};

/// Collects per-year diagnostics and decides, from the run's strictness, whether
/// a violation aborts the year or is downgraded to a recorded warning.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    mode: StrictnessMode,
    warnings: Vec<String>,
}

impl Diagnostics {
    pub fn new(mode: StrictnessMode) -> Self {
        Self {
            mode,
            warnings: Vec::new(),
        }
    }

    pub fn mode(&self) -> StrictnessMode {
        self.mode
    }

    /// Always-fatal errors are returned in both modes.
    pub fn report(&mut self, error: SimulationError) -> SimResult<()> {
        if error.is_always_fatal() || self.mode == StrictnessMode::Strict {
            return Err(error);
        }
        warn!(target: "orbital_crossover::validation", error = %error, "downgraded to warning");
        self.warnings.push(error.to_string());
        Ok(())
    }

    pub fn note(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(target: "orbital_crossover::validation", "{}", message);
        self.warnings.push(message);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}

/// Range check that honours strictness: strict errors out, lenient clamps.
pub fn check_range(
    diagnostics: &mut Diagnostics,
    year: u32,
    path: &'static str,
    quantity: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> SimResult<f64> {
    if value.is_finite() && (min..=max).contains(&value) {
        return Ok(value);
    }
    diagnostics.report(SimulationError::UnitRange {
        year,
        path,
        quantity,
        value,
        min,
        max,
    })?;
    Ok(if value.is_nan() { min } else { value.clamp(min, max) })
}

/// Hard check for costs and masses: negative or NaN is never recoverable.
pub fn ensure_non_negative(year: u32, path: &'static str, quantity: &str, value: f64) -> SimResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::PhysicalInfeasibility {
            year,
            path,
            description: format!("{} is {}", quantity, value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_mode_propagates_range_errors() {
        let mut diagnostics = Diagnostics::new(StrictnessMode::Strict);
        let result = check_range(&mut diagnostics, 2030, "test", "price", 500.0, 0.01, 100.0);
        assert!(matches!(result, Err(SimulationError::UnitRange { .. })));
    }

    #[test]
    fn test_lenient_mode_clamps_and_records() {
        let mut diagnostics = Diagnostics::new(StrictnessMode::Lenient);
        let value = check_range(&mut diagnostics, 2030, "test", "price", 500.0, 0.01, 100.0).unwrap();
        assert_eq!(value, 100.0);
        assert_eq!(diagnostics.warnings().len(), 1);
    }

    #[test]
    fn test_fatal_errors_ignore_lenient_mode() {
        let mut diagnostics = Diagnostics::new(StrictnessMode::Lenient);
        let error = SimulationError::AccountingMismatch {
            year: 2030,
            ledger: "ground".to_string(),
            component_sum: 1.0,
            total: 2.0,
            relative_error: 0.5,
        };
        assert!(diagnostics.report(error).is_err());
    }

    #[test]
    fn test_negative_cost_is_physical_error() {
        assert!(ensure_non_negative(2030, "test", "cost", -1.0).is_err());
        assert!(ensure_non_negative(2030, "test", "cost", f64::NAN).is_err());
        assert_eq!(ensure_non_negative(2030, "test", "cost", 3.0).unwrap(), 3.0);
    }
}
