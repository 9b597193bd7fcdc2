use serde::Serialize;
use tracing::debug;

use crate::config::simulation_config::SimulationConfig;
use crate::config::year_params::YearParams;
use crate::core::crossover::orbit_cheaper;
use crate::core::monte_carlo::ParameterSample;
use crate::core::trajectory::TrajectoryRunner;
use crate::utils::logging::{self, OperationCategory};

/// Per-year slice of one sampled trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleYear {
    pub year: u32,
    pub orbit_cheaper: bool,
    pub cost_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationResult {
    pub sample: ParameterSample,
    pub crossover_year: Option<u32>,
    pub years: Vec<SampleYear>,
    /// Set when the sampled configuration could not be simulated.
    pub failure: Option<String>,
}

impl IterationResult {
    pub fn completed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Runs one Monte Carlo sample. A failing sample is recorded, not propagated,
/// so one infeasible draw does not abort the batch.
pub fn run_iteration(sample: &ParameterSample, base_config: &SimulationConfig, params: &[YearParams]) -> IterationResult {
    let _timing = logging::start_timing("run_iteration", OperationCategory::MonteCarlo);
    let runner = TrajectoryRunner::new(sample.apply(base_config));

    match runner.run(params) {
        Ok(trajectory) => {
            let basis = base_config.crossover_basis;
            let years = trajectory
                .years
                .iter()
                .map(|year| SampleYear {
                    year: year.year,
                    orbit_cheaper: orbit_cheaper(year, basis),
                    cost_ratio: year.cost_ratio(),
                })
                .collect();
            IterationResult {
                sample: *sample,
                crossover_year: trajectory.crossover_year,
                years,
                failure: None,
            }
        }
        Err(error) => {
            debug!(index = sample.index, seed = sample.seed, %error, "sample failed");
            IterationResult {
                sample: *sample,
                crossover_year: None,
                years: Vec::new(),
                failure: Some(error.to_string()),
            }
        }
    }
}
