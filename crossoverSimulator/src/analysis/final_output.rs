use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

use crate::analysis::metrics::YearlySummaryRow;
use crate::analysis::providers::ProviderComparison;
use crate::analysis::scenarios::ScenarioBenchmark;
use crate::analysis::sensitivity::SensitivityEntry;
use crate::config::simulation_config::SimulationConfig;
use crate::core::crossover::CrossoverSummary;
use crate::core::monte_carlo::MonteCarloSummary;
use crate::core::trajectory::Trajectory;
use crate::utils::logging::{start_timing, FileIOType, OperationCategory};

/// Years the provider comparison reports on by default.
pub const PROVIDER_COMPARISON_YEARS: [u32; 4] = [2025, 2030, 2035, 2040];

/// Everything a full run produces, ready for JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct FinalModelOutput {
    pub generated_at: String,
    pub config: SimulationConfig,
    pub ground_model: &'static str,
    pub crossover_year: Option<u32>,
    pub crossovers: CrossoverSummary,
    pub trajectory: Vec<YearlySummaryRow>,
    pub sensitivity: Vec<SensitivityEntry>,
    pub scenario_benchmarks: Vec<ScenarioBenchmark>,
    pub provider_comparison: Vec<ProviderComparison>,
    pub monte_carlo: Option<MonteCarloSummary>,
    pub warnings: Vec<String>,
}

impl FinalModelOutput {
    pub fn new(config: &SimulationConfig, trajectory: &Trajectory) -> Self {
        Self {
            generated_at: Local::now().to_rfc3339(),
            config: config.clone(),
            ground_model: trajectory.ground_model,
            crossover_year: trajectory.crossover_year,
            crossovers: trajectory.crossovers,
            trajectory: trajectory.years.iter().map(YearlySummaryRow::from).collect(),
            sensitivity: Vec::new(),
            scenario_benchmarks: Vec::new(),
            provider_comparison: Vec::new(),
            monte_carlo: None,
            warnings: trajectory.years.iter().flat_map(|year| year.warnings.iter().cloned()).collect(),
        }
    }

    pub fn with_sensitivity(mut self, sensitivity: Vec<SensitivityEntry>) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn with_scenarios(mut self, scenario_benchmarks: Vec<ScenarioBenchmark>) -> Self {
        self.scenario_benchmarks = scenario_benchmarks;
        self
    }

    pub fn with_providers(mut self, provider_comparison: Vec<ProviderComparison>) -> Self {
        self.provider_comparison = provider_comparison;
        self
    }

    pub fn with_monte_carlo(mut self, summary: MonteCarloSummary) -> Self {
        self.monte_carlo = Some(summary);
        self
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let _timing = start_timing(
            "write_final_output",
            OperationCategory::FileIO { subcategory: FileIOType::ResultsSave },
        );
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::providers::compare_providers;
    use crate::config::year_params::ScenarioToggles;
    use crate::core::trajectory::TrajectoryRunner;

    #[test]
    fn test_output_serializes_with_every_section() {
        let config = SimulationConfig::default();
        let trajectory = TrajectoryRunner::new(config.clone())
            .run_default(ScenarioToggles::default())
            .unwrap();
        let output = FinalModelOutput::new(&config, &trajectory)
            .with_providers(compare_providers(&trajectory, &PROVIDER_COMPARISON_YEARS));
        let json = serde_json::to_value(&output).unwrap();
        for key in ["crossover_year", "sensitivity", "scenario_benchmarks", "provider_comparison", "monte_carlo"] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(output.trajectory.len(), trajectory.years.len());
    }
}
