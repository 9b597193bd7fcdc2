use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::analysis::metrics::YearlySummaryRow;
use crate::analysis::providers::ProviderComparison;
use crate::analysis::scenarios::ScenarioBenchmark;
use crate::analysis::sensitivity::SensitivityEntry;
use crate::core::monte_carlo::MonteCarloResult;
use crate::core::trajectory::Trajectory;
use crate::utils::logging::{start_timing, FileIOType, OperationCategory};

/// One Monte Carlo draw and its outcome, flattened for CSV.
#[derive(Debug, Serialize)]
struct IterationRow {
    index: usize,
    seed: u64,
    launch_cost_multiplier: f64,
    failure_rate_multiplier: f64,
    solar_learning_multiplier: f64,
    chip_cost_multiplier: f64,
    energy_price_multiplier: f64,
    crossover_year: Option<u32>,
    failure: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProviderRow {
    year: u32,
    tier: String,
    tier_price: f64,
    ground_gpu_hour: f64,
    orbit_gpu_hour: f64,
    ground_vs_tier: f64,
    orbit_vs_tier: f64,
}

/// Writes run results into a timestamped directory under the chosen root.
pub struct CsvExporter {
    output_dir: PathBuf,
    timestamp: String,
    verbose_logging: bool,
}

impl CsvExporter {
    pub fn new(output_dir: impl AsRef<Path>, verbose_logging: bool) -> Result<Self> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let full_path = output_dir.as_ref().join(&timestamp);
        std::fs::create_dir_all(&full_path)
            .with_context(|| format!("creating output directory {}", full_path.display()))?;

        Ok(Self {
            output_dir: full_path,
            timestamp,
            verbose_logging,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    fn write_rows<T: Serialize>(&self, file_name: &str, rows: impl IntoIterator<Item = T>) -> Result<PathBuf> {
        let _timing = start_timing(
            "write_csv",
            OperationCategory::FileIO { subcategory: FileIOType::ResultsSave },
        );
        let path = self.output_dir.join(file_name);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        for row in rows {
            writer
                .serialize(row)
                .with_context(|| format!("writing row to {}", path.display()))?;
        }
        writer.flush().with_context(|| format!("flushing {}", path.display()))?;

        if self.verbose_logging {
            info!(path = %path.display(), "CSV written");
        }
        Ok(path)
    }

    pub fn export_trajectory(&self, trajectory: &Trajectory) -> Result<PathBuf> {
        self.write_rows(
            "trajectory.csv",
            trajectory.years.iter().map(YearlySummaryRow::from),
        )
    }

    /// Writes `monte_carlo_by_year.csv` and `monte_carlo_iterations.csv`.
    pub fn export_monte_carlo(&self, result: &MonteCarloResult) -> Result<Vec<PathBuf>> {
        let by_year = self.write_rows("monte_carlo_by_year.csv", result.summary.by_year.iter())?;
        let iterations = self.write_rows(
            "monte_carlo_iterations.csv",
            result.iterations.iter().map(|iteration| IterationRow {
                index: iteration.sample.index,
                seed: iteration.sample.seed,
                launch_cost_multiplier: iteration.sample.launch_cost_multiplier,
                failure_rate_multiplier: iteration.sample.failure_rate_multiplier,
                solar_learning_multiplier: iteration.sample.solar_learning_multiplier,
                chip_cost_multiplier: iteration.sample.chip_cost_multiplier,
                energy_price_multiplier: iteration.sample.energy_price_multiplier,
                crossover_year: iteration.crossover_year,
                failure: iteration.failure.clone(),
            }),
        )?;
        Ok(vec![by_year, iterations])
    }

    pub fn export_sensitivity(&self, entries: &[SensitivityEntry]) -> Result<PathBuf> {
        self.write_rows("sensitivity.csv", entries.iter())
    }

    pub fn export_scenarios(&self, benchmarks: &[ScenarioBenchmark]) -> Result<PathBuf> {
        self.write_rows("scenarios.csv", benchmarks.iter())
    }

    pub fn export_providers(&self, comparisons: &[ProviderComparison]) -> Result<PathBuf> {
        self.write_rows(
            "providers.csv",
            comparisons.iter().flat_map(|comparison| {
                comparison.tiers.iter().map(move |tier| ProviderRow {
                    year: comparison.year,
                    tier: tier.tier.to_string(),
                    tier_price: tier.tier_price,
                    ground_gpu_hour: comparison.ground_gpu_hour,
                    orbit_gpu_hour: comparison.orbit_gpu_hour,
                    ground_vs_tier: tier.ground_vs_tier,
                    orbit_vs_tier: tier.orbit_vs_tier,
                })
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::simulation_config::SimulationConfig;
    use crate::config::year_params::{default_trajectory, ScenarioToggles};
    use crate::core::trajectory::TrajectoryRunner;

    #[test]
    fn test_trajectory_csv_has_one_row_per_year() {
        let root = std::env::temp_dir().join(format!("crossover_csv_{}", std::process::id()));
        let exporter = CsvExporter::new(&root, false).unwrap();
        let config = SimulationConfig::default();
        let params = default_trajectory(2025, 2029, ScenarioToggles::default());
        let trajectory = TrajectoryRunner::new(config).run(&params).unwrap();

        let path = exporter.export_trajectory(&trajectory).unwrap();
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert!(headers.iter().any(|header| header == "orbit_gpu_hour"));
        assert_eq!(reader.records().count(), 5);

        std::fs::remove_dir_all(&root).unwrap();
    }
}
