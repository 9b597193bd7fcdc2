//! Crossover-year distribution under parameter uncertainty.
//!
//! Every sample draws from its own `ChaCha8Rng` seeded with `base_seed + index`,
//! so the result does not depend on how rayon schedules the samples.

use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, LogNormal, Normal, Triangular};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::simulation_config::SimulationConfig;
use crate::config::year_params::YearParams;
use crate::core::errors::{SimResult, SimulationError};
use crate::core::iteration::{run_iteration, IterationResult};
use crate::utils::logging::{self, OperationCategory};

const TRUNCATION_RETRIES: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    pub samples: usize,
    pub base_seed: u64,
    pub parallel: bool,
    pub show_progress: bool,
    /// Log-space standard deviation of the launch-cost multiplier (median 1).
    pub launch_cost_sigma: f64,
    /// (min, mode, max) of the failure-rate multiplier.
    pub failure_rate_triangle: (f64, f64, f64),
    pub learning_sigma: f64,
    pub learning_bounds: (f64, f64),
    pub energy_price_range: (f64, f64),
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            samples: 500,
            base_seed: 42,
            parallel: true,
            show_progress: false,
            launch_cost_sigma: 0.35,
            failure_rate_triangle: (0.5, 1.0, 2.0),
            learning_sigma: 0.15,
            learning_bounds: (0.6, 1.4),
            energy_price_range: (0.8, 1.3),
        }
    }
}

impl MonteCarloConfig {
    pub fn validate(&self) -> SimResult<()> {
        let (min, mode, max) = self.failure_rate_triangle;
        let (low, high) = self.learning_bounds;
        let (energy_low, energy_high) = self.energy_price_range;
        let problems = [
            (self.samples == 0, "at least one sample is required"),
            (!(self.launch_cost_sigma >= 0.0), "launch cost sigma must be non-negative"),
            (!(min > 0.0 && min <= mode && mode <= max && min < max), "failure triangle must satisfy 0 < min <= mode <= max"),
            (!(self.learning_sigma >= 0.0), "learning sigma must be non-negative"),
            (!(low > 0.0 && low < high), "learning bounds must satisfy 0 < low < high"),
            (!(energy_low > 0.0 && energy_low < energy_high), "energy range must satisfy 0 < low < high"),
        ];
        match problems.iter().find(|(bad, _)| *bad) {
            Some((_, message)) => Err(SimulationError::InvalidInput(message.to_string())),
            None => Ok(()),
        }
    }
}

/// One draw of the uncertain multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSample {
    pub index: usize,
    pub seed: u64,
    pub launch_cost_multiplier: f64,
    pub failure_rate_multiplier: f64,
    pub solar_learning_multiplier: f64,
    pub chip_cost_multiplier: f64,
    pub energy_price_multiplier: f64,
}

fn invalid(error: impl std::fmt::Display) -> SimulationError {
    SimulationError::InvalidInput(format!("distribution: {}", error))
}

fn truncated_normal(rng: &mut ChaCha8Rng, normal: &Normal<f64>, bounds: (f64, f64)) -> f64 {
    for _ in 0..TRUNCATION_RETRIES {
        let value = normal.sample(rng);
        if value >= bounds.0 && value <= bounds.1 {
            return value;
        }
    }
    normal.mean().clamp(bounds.0, bounds.1)
}

impl ParameterSample {
    pub fn draw(index: usize, config: &MonteCarloConfig) -> SimResult<Self> {
        let seed = config.base_seed.wrapping_add(index as u64);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let launch = LogNormal::new(0.0, config.launch_cost_sigma).map_err(invalid)?;
        let (min, mode, max) = config.failure_rate_triangle;
        let failure = Triangular::new(min, max, mode).map_err(invalid)?;
        let learning = Normal::new(1.0, config.learning_sigma).map_err(invalid)?;

        // Draw order is fixed so a seed always maps to the same sample.
        let launch_cost_multiplier = launch.sample(&mut rng);
        let failure_rate_multiplier = failure.sample(&mut rng);
        let solar_learning_multiplier = truncated_normal(&mut rng, &learning, config.learning_bounds);
        let chip_cost_multiplier = truncated_normal(&mut rng, &learning, config.learning_bounds);
        let energy_price_multiplier = rng.gen_range(config.energy_price_range.0..config.energy_price_range.1);

        Ok(Self {
            index,
            seed,
            launch_cost_multiplier,
            failure_rate_multiplier,
            solar_learning_multiplier,
            chip_cost_multiplier,
            energy_price_multiplier,
        })
    }

    /// The base configuration with this sample's multipliers folded in.
    pub fn apply(&self, base: &SimulationConfig) -> SimulationConfig {
        let mut config = base.clone();
        config.orbital.launch_cost_multiplier *= self.launch_cost_multiplier;
        config.orbital.failure_rate_multiplier *= self.failure_rate_multiplier;
        config.orbital.solar_learning_multiplier *= self.solar_learning_multiplier;
        config.orbital.chip_cost_multiplier *= self.chip_cost_multiplier;
        config.finance.energy_price_multiplier *= self.energy_price_multiplier;
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearProbability {
    pub year: u32,
    pub p_orbit_cheaper: f64,
    pub median_cost_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloSummary {
    pub samples: usize,
    pub completed: usize,
    pub failed: usize,
    pub base_seed: u64,
    /// `None` when that percentile lies beyond the horizon (never crossed).
    pub p10: Option<u32>,
    pub p50: Option<u32>,
    pub p90: Option<u32>,
    pub mean_crossover_year: Option<f64>,
    pub never_crossed_fraction: f64,
    pub by_year: Vec<YearProbability>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloResult {
    pub summary: MonteCarloSummary,
    pub iterations: Vec<IterationResult>,
}

/// Nearest-rank percentile where never-crossed samples sort after every year.
pub fn crossover_percentile(crossed_sorted: &[u32], total: usize, quantile: f64) -> Option<u32> {
    if total == 0 {
        return None;
    }
    let rank = ((quantile * total as f64).ceil() as usize).clamp(1, total);
    crossed_sorted.get(rank - 1).copied()
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

pub fn summarize(iterations: &[IterationResult], base_seed: u64) -> MonteCarloSummary {
    let completed: Vec<&IterationResult> = iterations.iter().filter(|it| it.completed()).collect();
    let total = completed.len();

    let mut crossed: Vec<u32> = completed.iter().filter_map(|it| it.crossover_year).collect();
    crossed.sort_unstable();

    let never = total - crossed.len();
    let mean_crossover_year = if crossed.is_empty() {
        None
    } else {
        Some(crossed.iter().map(|&year| year as f64).sum::<f64>() / crossed.len() as f64)
    };

    let by_year = completed
        .first()
        .map(|first| {
            first
                .years
                .iter()
                .enumerate()
                .map(|(i, sample_year)| {
                    let mut ratios: Vec<f64> = completed.iter().filter_map(|it| it.years.get(i)).map(|y| y.cost_ratio).collect();
                    let cheaper = completed
                        .iter()
                        .filter(|it| it.years.get(i).is_some_and(|y| y.orbit_cheaper))
                        .count();
                    YearProbability {
                        year: sample_year.year,
                        p_orbit_cheaper: cheaper as f64 / total as f64,
                        median_cost_ratio: median(&mut ratios),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    MonteCarloSummary {
        samples: iterations.len(),
        completed: total,
        failed: iterations.len() - total,
        base_seed,
        p10: crossover_percentile(&crossed, total, 0.10),
        p50: crossover_percentile(&crossed, total, 0.50),
        p90: crossover_percentile(&crossed, total, 0.90),
        mean_crossover_year,
        never_crossed_fraction: if total > 0 { never as f64 / total as f64 } else { 0.0 },
        by_year,
    }
}

pub struct MonteCarloAnalyzer {
    base: SimulationConfig,
    config: MonteCarloConfig,
}

impl MonteCarloAnalyzer {
    pub fn new(base: SimulationConfig, config: MonteCarloConfig) -> Self {
        Self { base, config }
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    pub fn draw_samples(&self) -> SimResult<Vec<ParameterSample>> {
        self.config.validate()?;
        (0..self.config.samples)
            .map(|index| ParameterSample::draw(index, &self.config))
            .collect()
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(self.config.samples as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "{elapsed_precise} {bar:40.cyan/blue} {pos}/{len} {percent}% ETA {eta_precise}",
        ) {
            progress.set_style(style.progress_chars("##-"));
        }
        progress
    }

    pub fn run(&self, params: &[YearParams]) -> SimResult<MonteCarloResult> {
        let _timing = logging::start_timing("run_monte_carlo", OperationCategory::MonteCarlo);
        let samples = self.draw_samples()?;
        let progress = self.progress_bar();

        info!(
            samples = samples.len(),
            base_seed = self.config.base_seed,
            parallel = self.config.parallel,
            "starting Monte Carlo"
        );

        let run_one = |sample: &ParameterSample| {
            let result = run_iteration(sample, &self.base, params);
            progress.inc(1);
            result
        };
        let iterations: Vec<IterationResult> = if self.config.parallel {
            samples.par_iter().map(run_one).collect()
        } else {
            samples.iter().map(run_one).collect()
        };
        progress.finish_and_clear();

        let summary = summarize(&iterations, self.config.base_seed);
        info!(
            completed = summary.completed,
            failed = summary.failed,
            p50 = ?summary.p50,
            never_crossed = summary.never_crossed_fraction,
            "Monte Carlo complete"
        );
        Ok(MonteCarloResult { summary, iterations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::iteration::SampleYear;

    fn fake_iteration(index: usize, crossover: Option<u32>) -> IterationResult {
        let sample = ParameterSample::draw(index, &MonteCarloConfig::default()).unwrap();
        IterationResult {
            sample,
            crossover_year: crossover,
            years: vec![
                SampleYear { year: 2040, orbit_cheaper: crossover.is_some_and(|y| y <= 2040), cost_ratio: 1.0 },
                SampleYear { year: 2041, orbit_cheaper: crossover.is_some_and(|y| y <= 2041), cost_ratio: 0.9 },
            ],
            failure: None,
        }
    }

    #[test]
    fn test_same_seed_same_draw() {
        let config = MonteCarloConfig::default();
        let a = ParameterSample::draw(7, &config).unwrap();
        let b = ParameterSample::draw(7, &config).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, ParameterSample::draw(8, &config).unwrap());
    }

    #[test]
    fn test_draws_respect_bounds() {
        let config = MonteCarloConfig::default();
        for index in 0..200 {
            let sample = ParameterSample::draw(index, &config).unwrap();
            assert!(sample.launch_cost_multiplier > 0.0);
            assert!((0.5..=2.0).contains(&sample.failure_rate_multiplier));
            assert!((0.6..=1.4).contains(&sample.solar_learning_multiplier));
            assert!((0.6..=1.4).contains(&sample.chip_cost_multiplier));
            assert!((0.8..1.3).contains(&sample.energy_price_multiplier));
        }
    }

    #[test]
    fn test_percentiles_treat_never_as_late() {
        let iterations = vec![
            fake_iteration(0, Some(2040)),
            fake_iteration(1, Some(2041)),
            fake_iteration(2, None),
            fake_iteration(3, None),
        ];
        let summary = summarize(&iterations, 42);
        assert_eq!(summary.p10, Some(2040));
        assert_eq!(summary.p50, Some(2041));
        assert_eq!(summary.p90, None);
        assert!((summary.never_crossed_fraction - 0.5).abs() < 1e-12);
        assert!((summary.by_year[0].p_orbit_cheaper - 0.25).abs() < 1e-12);
        assert!((summary.by_year[1].p_orbit_cheaper - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_failed_samples_excluded() {
        let mut failed = fake_iteration(1, None);
        failed.failure = Some("thermal".to_string());
        failed.years.clear();
        let summary = summarize(&[fake_iteration(0, Some(2038)), failed], 1);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.p50, Some(2038));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MonteCarloConfig {
            failure_rate_triangle: (2.0, 1.0, 0.5),
            ..MonteCarloConfig::default()
        };
        assert!(matches!(config.validate(), Err(SimulationError::InvalidInput(_))));
    }
}
