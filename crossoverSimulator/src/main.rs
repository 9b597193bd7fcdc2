use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use orbital_crossover::analysis::final_output::{FinalModelOutput, PROVIDER_COMPARISON_YEARS};
use orbital_crossover::analysis::providers::compare_providers;
use orbital_crossover::analysis::reporting;
use orbital_crossover::analysis::scenarios::{run_scenario_benchmarks, Scenario};
use orbital_crossover::analysis::sensitivity::{SensitivityAnalyzer, DEFAULT_SWING};
use orbital_crossover::cli::cli::Args;
use orbital_crossover::config::simulation_config::{SimulationConfig, StrictnessMode};
use orbital_crossover::core::monte_carlo::{MonteCarloAnalyzer, MonteCarloConfig};
use orbital_crossover::core::trajectory::TrajectoryRunner;
use orbital_crossover::utils::csv_export::CsvExporter;
use orbital_crossover::utils::logging::{self, FileIOType, OperationCategory};

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let _timing = logging::start_timing(
        "load_config",
        OperationCategory::FileIO { subcategory: FileIOType::ConfigLoad },
    );
    let mut config = match args.config() {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(strict) = args.strictness_override() {
        config.strictness = if strict { StrictnessMode::Strict } else { StrictnessMode::Lenient };
    }
    if let Some(ground_model) = args.ground_model() {
        config.ground_model = ground_model;
    }
    if let Some(launch_model) = args.launch_model() {
        config.launch_model = launch_model;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_logging(args.enable_timing(), args.debug_logging())?;

    let scenario = args.scenario().unwrap_or(Scenario::Baseline);
    let config = scenario.configure(&load_config(&args)?);
    let mut params = scenario.params(&config);
    for row in &mut params {
        row.toggles = args.toggles(row.toggles);
    }

    println!(
        "Orbital vs Ground Compute Crossover Simulator ({}-{})",
        config.start_year, config.end_year
    );
    println!(
        "Scenario: {}, ground model: {:?}, launch model: {:?}, mode: {:?}",
        scenario, config.ground_model, config.launch_model, config.strictness
    );

    let trajectory = TrajectoryRunner::new(config.clone())
        .run(&params)
        .context("running trajectory")?;
    info!(crossover_year = ?trajectory.crossover_year, "Trajectory complete");

    if args.yearly_details() {
        for year in &trajectory.years {
            reporting::print_yearly_summary(year);
        }
    }
    reporting::print_trajectory_table(&trajectory);

    let providers = compare_providers(&trajectory, &PROVIDER_COMPARISON_YEARS);
    reporting::print_provider_comparison(&providers);
    let mut output = FinalModelOutput::new(&config, &trajectory).with_providers(providers.clone());

    let sensitivity = if args.sensitivity() {
        let entries = SensitivityAnalyzer::new(config.clone(), DEFAULT_SWING).run(&params, args.parallel());
        reporting::print_sensitivity(&entries);
        entries
    } else {
        Vec::new()
    };
    output = output.with_sensitivity(sensitivity.clone());

    let benchmarks = if args.scenario_benchmarks() {
        let benchmarks = run_scenario_benchmarks(&config, args.parallel());
        reporting::print_scenario_benchmarks(&benchmarks);
        benchmarks
    } else {
        Vec::new()
    };
    output = output.with_scenarios(benchmarks.clone());

    let monte_carlo = if args.monte_carlo() {
        let mc_config = MonteCarloConfig {
            samples: args.samples(),
            base_seed: args.seed(),
            parallel: args.parallel(),
            show_progress: true,
            ..MonteCarloConfig::default()
        };
        let result = MonteCarloAnalyzer::new(config.clone(), mc_config)
            .run(&params)
            .context("running Monte Carlo")?;
        reporting::print_monte_carlo_summary(&result.summary);
        output = output.with_monte_carlo(result.summary.clone());
        Some(result)
    } else {
        None
    };

    if let Some(csv_dir) = args.csv_dir() {
        let exporter = CsvExporter::new(csv_dir, args.debug_logging())?;
        exporter.export_trajectory(&trajectory)?;
        exporter.export_providers(&providers)?;
        if !sensitivity.is_empty() {
            exporter.export_sensitivity(&sensitivity)?;
        }
        if !benchmarks.is_empty() {
            exporter.export_scenarios(&benchmarks)?;
        }
        if let Some(result) = &monte_carlo {
            exporter.export_monte_carlo(result)?;
        }
        println!("CSV export written to {}", exporter.output_dir().display());
    }

    if let Some(json_out) = args.json_out() {
        output.write_json(json_out)?;
        println!("Model output written to {}", json_out);
    }

    if args.enable_timing() {
        logging::print_timing_report();
    }

    Ok(())
}
