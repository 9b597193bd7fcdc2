use crate::analysis::metrics::YearlyBreakdown;
use crate::analysis::providers::ProviderComparison;
use crate::analysis::scenarios::ScenarioBenchmark;
use crate::analysis::sensitivity::SensitivityEntry;
use crate::core::monte_carlo::MonteCarloSummary;
use crate::core::trajectory::Trajectory;

fn year_or_never(year: Option<u32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_else(|| "never".to_string())
}

pub fn print_yearly_summary(breakdown: &YearlyBreakdown) {
    let ground = &breakdown.ground;
    let orbit = &breakdown.orbit;
    println!("\nYear {} Summary", breakdown.year);
    println!("----------------------------------------");
    println!("Ground ({}):", ground.model);
    println!("  Demand: {:.1} GW, Capacity: {:.1} GW", ground.metrics.market_demand_gw, ground.metrics.capacity_gw);
    println!("  Backlog: {:.1} GW, Wait: {:.2} years", ground.metrics.backlog_gw, ground.metrics.wait_years);
    println!("  Utilization: {:.1}%", ground.metrics.utilization * 100.0);
    println!("  Scarcity multiplier: {:.3}", ground.penalties.scarcity_multiplier);
    println!("  Base cost: ${:.0}/PFLOP-yr, Effective: ${:.0}/PFLOP-yr", ground.cost.base_total, ground.cost.effective_total);
    println!("  GPU-hour: ${:.3}", ground.gpu_hour.total);
    println!("Orbit:");
    println!("  Launch: ${:.1}/kg{}", orbit.launch.price_per_kg, if orbit.launch_clamped { " (held)" } else { "" });
    println!(
        "  Satellite: {:.0} kW, {:.0} kg, {} chips ({})",
        orbit.satellite.power_kw, orbit.satellite.total_mass_kg, orbit.satellite.chip_count, orbit.satellite.chip_generation
    );
    println!(
        "  Thermal cap: {:.3}, Degradation: {:.3}",
        orbit.satellite.thermal_cap_factor, orbit.satellite.hardware_degradation_factor
    );
    println!(
        "  Constellation: {} satellites, {} launches",
        orbit.constellation.num_satellites, orbit.constellation.launches_required
    );
    println!("  Effective cost: ${:.0}/PFLOP-yr", orbit.cost.effective_total);
    println!("  GPU-hour: ${:.3}", orbit.gpu_hour.total);
    println!("  Fleet: {:.2} GW deployed", orbit.fleet.deployed_gw);
    println!("Market:");
    println!(
        "  Orbital share: {:.1}%, Unserved: {:.1} GW",
        breakdown.market.orbital_share * 100.0,
        breakdown.market.unserved_gw
    );
    println!("  Crossover: {}", if breakdown.crossover { "yes" } else { "no" });
    if !breakdown.warnings.is_empty() {
        println!("Warnings:");
        for warning in &breakdown.warnings {
            println!("  {}", warning);
        }
    }
}

pub fn print_trajectory_table(trajectory: &Trajectory) {
    println!("\nTrajectory ({})", trajectory.ground_model);
    println!("{:<6} {:>10} {:>8} {:>8} {:>12} {:>12} {:>8} {:>8} {:>7}",
        "Year", "Demand GW", "Wait y", "Scarcity", "Ground $/PF", "Orbit $/PF", "Ground $h", "Orbit $h", "Orbit %");
    for year in &trajectory.years {
        println!(
            "{:<6} {:>10.1} {:>8.2} {:>8.3} {:>12.0} {:>12.0} {:>8.3} {:>8.3} {:>6.1}{}",
            year.year,
            year.ground.metrics.market_demand_gw,
            year.ground.metrics.wait_years,
            year.ground.penalties.scarcity_multiplier,
            year.ground.cost.effective_total,
            year.orbit.cost.effective_total,
            year.ground.gpu_hour.total,
            year.orbit.gpu_hour.total,
            year.market.orbital_share * 100.0,
            if year.crossover { " *" } else { "" },
        );
    }
    println!("----------------------------------------");
    println!("Crossover (effective): {}", year_or_never(trajectory.crossovers.effective));
    println!("Crossover (base):      {}", year_or_never(trajectory.crossovers.base));
    println!("Crossover (GPU-hour):  {}", year_or_never(trajectory.crossovers.gpu_hour));
    println!("Warnings: {}", trajectory.warning_count());
}

pub fn print_monte_carlo_summary(summary: &MonteCarloSummary) {
    println!("\nMonte Carlo Summary");
    println!("----------------------------------------");
    println!("Samples: {} ({} completed, {} failed), base seed {}", summary.samples, summary.completed, summary.failed, summary.base_seed);
    println!("Crossover P10: {}", year_or_never(summary.p10));
    println!("Crossover P50: {}", year_or_never(summary.p50));
    println!("Crossover P90: {}", year_or_never(summary.p90));
    if let Some(mean) = summary.mean_crossover_year {
        println!("Mean crossover (crossed samples): {:.1}", mean);
    }
    println!("Never crossed: {:.1}%", summary.never_crossed_fraction * 100.0);
    println!("P(orbit cheaper) by year:");
    for year in summary.by_year.iter().filter(|year| year.year % 5 == 0) {
        println!("  {}: {:>5.1}%  (median ratio {:.3})", year.year, year.p_orbit_cheaper * 100.0, year.median_cost_ratio);
    }
}

pub fn print_sensitivity(entries: &[SensitivityEntry]) {
    println!("\nSensitivity (one at a time)");
    println!("----------------------------------------");
    for entry in entries {
        println!(
            "{:<22} x{:.2}: {:>6}  x{:.2}: {:>6}  (base {}){}",
            entry.parameter.to_string(),
            entry.low_multiplier,
            year_or_never(entry.low_crossover),
            entry.high_multiplier,
            year_or_never(entry.high_crossover),
            year_or_never(entry.base_crossover),
            entry.swing_years().map(|years| format!(", swing {} y", years)).unwrap_or_default(),
        );
        for (multiplier, failure) in [
            (entry.low_multiplier, &entry.low_failure),
            (entry.high_multiplier, &entry.high_failure),
        ] {
            if let Some(failure) = failure {
                println!("{:<22} x{:.2} failed: {}", "", multiplier, failure);
            }
        }
    }
}

pub fn print_scenario_benchmarks(benchmarks: &[ScenarioBenchmark]) {
    println!("\nScenario Benchmarks");
    println!("----------------------------------------");
    for benchmark in benchmarks {
        match &benchmark.failure {
            Some(failure) => println!("{:<20} failed: {}", benchmark.scenario.to_string(), failure),
            None => println!(
                "{:<20} crossover {:>6}, base {:>6}, final orbital share {:.1}%",
                benchmark.scenario.to_string(),
                year_or_never(benchmark.crossover_year),
                year_or_never(benchmark.base_crossover_year),
                benchmark.final_orbital_share.unwrap_or(0.0) * 100.0,
            ),
        }
    }
}

pub fn print_provider_comparison(comparisons: &[ProviderComparison]) {
    println!("\nProvider Comparison ($/GPU-hour)");
    println!("----------------------------------------");
    for comparison in comparisons {
        println!(
            "{}: ground ${:.3}, orbit ${:.3}",
            comparison.year, comparison.ground_gpu_hour, comparison.orbit_gpu_hour
        );
        for tier in &comparison.tiers {
            println!(
                "  {:<22} ${:>6.3}  ground x{:.2}  orbit x{:.2}",
                tier.tier.to_string(),
                tier.tier_price,
                tier.ground_vs_tier,
                tier.orbit_vs_tier
            );
        }
    }
}
