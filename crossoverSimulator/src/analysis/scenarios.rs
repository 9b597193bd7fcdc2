use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::simulation_config::SimulationConfig;
use crate::config::year_params::{default_trajectory, GroundScenario, ScenarioToggles, YearParams};
use crate::core::trajectory::TrajectoryRunner;
use crate::utils::logging::{start_timing, OperationCategory};

const CHEAP_LAUNCH_MULTIPLIER: f64 = 0.5;
const SNAPSHOT_YEAR: u32 = 2035;

/// Named what-if presets run side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    Baseline,
    CheapLaunch,
    AiWinter,
    Fusion,
    SmrMitigation,
    SpaceManufacturing,
    RadHardChips,
    ConstrainedGrid,
}

impl Scenario {
    pub const ALL: [Scenario; 8] = [
        Scenario::Baseline,
        Scenario::CheapLaunch,
        Scenario::AiWinter,
        Scenario::Fusion,
        Scenario::SmrMitigation,
        Scenario::SpaceManufacturing,
        Scenario::RadHardChips,
        Scenario::ConstrainedGrid,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::Baseline => "Reference trajectory, all toggles off",
            Scenario::CheapLaunch => "Half-price launch with aggressive discounting",
            Scenario::AiWinter => "Demand growth halves after 2027",
            Scenario::Fusion => "Compact fusion available as an orbital power source",
            Scenario::SmrMitigation => "Small modular reactors relieve grid generation",
            Scenario::SpaceManufacturing => "In-space manufacturing lightens structure and bus",
            Scenario::RadHardChips => "Radiation-hardened accelerators in orbit",
            Scenario::ConstrainedGrid => "Slower grid buildout and dearer energy",
        }
    }

    pub fn toggles(&self) -> ScenarioToggles {
        let base = ScenarioToggles::default();
        match self {
            Scenario::Baseline | Scenario::ConstrainedGrid => base,
            Scenario::CheapLaunch => ScenarioToggles { aggressive_discount: true, ..base },
            Scenario::AiWinter => ScenarioToggles { ai_winter: true, ..base },
            Scenario::Fusion => ScenarioToggles { fusion_power: true, ..base },
            Scenario::SmrMitigation => ScenarioToggles { smr_mitigation: true, ..base },
            Scenario::SpaceManufacturing => ScenarioToggles { space_manufacturing: true, ..base },
            Scenario::RadHardChips => ScenarioToggles { radiation_hardened_chips: true, ..base },
        }
    }

    pub fn configure(&self, base: &SimulationConfig) -> SimulationConfig {
        let mut config = base.clone();
        if *self == Scenario::CheapLaunch {
            config.orbital.launch_cost_multiplier *= CHEAP_LAUNCH_MULTIPLIER;
        }
        config
    }

    pub fn params(&self, config: &SimulationConfig) -> Vec<YearParams> {
        let mut params = default_trajectory(config.start_year, config.end_year, self.toggles());
        if *self == Scenario::ConstrainedGrid {
            for row in &mut params {
                row.ground_scenario = GroundScenario::Constrained;
            }
        }
        params
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baseline" => Ok(Scenario::Baseline),
            "cheap-launch" => Ok(Scenario::CheapLaunch),
            "ai-winter" => Ok(Scenario::AiWinter),
            "fusion" => Ok(Scenario::Fusion),
            "smr" => Ok(Scenario::SmrMitigation),
            "space-manufacturing" => Ok(Scenario::SpaceManufacturing),
            "rad-hard" => Ok(Scenario::RadHardChips),
            "constrained-grid" => Ok(Scenario::ConstrainedGrid),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scenario::Baseline => write!(f, "baseline"),
            Scenario::CheapLaunch => write!(f, "cheap-launch"),
            Scenario::AiWinter => write!(f, "ai-winter"),
            Scenario::Fusion => write!(f, "fusion"),
            Scenario::SmrMitigation => write!(f, "smr"),
            Scenario::SpaceManufacturing => write!(f, "space-manufacturing"),
            Scenario::RadHardChips => write!(f, "rad-hard"),
            Scenario::ConstrainedGrid => write!(f, "constrained-grid"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioBenchmark {
    pub scenario: Scenario,
    pub description: &'static str,
    pub crossover_year: Option<u32>,
    pub base_crossover_year: Option<u32>,
    pub snapshot_year: u32,
    pub ground_effective_per_pflop_year: Option<f64>,
    pub orbit_effective_per_pflop_year: Option<f64>,
    pub final_orbital_share: Option<f64>,
    pub failure: Option<String>,
}

pub fn run_scenario(scenario: Scenario, base: &SimulationConfig) -> ScenarioBenchmark {
    let config = scenario.configure(base);
    let params = scenario.params(&config);
    let mut benchmark = ScenarioBenchmark {
        scenario,
        description: scenario.description(),
        crossover_year: None,
        base_crossover_year: None,
        snapshot_year: SNAPSHOT_YEAR,
        ground_effective_per_pflop_year: None,
        orbit_effective_per_pflop_year: None,
        final_orbital_share: None,
        failure: None,
    };

    match TrajectoryRunner::new(config).run(&params) {
        Ok(trajectory) => {
            let snapshot = trajectory.year(SNAPSHOT_YEAR);
            benchmark.crossover_year = trajectory.crossover_year;
            benchmark.base_crossover_year = trajectory.crossovers.base;
            benchmark.ground_effective_per_pflop_year = snapshot.map(|year| year.ground.cost.effective_total);
            benchmark.orbit_effective_per_pflop_year = snapshot.map(|year| year.orbit.cost.effective_total);
            benchmark.final_orbital_share = trajectory.years.last().map(|year| year.market.orbital_share);
        }
        Err(error) => benchmark.failure = Some(error.to_string()),
    }
    benchmark
}

/// Runs every preset. Presets are independent, so they run in parallel when asked.
pub fn run_scenario_benchmarks(base: &SimulationConfig, parallel: bool) -> Vec<ScenarioBenchmark> {
    let _timing = start_timing("run_scenario_benchmarks", OperationCategory::Analysis);
    if parallel {
        Scenario::ALL.par_iter().map(|scenario| run_scenario(*scenario, base)).collect()
    } else {
        Scenario::ALL.iter().map(|scenario| run_scenario(*scenario, base)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.to_string().parse::<Scenario>().unwrap(), scenario);
        }
        assert!("warp-drive".parse::<Scenario>().is_err());
    }

    #[test]
    fn test_baseline_has_no_toggles() {
        assert_eq!(Scenario::Baseline.toggles(), ScenarioToggles::default());
        let config = SimulationConfig::default();
        assert_eq!(Scenario::Baseline.configure(&config).orbital.launch_cost_multiplier, 1.0);
    }

    #[test]
    fn test_cheap_launch_lowers_orbital_cost() {
        let config = SimulationConfig::default();
        let baseline = run_scenario(Scenario::Baseline, &config);
        let cheap = run_scenario(Scenario::CheapLaunch, &config);
        assert!(baseline.failure.is_none() && cheap.failure.is_none());
        assert!(cheap.orbit_effective_per_pflop_year.unwrap() < baseline.orbit_effective_per_pflop_year.unwrap());
    }

    #[test]
    fn test_constrained_grid_rows() {
        let config = SimulationConfig::default();
        let params = Scenario::ConstrainedGrid.params(&config);
        assert!(params.iter().all(|row| row.ground_scenario == GroundScenario::Constrained));
    }
}
