use clap::Parser;

use crate::analysis::scenarios::Scenario;
use crate::config::simulation_config::{GroundModelKind, LaunchModelKind};
use crate::config::year_params::ScenarioToggles;

#[derive(Parser)]
#[command(author, version, about = "Orbital vs ground compute crossover simulator", long_about = None)]
pub struct Args {
    #[arg(long, help = "JSON simulation config; defaults are used when omitted")]
    config: Option<String>,

    #[arg(long, default_value_t = false)]
    monte_carlo: bool,

    #[arg(short = 'n', long, default_value_t = 500)]
    samples: usize,

    #[arg(long, default_value_t = 42, help = "Base seed; sample i uses seed + i")]
    seed: u64,

    #[arg(short, long, default_value_t = true)]
    parallel: bool,

    #[arg(long, default_value_t = false, help = "Abort on range violations (default)")]
    strict: bool,

    #[arg(long, default_value_t = false, conflicts_with = "strict", help = "Degrade range violations to warnings")]
    lenient: bool,

    #[arg(long, value_parser = clap::value_parser!(GroundModelKind), help = "queue, regional or mobilization")]
    ground_model: Option<GroundModelKind>,

    #[arg(long, value_parser = clap::value_parser!(LaunchModelKind), help = "curve or wright")]
    launch_model: Option<LaunchModelKind>,

    #[arg(long, value_parser = clap::value_parser!(Scenario), help = "Run a named preset instead of the baseline")]
    scenario: Option<Scenario>,

    #[arg(long, default_value_t = false, help = "Also run every preset side by side")]
    scenario_benchmarks: bool,

    #[arg(long, default_value_t = false)]
    sensitivity: bool,

    #[arg(long, default_value_t = false, help = "Print the per-year breakdown")]
    yearly_details: bool,

    #[arg(long, default_value_t = false)]
    rad_hard_chips: bool,

    #[arg(long, default_value_t = false)]
    fusion: bool,

    #[arg(long, default_value_t = false)]
    smr: bool,

    #[arg(long, default_value_t = false)]
    aggressive_discount: bool,

    #[arg(long, default_value_t = false)]
    global_latency: bool,

    #[arg(long, default_value_t = false)]
    space_manufacturing: bool,

    #[arg(long, default_value_t = false)]
    ai_winter: bool,

    #[arg(long, help = "Directory for timestamped CSV exports")]
    csv_dir: Option<String>,

    #[arg(long, help = "Write the full model output as JSON")]
    json_out: Option<String>,

    #[arg(long, default_value_t = false)]
    enable_timing: bool,

    #[arg(long, default_value_t = false)]
    debug_logging: bool,
}

impl Args {
    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn monte_carlo(&self) -> bool {
        self.monte_carlo
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// `Some(true)` for strict, `Some(false)` for lenient, `None` to keep the config's mode.
    pub fn strictness_override(&self) -> Option<bool> {
        if self.strict {
            Some(true)
        } else if self.lenient {
            Some(false)
        } else {
            None
        }
    }

    pub fn ground_model(&self) -> Option<GroundModelKind> {
        self.ground_model
    }

    pub fn launch_model(&self) -> Option<LaunchModelKind> {
        self.launch_model
    }

    pub fn scenario(&self) -> Option<Scenario> {
        self.scenario
    }

    pub fn scenario_benchmarks(&self) -> bool {
        self.scenario_benchmarks
    }

    pub fn sensitivity(&self) -> bool {
        self.sensitivity
    }

    pub fn yearly_details(&self) -> bool {
        self.yearly_details
    }

    /// Flags layered over the chosen preset's toggles.
    pub fn toggles(&self, base: ScenarioToggles) -> ScenarioToggles {
        ScenarioToggles {
            radiation_hardened_chips: base.radiation_hardened_chips || self.rad_hard_chips,
            fusion_power: base.fusion_power || self.fusion,
            smr_mitigation: base.smr_mitigation || self.smr,
            aggressive_discount: base.aggressive_discount || self.aggressive_discount,
            global_latency: base.global_latency || self.global_latency,
            space_manufacturing: base.space_manufacturing || self.space_manufacturing,
            ai_winter: base.ai_winter || self.ai_winter,
        }
    }

    pub fn csv_dir(&self) -> Option<&str> {
        self.csv_dir.as_deref()
    }

    pub fn json_out(&self) -> Option<&str> {
        self.json_out.as_deref()
    }

    pub fn enable_timing(&self) -> bool {
        self.enable_timing
    }

    pub fn debug_logging(&self) -> bool {
        self.debug_logging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_model_and_toggle_flags() {
        let args = Args::try_parse_from([
            "orbital-crossover",
            "--ground-model",
            "regional",
            "--launch-model",
            "wright",
            "--scenario",
            "fusion",
            "--ai-winter",
            "--lenient",
        ])
        .unwrap();
        assert_eq!(args.ground_model(), Some(GroundModelKind::RegionalAggregate));
        assert_eq!(args.launch_model(), Some(LaunchModelKind::WrightsLaw));
        assert_eq!(args.scenario(), Some(Scenario::Fusion));
        assert_eq!(args.strictness_override(), Some(false));

        let toggles = args.toggles(Scenario::Fusion.toggles());
        assert!(toggles.fusion_power && toggles.ai_winter);
        assert!(!toggles.smr_mitigation);
    }

    #[test]
    fn test_strict_and_lenient_conflict() {
        assert!(Args::try_parse_from(["orbital-crossover", "--strict", "--lenient"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["orbital-crossover"]).unwrap();
        assert_eq!(args.samples(), 500);
        assert_eq!(args.seed(), 42);
        assert!(args.strictness_override().is_none());
        assert!(args.config().is_none());
    }
}
