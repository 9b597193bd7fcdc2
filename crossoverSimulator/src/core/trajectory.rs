//! Year-by-year trajectory. All cross-year state is threaded by value through
//! `RunState`; nothing is cached between runs, so identical inputs give
//! identical output.

use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::metrics::{GroundBreakdown, OrbitBreakdown, YearlyBreakdown};
use crate::config::constants::*;
use crate::config::simulation_config::{CrossoverBasis, LaunchModelKind, SimulationConfig};
use crate::config::year_params::{default_trajectory, ScenarioToggles, YearParams};
use crate::core::accounting::{CostAccountingValidator, YearLedgers};
use crate::core::crossover::{find_crossover, orbit_cheaper, CrossoverSummary};
use crate::core::errors::{SimResult, SimulationError};
use crate::core::ground_metrics::resolve_ground_metrics;
use crate::core::market_share::{MarketInputs, MarketShareAllocator};
use crate::core::validation::Diagnostics;
use crate::models::constellation::ConstellationSizer;
use crate::models::fleet::{step_fleet, OrbitalFleetState};
use crate::models::ground_cost::GroundCostModel;
use crate::models::ground_penalties::{BuildoutState, GroundConstraintPenalties};
use crate::models::ground_supply::{GroundSupplyModel, MarketSignals, SupplySnapshot, SupplyState};
use crate::models::launch_cost::{LaunchCostModel, LaunchQuote};
use crate::models::launch_learning::{background_launch_mass_kg, LaunchLearningModel, LaunchLearningState};
use crate::models::orbital::cost::compute_orbital_cost;
use crate::models::orbital::OrbitalPhysicsModel;
use crate::models::pricing::PricingConverter;
use crate::utils::logging::{start_timing, OperationCategory};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    pub ground_model: &'static str,
    pub years: Vec<YearlyBreakdown>,
    pub crossover_year: Option<u32>,
    pub crossovers: CrossoverSummary,
}

impl Trajectory {
    pub fn year(&self, year: u32) -> Option<&YearlyBreakdown> {
        self.years.iter().find(|breakdown| breakdown.year == year)
    }

    pub fn warning_count(&self) -> usize {
        self.years.iter().map(|year| year.warnings.len()).sum()
    }
}

/// Previous-year state carried into the next step.
#[derive(Debug, Clone)]
struct RunState {
    supply: SupplyState,
    snapshot: SupplySnapshot,
    buildout: BuildoutState,
    launch: LaunchLearningState,
    launch_reference_per_kg: f64,
    fleet: OrbitalFleetState,
    signals: MarketSignals,
    desired_orbital_share: f64,
}

pub struct TrajectoryRunner {
    config: SimulationConfig,
    ground_supply: GroundSupplyModel,
    penalties: GroundConstraintPenalties,
    ground_cost: GroundCostModel,
    launch_curve: LaunchCostModel,
    launch_learning: LaunchLearningModel,
    physics: OrbitalPhysicsModel,
    pricing: PricingConverter,
    allocator: MarketShareAllocator,
    validator: CostAccountingValidator,
}

impl TrajectoryRunner {
    pub fn new(config: SimulationConfig) -> Self {
        let ground_supply = GroundSupplyModel::from_config(&config);
        Self::with_supply_model(config, ground_supply)
    }

    /// Runner around a supply model built by hand, e.g. a custom regional split.
    /// `config.ground_model` is ignored.
    pub fn with_supply_model(config: SimulationConfig, ground_supply: GroundSupplyModel) -> Self {
        Self {
            ground_supply,
            penalties: GroundConstraintPenalties::new(config.finance.clone()),
            ground_cost: GroundCostModel::new(config.finance.clone()),
            launch_curve: LaunchCostModel::default(),
            launch_learning: LaunchLearningModel::default(),
            physics: OrbitalPhysicsModel::new(config.orbital.clone()),
            pricing: PricingConverter::new(config.pricing.clone()),
            allocator: MarketShareAllocator::new(config.market.clone()),
            validator: CostAccountingValidator::default(),
            config,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Runs the configured year range with default parameter rows.
    pub fn run_default(&self, toggles: ScenarioToggles) -> SimResult<Trajectory> {
        self.run(&default_trajectory(self.config.start_year, self.config.end_year, toggles))
    }

    pub fn run(&self, params: &[YearParams]) -> SimResult<Trajectory> {
        let _timing = start_timing("run_trajectory", OperationCategory::Simulation);
        if params.is_empty() {
            return Err(SimulationError::InvalidInput("empty parameter trajectory".to_string()));
        }
        for pair in params.windows(2) {
            if pair[1].year != pair[0].year + 1 {
                return Err(SimulationError::InvalidInput(format!(
                    "parameter years must be consecutive, found {} then {}",
                    pair[0].year, pair[1].year
                )));
            }
        }

        let mut years = Vec::with_capacity(params.len());
        let mut state: Option<RunState> = None;
        for year_params in params {
            let (breakdown, next) = self.step_year(year_params, state.as_ref())?;
            years.push(breakdown);
            state = Some(next);
        }

        let crossover_year = find_crossover(&years, self.config.crossover_basis);
        let crossovers = CrossoverSummary::from_years(&years);
        info!(
            ground_model = self.ground_supply.name(),
            crossover = ?crossover_year,
            base_crossover = ?crossovers.base,
            "trajectory complete"
        );

        Ok(Trajectory {
            ground_model: self.ground_supply.name(),
            years,
            crossover_year,
            crossovers,
        })
    }

    /// Price per kg charged this year and the quote itemizing it.
    fn launch_quote(&self, params: &YearParams, previous: Option<&RunState>) -> (LaunchQuote, f64, bool) {
        let curve = self.launch_curve.quote(params);
        let reference = previous
            .map(|state| state.launch_reference_per_kg)
            .unwrap_or(curve.price_per_kg);

        let candidate = match (self.config.launch_model, previous) {
            (LaunchModelKind::WrightsLaw, Some(state)) => {
                self.launch_learning.cost_per_kg(reference, state.launch.cumulative_mass_kg)
            }
            _ => curve.price_per_kg,
        } * self.config.orbital.launch_cost_multiplier;

        let (price, clamped) = match previous {
            Some(state) => state.launch.enforce_monotone(candidate),
            None => (candidate, false),
        };
        (curve.scaled_to(price), reference, clamped)
    }

    fn step_year(&self, params: &YearParams, previous: Option<&RunState>) -> SimResult<(YearlyBreakdown, RunState)> {
        let _timing = start_timing("step_year", OperationCategory::Simulation);
        let year = params.year;
        params.validate()?;
        let mut diagnostics = Diagnostics::new(self.config.strictness);

        // Ground supply
        let supply = match previous {
            Some(state) => self.ground_supply.step(&state.supply, params, &state.signals)?,
            None => self.ground_supply.initial_state(params)?,
        };
        let snapshot = self.ground_supply.snapshot(&supply);
        let wait_discontinuity = previous
            .map(|state| (snapshot.avg_wait_years - state.snapshot.avg_wait_years).abs() > WAIT_DISCONTINUITY_YEARS)
            .unwrap_or(false);
        if let (true, Some(state)) = (wait_discontinuity, previous) {
            diagnostics.note(format!(
                "[{}] wait time jumped from {:.2} to {:.2} years",
                year, state.snapshot.avg_wait_years, snapshot.avg_wait_years
            ));
        }

        let metrics = resolve_ground_metrics(&snapshot, previous.map(|state| &state.buildout), &mut diagnostics);
        let at_risk = self.ground_cost.at_risk_capex_per_kw(params);
        let penalties = self.penalties.compute(&metrics, at_risk, &mut diagnostics)?;
        let buildout = previous
            .map(|state| state.buildout)
            .unwrap_or_else(|| BuildoutState::initial(year))
            .advance(&metrics, &penalties, &self.config.finance);
        let ground_cost = self.ground_cost.compute(params, &penalties, &buildout)?;

        // Orbit
        let (launch, launch_reference_per_kg, launch_clamped) = self.launch_quote(params, previous);
        if launch_clamped {
            diagnostics.note(format!(
                "[{}] launch price held at previous year's {:.2} $/kg",
                year, launch.price_per_kg
            ));
        }
        let sized = ConstellationSizer::new(&self.physics).size(params, launch.price_per_kg, &mut diagnostics)?;
        let orbit_cost = compute_orbital_cost(&sized.satellite, &sized.design, launch.price_per_kg, &self.config.finance)?;

        let previous_fleet = previous
            .map(|state| state.fleet)
            .unwrap_or_else(|| OrbitalFleetState::empty(year.saturating_sub(1)));
        let previous_share = previous.map(|state| state.desired_orbital_share).unwrap_or(0.0);
        let fleet = step_fleet(
            &previous_fleet,
            year,
            &sized.design,
            previous_share,
            params.target_compute_gw,
            &self.config.fleet,
        );

        // Prices
        let ground_gpu_hour = self.pricing.gpu_hour_price(
            year,
            ground_cost.effective_total,
            penalties.scarcity_multiplier,
            GROUND_AVAILABILITY,
            &mut diagnostics,
        )?;
        let orbit_gpu_hour = self.pricing.gpu_hour_price(
            year,
            orbit_cost.effective_total,
            1.0,
            ORBITAL_AVAILABILITY,
            &mut diagnostics,
        )?;

        self.validator.validate(
            &YearLedgers {
                year,
                ground: &ground_cost,
                orbit: &orbit_cost,
                satellite: &sized.satellite,
                launch: &launch,
                ground_gpu_hour: &ground_gpu_hour,
                orbit_gpu_hour: &orbit_gpu_hour,
            },
            penalties.scarcity_multiplier,
        )?;

        // Market
        let market = self.allocator.allocate(&MarketInputs {
            year,
            demand_gw: metrics.market_demand_gw,
            ground_capacity_gw: metrics.capacity_gw,
            ground_wait_years: metrics.wait_years,
            ground_backlog_gw: metrics.backlog_gw,
            orbital_capacity_gw: fleet.state.deployed_gw,
            ground_cost: ground_gpu_hour.total,
            orbital_cost: orbit_gpu_hour.total,
        })?;

        debug!(
            year,
            demand_gw = metrics.market_demand_gw,
            backlog_gw = metrics.backlog_gw,
            wait_years = metrics.wait_years,
            scarcity = penalties.scarcity_multiplier,
            ground_effective = ground_cost.effective_total,
            orbit_effective = orbit_cost.effective_total,
            launch_per_kg = launch.price_per_kg,
            fleet_gw = fleet.state.deployed_gw,
            orbital_share = market.orbital_share,
            "year stepped"
        );

        let cost_basis_price = ground_gpu_hour.base_hourly + ground_gpu_hour.spares + ground_gpu_hour.sla_buffer;
        let signals = MarketSignals {
            ground_price_index: if ground_cost.base_total > 0.0 {
                ground_cost.effective_total / ground_cost.base_total * penalties.scarcity_multiplier
            } else {
                1.0
            },
            ground_margin: if cost_basis_price > 0.0 {
                ground_gpu_hour.total / cost_basis_price - 1.0
            } else {
                self.config.mobilization.target_margin
            },
            orbital_served_gw: market.orbital_served_gw,
        };

        let launched_mass = fleet.launched_kg + background_launch_mass_kg(year);
        let launch_state = match previous {
            Some(state) => state.launch.advance(year, launch.price_per_kg, launched_mass),
            None => LaunchLearningState::initial(year, launch.price_per_kg).advance(year, launch.price_per_kg, launched_mass),
        };

        let mut breakdown = YearlyBreakdown {
            year,
            ground: GroundBreakdown {
                model: self.ground_supply.name(),
                metrics,
                penalties,
                buildout,
                cost: ground_cost,
                tokens: self.pricing.token_prices(ground_gpu_hour.total),
                gpu_hour: ground_gpu_hour,
                wait_discontinuity,
            },
            orbit: OrbitBreakdown {
                launch,
                launch_clamped,
                tokens: self.pricing.token_prices(orbit_gpu_hour.total),
                gpu_hour: orbit_gpu_hour,
                satellite: sized.satellite,
                constellation: sized.design,
                cost: orbit_cost,
                fleet: fleet.state,
                launched_kg: fleet.launched_kg,
            },
            market,
            crossover: false,
            base_crossover: false,
            cost_accounting_valid: true,
            warnings: diagnostics.take_warnings(),
        };
        breakdown.crossover = orbit_cheaper(&breakdown, self.config.crossover_basis);
        breakdown.base_crossover = orbit_cheaper(&breakdown, CrossoverBasis::Base);

        let next = RunState {
            supply,
            snapshot,
            buildout,
            launch: launch_state,
            launch_reference_per_kg,
            fleet: fleet.state,
            signals,
            desired_orbital_share: market.desired_orbital_share,
        };
        Ok((breakdown, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::simulation_config::{GroundModelKind, StrictnessMode};

    #[test]
    fn test_default_run_covers_every_year() {
        let runner = TrajectoryRunner::new(SimulationConfig::default());
        let trajectory = runner.run_default(ScenarioToggles::default()).unwrap();
        assert_eq!(trajectory.years.len(), (END_YEAR - BASE_YEAR + 1) as usize);
        assert_eq!(trajectory.years[0].year, BASE_YEAR);
        assert!(trajectory.years.iter().all(|year| year.cost_accounting_valid));
    }

    #[test]
    fn test_crossover_flag_matches_finder() {
        let runner = TrajectoryRunner::new(SimulationConfig::default());
        let trajectory = runner.run_default(ScenarioToggles::default()).unwrap();
        let first_flagged = trajectory.years.iter().find(|year| year.crossover).map(|year| year.year);
        assert_eq!(first_flagged, trajectory.crossover_year);
    }

    #[test]
    fn test_non_consecutive_years_rejected() {
        let runner = TrajectoryRunner::new(SimulationConfig::default());
        let params = vec![YearParams::default_for_year(2025), YearParams::default_for_year(2027)];
        assert!(matches!(runner.run(&params), Err(SimulationError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_row_fails_the_run() {
        let runner = TrajectoryRunner::new(SimulationConfig::default());
        let mut params = default_trajectory(2025, 2030, ScenarioToggles::default());
        params[3].capacity_factor = 0.0;
        assert!(runner.run(&params).is_err());
    }

    #[test]
    fn test_wrights_law_launch_is_monotone() {
        let config = SimulationConfig {
            launch_model: LaunchModelKind::WrightsLaw,
            ..SimulationConfig::default()
        };
        let trajectory = TrajectoryRunner::new(config).run_default(ScenarioToggles::default()).unwrap();
        for pair in trajectory.years.windows(2) {
            assert!(pair[1].orbit.launch.price_per_kg <= pair[0].orbit.launch.price_per_kg);
        }
    }

    #[test]
    fn test_every_ground_model_runs() {
        for kind in [
            GroundModelKind::ClosedFormQueue,
            GroundModelKind::RegionalAggregate,
            GroundModelKind::RampingMobilization,
        ] {
            let config = SimulationConfig {
                ground_model: kind,
                strictness: StrictnessMode::Lenient,
                ..SimulationConfig::default()
            };
            let trajectory = TrajectoryRunner::new(config).run_default(ScenarioToggles::default()).unwrap();
            assert_eq!(trajectory.years.len(), 26);
        }
    }
}
