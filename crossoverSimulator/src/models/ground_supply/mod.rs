//! Grid supply strategies. Each produces demand, capacity, backlog, build rate
//! and wait time for a year from the previous year's state. The strategy is
//! chosen once per run through `GroundSupplyModel`.

pub mod mobilization;
pub mod queue;
pub mod regional;

use std::fmt;

use serde::Serialize;

use crate::config::const_funcs::{calc_ai_winter_demand_gw, calc_anchor_demand_gw};
use crate::config::simulation_config::{GroundModelKind, SimulationConfig};
use crate::config::year_params::YearParams;
use crate::core::errors::{SimResult, SimulationError};
use crate::utils::logging::{start_timing, OperationCategory};

pub use mobilization::{MobilizationState, RampingMobilization};
pub use queue::{ClosedFormQueue, GroundSupplyState};
pub use regional::{RegionalAggregate, RegionalState};

/// Backlog below this is treated as cleared so wait and backlog stay consistent.
pub(crate) const BACKLOG_EPSILON_GW: f64 = 1e-9;

/// Previous-year market feedback consumed by responsive supply models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketSignals {
    /// Ground price relative to its unconstrained level (1.0 = no scarcity).
    pub ground_price_index: f64,
    pub ground_margin: f64,
    pub orbital_served_gw: f64,
}

impl MarketSignals {
    pub fn neutral(target_margin: f64) -> Self {
        Self {
            ground_price_index: 1.0,
            ground_margin: target_margin,
            orbital_served_gw: 0.0,
        }
    }
}

/// Model-independent view of one year of grid supply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SupplySnapshot {
    pub year: u32,
    pub demand_gw: f64,
    pub organic_demand_gw: f64,
    pub capacity_gw: f64,
    pub backlog_gw: f64,
    pub build_rate_gw_yr: f64,
    pub avg_wait_years: f64,
    pub utilization: f64,
    pub unserved_gw: f64,
    pub pipeline_gw: f64,
}

pub trait SupplyModel {
    type State: Clone + fmt::Debug;

    fn name(&self) -> &'static str;
    fn initial_state(&self, params: &YearParams) -> SimResult<Self::State>;
    fn step(&self, previous: &Self::State, params: &YearParams, signals: &MarketSignals) -> SimResult<Self::State>;
    fn snapshot(&self, state: &Self::State) -> SupplySnapshot;
}

/// Anchor-curve demand, slowed when the AI-winter toggle is on.
pub fn baseline_demand_gw(params: &YearParams) -> f64 {
    if params.toggles.ai_winter {
        calc_ai_winter_demand_gw(params.year)
    } else {
        calc_anchor_demand_gw(params.year)
    }
}

pub fn utilization(demand_gw: f64, capacity_gw: f64) -> f64 {
    if capacity_gw > 0.0 {
        (demand_gw / capacity_gw).clamp(0.0, 1.0)
    } else if demand_gw > 0.0 {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum SupplyState {
    Queue(GroundSupplyState),
    Regional(RegionalState),
    Mobilization(MobilizationState),
}

impl SupplyState {
    fn kind(&self) -> &'static str {
        match self {
            SupplyState::Queue(_) => "queue",
            SupplyState::Regional(_) => "regional",
            SupplyState::Mobilization(_) => "mobilization",
        }
    }
}

#[derive(Debug, Clone)]
pub enum GroundSupplyModel {
    ClosedFormQueue(ClosedFormQueue),
    RegionalAggregate(RegionalAggregate),
    RampingMobilization(RampingMobilization),
}

impl GroundSupplyModel {
    pub fn from_config(config: &SimulationConfig) -> Self {
        match config.ground_model {
            GroundModelKind::ClosedFormQueue => GroundSupplyModel::ClosedFormQueue(ClosedFormQueue::default()),
            GroundModelKind::RegionalAggregate => GroundSupplyModel::RegionalAggregate(RegionalAggregate::default()),
            GroundModelKind::RampingMobilization => {
                GroundSupplyModel::RampingMobilization(RampingMobilization::new(config.mobilization.clone()))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GroundSupplyModel::ClosedFormQueue(model) => model.name(),
            GroundSupplyModel::RegionalAggregate(model) => model.name(),
            GroundSupplyModel::RampingMobilization(model) => model.name(),
        }
    }

    pub fn initial_state(&self, params: &YearParams) -> SimResult<SupplyState> {
        let _timing = start_timing("supply_initial_state", OperationCategory::GroundSupply);
        Ok(match self {
            GroundSupplyModel::ClosedFormQueue(model) => SupplyState::Queue(model.initial_state(params)?),
            GroundSupplyModel::RegionalAggregate(model) => SupplyState::Regional(model.initial_state(params)?),
            GroundSupplyModel::RampingMobilization(model) => SupplyState::Mobilization(model.initial_state(params)?),
        })
    }

    pub fn step(&self, previous: &SupplyState, params: &YearParams, signals: &MarketSignals) -> SimResult<SupplyState> {
        let _timing = start_timing("supply_step", OperationCategory::GroundSupply);
        match (self, previous) {
            (GroundSupplyModel::ClosedFormQueue(model), SupplyState::Queue(state)) => {
                Ok(SupplyState::Queue(model.step(state, params, signals)?))
            }
            (GroundSupplyModel::RegionalAggregate(model), SupplyState::Regional(state)) => {
                Ok(SupplyState::Regional(model.step(state, params, signals)?))
            }
            (GroundSupplyModel::RampingMobilization(model), SupplyState::Mobilization(state)) => {
                Ok(SupplyState::Mobilization(model.step(state, params, signals)?))
            }
            (model, state) => Err(SimulationError::StateMismatch {
                year: params.year,
                model: model.name(),
                state: state.kind(),
            }),
        }
    }

    pub fn snapshot(&self, state: &SupplyState) -> SupplySnapshot {
        match state {
            SupplyState::Queue(inner) => queue::snapshot_of(inner),
            SupplyState::Regional(inner) => queue::snapshot_of(&inner.aggregate),
            SupplyState::Mobilization(inner) => mobilization::snapshot_of(inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_selected_from_config() {
        let mut config = SimulationConfig::default();
        assert_eq!(GroundSupplyModel::from_config(&config).name(), "RampingMobilization");
        config.ground_model = GroundModelKind::ClosedFormQueue;
        assert_eq!(GroundSupplyModel::from_config(&config).name(), "ClosedFormQueue");
    }

    #[test]
    fn test_mismatched_state_is_rejected() {
        let config = SimulationConfig::default();
        let queue = GroundSupplyModel::ClosedFormQueue(ClosedFormQueue::default());
        let mobilization = GroundSupplyModel::from_config(&config);
        let params = YearParams::default_for_year(2025);
        let state = mobilization.initial_state(&params).unwrap();
        let next = YearParams::default_for_year(2026);
        let result = queue.step(&state, &next, &MarketSignals::neutral(0.2));
        assert!(matches!(result, Err(SimulationError::StateMismatch { .. })));
    }

    #[test]
    fn test_supply_steps_are_timed() {
        crate::utils::logging::enable_timing_for_tests();
        let model = GroundSupplyModel::from_config(&SimulationConfig::default());
        let state = model.initial_state(&YearParams::default_for_year(2025)).unwrap();
        model
            .step(&state, &YearParams::default_for_year(2026), &MarketSignals::neutral(0.2))
            .unwrap();
        let (_, steps) = crate::utils::logging::function_summary("supply_step").unwrap();
        let (_, starts) = crate::utils::logging::function_summary("supply_initial_state").unwrap();
        assert!(steps >= 1 && starts >= 1);
    }

    #[test]
    fn test_utilization_bounds() {
        assert_eq!(utilization(50.0, 100.0), 0.5);
        assert_eq!(utilization(150.0, 100.0), 1.0);
        assert_eq!(utilization(0.0, 0.0), 0.0);
    }
}
