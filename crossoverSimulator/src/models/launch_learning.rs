//! Wright's-law launch learning and the threaded launch-cost state.
//!
//! The state replaces any year-keyed cache: each trajectory step reads the
//! previous `LaunchLearningState` and returns a new one.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::const_funcs::calc_growth_factor;
use crate::config::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchLearningState {
    pub year: u32,
    pub cumulative_mass_kg: f64,
    pub cost_per_kg: f64,
}

impl LaunchLearningState {
    pub fn initial(year: u32, cost_per_kg: f64) -> Self {
        Self {
            year,
            cumulative_mass_kg: INITIAL_CUMULATIVE_MASS_KG,
            cost_per_kg,
        }
    }

    /// Clamps a candidate price so it never exceeds the previous year's price.
    /// Returns the price to use and whether a clamp happened.
    pub fn enforce_monotone(&self, candidate_per_kg: f64) -> (f64, bool) {
        if candidate_per_kg > self.cost_per_kg {
            debug!(
                year = self.year + 1,
                candidate = candidate_per_kg,
                previous = self.cost_per_kg,
                "launch cost clamped to previous year"
            );
            (self.cost_per_kg, true)
        } else {
            (candidate_per_kg, false)
        }
    }

    /// State after `year`, with this year's launched mass added.
    pub fn advance(&self, year: u32, cost_per_kg: f64, launched_kg: f64) -> Self {
        Self {
            year,
            cumulative_mass_kg: self.cumulative_mass_kg + launched_kg.max(0.0),
            cost_per_kg: cost_per_kg.min(self.cost_per_kg),
        }
    }
}

/// Non-compute launch demand that still rides down the learning curve.
pub fn background_launch_mass_kg(year: u32) -> f64 {
    BACKGROUND_LAUNCH_MASS_KG_2025 * calc_growth_factor(BACKGROUND_LAUNCH_GROWTH, year)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchLearningModel {
    pub learning_rate: f64,
    pub reference_mass_kg: f64,
    pub floor_per_kg: f64,
}

impl Default for LaunchLearningModel {
    fn default() -> Self {
        Self {
            learning_rate: WRIGHT_LEARNING_RATE,
            reference_mass_kg: INITIAL_CUMULATIVE_MASS_KG,
            floor_per_kg: LAUNCH_COST_FLOOR_PER_KG,
        }
    }
}

impl LaunchLearningModel {
    /// Wright exponent b such that doubling cumulative mass multiplies cost by (1 - rate).
    pub fn exponent(&self) -> f64 {
        -(1.0 - self.learning_rate).log2()
    }

    pub fn cost_per_kg(&self, initial_cost_per_kg: f64, cumulative_mass_kg: f64) -> f64 {
        let doublings_ratio = (cumulative_mass_kg / self.reference_mass_kg).max(1.0);
        (initial_cost_per_kg * doublings_ratio.powf(-self.exponent())).max(self.floor_per_kg)
    }
}
