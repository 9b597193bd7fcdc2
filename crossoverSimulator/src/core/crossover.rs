use serde::Serialize;

use crate::analysis::metrics::YearlyBreakdown;
use crate::config::simulation_config::CrossoverBasis;

/// First year in which orbit is cheaper than ground on `basis`.
pub fn find_crossover(years: &[YearlyBreakdown], basis: CrossoverBasis) -> Option<u32> {
    years
        .iter()
        .find(|year| orbit_cheaper(year, basis))
        .map(|year| year.year)
}

pub fn orbit_cheaper(year: &YearlyBreakdown, basis: CrossoverBasis) -> bool {
    let ground = match basis {
        CrossoverBasis::Effective => year.ground.cost.effective_total,
        CrossoverBasis::Base => year.ground.cost.base_total,
    };
    year.orbit.cost.effective_total < ground
}

/// Crossover under every lens the reports show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrossoverSummary {
    pub effective: Option<u32>,
    pub base: Option<u32>,
    pub gpu_hour: Option<u32>,
}

impl CrossoverSummary {
    pub fn from_years(years: &[YearlyBreakdown]) -> Self {
        Self {
            effective: find_crossover(years, CrossoverBasis::Effective),
            base: find_crossover(years, CrossoverBasis::Base),
            gpu_hour: years
                .iter()
                .find(|year| year.orbit_cheaper_per_gpu_hour())
                .map(|year| year.year),
        }
    }
}
