use std::fmt;

use serde::Serialize;

use crate::config::const_funcs::calc_learning_factor;
use crate::core::trajectory::Trajectory;

/// Public price tiers for a reference accelerator-hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProviderTier {
    HyperscalerOnDemand,
    HyperscalerReserved,
    Neocloud,
    Spot,
}

impl ProviderTier {
    pub const ALL: [ProviderTier; 4] = [
        ProviderTier::HyperscalerOnDemand,
        ProviderTier::HyperscalerReserved,
        ProviderTier::Neocloud,
        ProviderTier::Spot,
    ];

    /// $/GPU-hour in 2025.
    pub fn base_price(&self) -> f64 {
        match self {
            ProviderTier::HyperscalerOnDemand => 6.50,
            ProviderTier::HyperscalerReserved => 4.00,
            ProviderTier::Neocloud => 2.40,
            ProviderTier::Spot => 1.60,
        }
    }

    /// Annual price decline as newer accelerators enter the tier.
    pub fn annual_decline(&self) -> f64 {
        match self {
            ProviderTier::HyperscalerOnDemand => 0.10,
            ProviderTier::HyperscalerReserved => 0.11,
            ProviderTier::Neocloud => 0.12,
            ProviderTier::Spot => 0.13,
        }
    }

    pub fn price(&self, year: u32) -> f64 {
        self.base_price() * calc_learning_factor(self.annual_decline(), year)
    }
}

impl fmt::Display for ProviderTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProviderTier::HyperscalerOnDemand => write!(f, "Hyperscaler on-demand"),
            ProviderTier::HyperscalerReserved => write!(f, "Hyperscaler reserved"),
            ProviderTier::Neocloud => write!(f, "Neocloud"),
            ProviderTier::Spot => write!(f, "Spot"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierComparison {
    pub tier: ProviderTier,
    pub tier_price: f64,
    /// Simulated price relative to the tier; below 1.0 undercuts it.
    pub ground_vs_tier: f64,
    pub orbit_vs_tier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderComparison {
    pub year: u32,
    pub ground_gpu_hour: f64,
    pub orbit_gpu_hour: f64,
    pub tiers: Vec<TierComparison>,
}

impl ProviderComparison {
    /// Cheapest tier the orbital price undercuts, if any.
    pub fn orbit_undercuts(&self) -> Option<ProviderTier> {
        self.tiers
            .iter()
            .filter(|tier| tier.orbit_vs_tier < 1.0)
            .min_by(|a, b| a.tier_price.total_cmp(&b.tier_price))
            .map(|tier| tier.tier)
    }
}

/// Compares simulated GPU-hour prices with the public tiers in the given years.
/// Years outside the trajectory are skipped.
pub fn compare_providers(trajectory: &Trajectory, years: &[u32]) -> Vec<ProviderComparison> {
    years
        .iter()
        .filter_map(|&year| trajectory.year(year))
        .map(|breakdown| {
            let ground = breakdown.ground.gpu_hour.total;
            let orbit = breakdown.orbit.gpu_hour.total;
            let tiers = ProviderTier::ALL
                .iter()
                .map(|tier| {
                    let tier_price = tier.price(breakdown.year);
                    TierComparison {
                        tier: *tier,
                        tier_price,
                        ground_vs_tier: ground / tier_price,
                        orbit_vs_tier: orbit / tier_price,
                    }
                })
                .collect();
            ProviderComparison {
                year: breakdown.year,
                ground_gpu_hour: ground,
                orbit_gpu_hour: orbit,
                tiers,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::simulation_config::SimulationConfig;
    use crate::config::year_params::ScenarioToggles;
    use crate::core::trajectory::TrajectoryRunner;

    #[test]
    fn test_tiers_are_ordered_and_decline() {
        assert!(ProviderTier::HyperscalerOnDemand.price(2025) > ProviderTier::Spot.price(2025));
        for tier in ProviderTier::ALL {
            assert!(tier.price(2035) < tier.price(2025));
        }
    }

    #[test]
    fn test_comparison_skips_missing_years() {
        let trajectory = TrajectoryRunner::new(SimulationConfig::default())
            .run_default(ScenarioToggles::default())
            .unwrap();
        let comparisons = compare_providers(&trajectory, &[2030, 2040, 2099]);
        assert_eq!(comparisons.len(), 2);
        assert_eq!(comparisons[0].tiers.len(), ProviderTier::ALL.len());
        let on_demand = &comparisons[0].tiers[0];
        assert!((on_demand.ground_vs_tier * on_demand.tier_price - comparisons[0].ground_gpu_hour).abs() < 1e-9);
    }
}
