use serde::{Deserialize, Serialize};

use crate::config::const_funcs::years_from_base;
use crate::config::constants::*;
use crate::config::year_params::{ParamMode, YearParams};

/// Internal marginal cost ($/kg) of a fully reusable heavy launcher, log-interpolated.
const MARGINAL_COST_TABLE: [(u32, f64); 6] = [
    (2025, 600.0),
    (2028, 250.0),
    (2032, 90.0),
    (2036, 40.0),
    (2040, 25.0),
    (2050, 12.0),
];

/// Commercial base price the marginal-cost table was calibrated against.
const REFERENCE_BASE_PER_KG: f64 = 1_500.0;

/// Itemized $/kg quote; `price_per_kg` is always the sum of the other four.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchQuote {
    pub year: u32,
    pub marginal_per_kg: f64,
    pub markup_per_kg: f64,
    pub insurance_per_kg: f64,
    pub integration_per_kg: f64,
    pub price_per_kg: f64,
}

impl LaunchQuote {
    pub fn components(&self) -> [(&'static str, f64); 4] {
        [
            ("marginal", self.marginal_per_kg),
            ("markup", self.markup_per_kg),
            ("insurance", self.insurance_per_kg),
            ("integration", self.integration_per_kg),
        ]
    }

    /// Same split, rescaled so the components sum to `price_per_kg`.
    pub fn scaled_to(&self, price_per_kg: f64) -> LaunchQuote {
        if self.price_per_kg <= 0.0 {
            return LaunchQuote {
                marginal_per_kg: price_per_kg,
                markup_per_kg: 0.0,
                insurance_per_kg: 0.0,
                integration_per_kg: 0.0,
                price_per_kg,
                ..*self
            };
        }
        let scale = price_per_kg / self.price_per_kg;
        LaunchQuote {
            year: self.year,
            marginal_per_kg: self.marginal_per_kg * scale,
            markup_per_kg: self.markup_per_kg * scale,
            insurance_per_kg: self.insurance_per_kg * scale,
            integration_per_kg: self.integration_per_kg * scale,
            price_per_kg,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchCostModel {
    pub markup_2025: f64,
    pub markup_floor: f64,
    pub markup_decay: f64,
    pub insurance_fraction: f64,
    pub integration_per_kg: f64,
}

impl Default for LaunchCostModel {
    fn default() -> Self {
        Self {
            markup_2025: LAUNCH_MARKUP_2025,
            markup_floor: LAUNCH_MARKUP_FLOOR,
            markup_decay: LAUNCH_MARKUP_DECAY,
            insurance_fraction: LAUNCH_INSURANCE_FRACTION,
            integration_per_kg: LAUNCH_INTEGRATION_PER_KG,
        }
    }
}

impl LaunchCostModel {
    pub fn marginal_cost_per_kg(&self, year: u32) -> f64 {
        let table = &MARGINAL_COST_TABLE;
        if year <= table[0].0 {
            return table[0].1;
        }
        for window in table.windows(2) {
            let (y0, c0) = window[0];
            let (y1, c1) = window[1];
            if year <= y1 {
                let t = (year - y0) as f64 / (y1 - y0) as f64;
                return (c0.ln() + (c1.ln() - c0.ln()) * t).exp();
            }
        }
        table[table.len() - 1].1
    }

    /// Markup over marginal cost. Competition erodes it toward the floor; the
    /// aggressive-discount scenario halves it.
    pub fn markup(&self, year: u32, aggressive_discount: bool) -> f64 {
        let decayed = self.markup_2025 * (-self.markup_decay * years_from_base(year)).exp();
        let markup = decayed.max(self.markup_floor);
        if aggressive_discount {
            markup * AGGRESSIVE_DISCOUNT_MARKUP_FACTOR
        } else {
            markup
        }
    }

    pub fn quote(&self, params: &YearParams) -> LaunchQuote {
        if params.mode == ParamMode::Static {
            return LaunchQuote {
                year: params.year,
                marginal_per_kg: params.launch_cost_base_per_kg,
                markup_per_kg: 0.0,
                insurance_per_kg: 0.0,
                integration_per_kg: 0.0,
                price_per_kg: params.launch_cost_base_per_kg,
            };
        }

        let scale = params.launch_cost_base_per_kg / REFERENCE_BASE_PER_KG;
        let marginal = self.marginal_cost_per_kg(params.year) * scale;
        let markup = marginal * self.markup(params.year, params.toggles.aggressive_discount);
        let integration = self.integration_per_kg * scale;
        let insurance = (marginal + markup + integration) * self.insurance_fraction;

        LaunchQuote {
            year: params.year,
            marginal_per_kg: marginal,
            markup_per_kg: markup,
            insurance_per_kg: insurance,
            integration_per_kg: integration,
            price_per_kg: marginal + markup + insurance + integration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::year_params::ScenarioToggles;

    #[test]
    fn test_quote_components_sum_to_price() {
        let model = LaunchCostModel::default();
        for year in 2025..=2050 {
            let quote = model.quote(&YearParams::default_for_year(year));
            let sum: f64 = quote.components().iter().map(|(_, v)| v).sum();
            assert!((sum - quote.price_per_kg).abs() < 1e-9);
        }
    }

    #[test]
    fn test_curve_declines() {
        let model = LaunchCostModel::default();
        let mut previous = f64::INFINITY;
        for year in 2025..=2050 {
            let price = model.quote(&YearParams::default_for_year(year)).price_per_kg;
            assert!(price <= previous, "price rose in {}", year);
            previous = price;
        }
    }

    #[test]
    fn test_aggressive_discount_lowers_price() {
        let model = LaunchCostModel::default();
        let params = YearParams::default_for_year(2030);
        let discounted = params.clone().with_toggles(ScenarioToggles {
            aggressive_discount: true,
            ..ScenarioToggles::default()
        });
        assert!(model.quote(&discounted).price_per_kg < model.quote(&params).price_per_kg);
    }

    #[test]
    fn test_static_mode_uses_base() {
        let model = LaunchCostModel::default();
        let mut params = YearParams::default_for_year(2040);
        params.mode = ParamMode::Static;
        params.launch_cost_base_per_kg = 200.0;
        assert_eq!(model.quote(&params).price_per_kg, 200.0);
    }

    #[test]
    fn test_scaled_quote_still_reconciles() {
        let quote = LaunchCostModel::default().quote(&YearParams::default_for_year(2030));
        let scaled = quote.scaled_to(quote.price_per_kg * 0.4);
        let sum: f64 = scaled.components().iter().map(|(_, v)| v).sum();
        assert!((sum - scaled.price_per_kg).abs() < 1e-9);
        assert!((scaled.markup_per_kg / scaled.marginal_per_kg - quote.markup_per_kg / quote.marginal_per_kg).abs() < 1e-12);
    }
}
