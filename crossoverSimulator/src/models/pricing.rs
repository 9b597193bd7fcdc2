//! $/PFLOP-year to market prices: $/GPU-hour and $/1k tokens.

use std::fmt;

use serde::Serialize;

use crate::config::constants::*;
use crate::config::simulation_config::PricingConfig;
use crate::core::errors::{SimResult, SimulationError};
use crate::core::validation::Diagnostics;
use crate::utils::logging::{start_timing, OperationCategory};

/// Itemized GPU-hour price. `clamp_adjustment` absorbs any band clamp so the
/// components always sum to `total`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpuHourPrice {
    pub base_hourly: f64,
    pub spares: f64,
    pub sla_buffer: f64,
    pub scarcity_premium: f64,
    pub margin: f64,
    pub clamp_adjustment: f64,
    pub raw_total: f64,
    pub total: f64,
}

impl GpuHourPrice {
    pub fn components(&self) -> [(&'static str, f64); 6] {
        [
            ("base_hourly", self.base_hourly),
            ("spares", self.spares),
            ("sla_buffer", self.sla_buffer),
            ("scarcity_premium", self.scarcity_premium),
            ("margin", self.margin),
            ("clamp_adjustment", self.clamp_adjustment),
        ]
    }

    pub fn was_clamped(&self) -> bool {
        self.clamp_adjustment != 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReferenceModel {
    Llama8B,
    Llama70B,
    Llama405B,
}

impl ReferenceModel {
    pub const ALL: [ReferenceModel; 3] = [ReferenceModel::Llama8B, ReferenceModel::Llama70B, ReferenceModel::Llama405B];

    pub fn parameters(&self) -> f64 {
        match self {
            ReferenceModel::Llama8B => 8e9,
            ReferenceModel::Llama70B => 70e9,
            ReferenceModel::Llama405B => 405e9,
        }
    }
}

impl fmt::Display for ReferenceModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReferenceModel::Llama8B => write!(f, "8B"),
            ReferenceModel::Llama70B => write!(f, "70B"),
            ReferenceModel::Llama405B => write!(f, "405B"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TokenPrice {
    pub model: ReferenceModel,
    pub tokens_per_gpu_hour: f64,
    pub usd_per_1k_tokens: f64,
}

/// Chance of breaching the availability target, from how far the expected
/// unavailability sits above the target unavailability.
pub fn sla_violation_probability(expected_availability: f64, target_nines: f64) -> f64 {
    let target_unavailability = 10f64.powf(-target_nines);
    let expected_unavailability = (1.0 - expected_availability).max(0.0);
    (expected_unavailability / target_unavailability / 2.0).clamp(0.0, 1.0)
}

pub struct PricingConverter {
    config: PricingConfig,
}

impl PricingConverter {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn gpu_hours_per_pflop_year(&self) -> f64 {
        HOURS_PER_YEAR * self.config.target_utilization / self.config.pflops_per_gpu
    }

    /// The scarcity premium is a fixed-dollar adder off a reference price, so
    /// falling hardware cost cannot shrink it.
    pub fn gpu_hour_price(
        &self,
        year: u32,
        cost_per_pflop_year: f64,
        scarcity_multiplier: f64,
        expected_availability: f64,
        diagnostics: &mut Diagnostics,
    ) -> SimResult<GpuHourPrice> {
        let _timing = start_timing("gpu_hour_price", OperationCategory::Pricing);
        let base_hourly = cost_per_pflop_year / self.gpu_hours_per_pflop_year();
        let extra_nines = (self.config.target_nines - 2.0).max(0.0);
        let spares = base_hourly * SPARES_PER_NINE * extra_nines;
        let sla_buffer = (base_hourly + spares)
            * self.config.sla_credit_fraction
            * sla_violation_probability(expected_availability, self.config.target_nines);
        let scarcity_premium = (scarcity_multiplier - 1.0).max(0.0) * self.config.reference_gpu_hour_price;
        let subtotal = base_hourly + spares + sla_buffer + scarcity_premium;
        let margin = subtotal * self.config.operator_margin;
        let raw_total = subtotal + margin;

        if !raw_total.is_finite() {
            return Err(SimulationError::PhysicalInfeasibility {
                year,
                path: "pricing.gpu_hour",
                description: format!("GPU-hour price is {}", raw_total),
            });
        }

        let total = raw_total.clamp(MIN_GPU_HOUR_PRICE, MAX_GPU_HOUR_PRICE);
        if total != raw_total {
            let absurd = raw_total > MAX_GPU_HOUR_PRICE * GPU_HOUR_CORRUPTION_FACTOR
                || raw_total < MIN_GPU_HOUR_PRICE / GPU_HOUR_CORRUPTION_FACTOR;
            if absurd {
                diagnostics.report(SimulationError::UnitRange {
                    year,
                    path: "pricing.gpu_hour",
                    quantity: "usd_per_gpu_hour",
                    value: raw_total,
                    min: MIN_GPU_HOUR_PRICE,
                    max: MAX_GPU_HOUR_PRICE,
                })?;
            } else {
                diagnostics.note(format!(
                    "[{}] GPU-hour price {:.4} clamped to {:.4}",
                    year, raw_total, total
                ));
            }
        }

        Ok(GpuHourPrice {
            base_hourly,
            spares,
            sla_buffer,
            scarcity_premium,
            margin,
            clamp_adjustment: total - raw_total,
            raw_total,
            total,
        })
    }

    /// Decode cost at the reference model-FLOPs utilization (2 FLOPs per parameter per token).
    pub fn token_prices(&self, gpu_hour_price: f64) -> Vec<TokenPrice> {
        let flops_per_gpu = self.config.pflops_per_gpu * 1e15 * MODEL_FLOPS_UTILIZATION;
        ReferenceModel::ALL
            .iter()
            .map(|model| {
                let tokens_per_gpu_hour = flops_per_gpu / (2.0 * model.parameters()) * 3_600.0;
                TokenPrice {
                    model: *model,
                    tokens_per_gpu_hour,
                    usd_per_1k_tokens: gpu_hour_price / tokens_per_gpu_hour * 1_000.0,
                }
            })
            .collect()
    }
}
