//! The single place where ground-side figures are resolved for a year.
//!
//! Priority, per field: the supply model's snapshot, then a value recomputed
//! from other snapshot fields, then the previous buildout state, then zero.
//! Every fallback past the first is logged as a plumbing diagnostic.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::const_funcs::smooth_wait_years;
use crate::config::constants::*;
use crate::models::ground_penalties::BuildoutState;
use crate::models::ground_supply::{utilization, SupplySnapshot};
use crate::core::validation::Diagnostics;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundMetrics {
    pub year: u32,
    /// Demand the grid must serve (after orbital substitution).
    pub demand_gw: f64,
    /// Total compute demand the market allocates.
    pub market_demand_gw: f64,
    pub capacity_gw: f64,
    pub backlog_gw: f64,
    pub build_rate_gw_yr: f64,
    pub wait_years: f64,
    pub utilization: f64,
    pub unserved_gw: f64,
    pub pipeline_gw: f64,
}

fn usable(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn healed(diagnostics: &mut Diagnostics, year: u32, field: &'static str, reported: f64, resolved: f64, source: &str) {
    warn!(
        target: "orbital_crossover::plumbing",
        year,
        field,
        reported,
        resolved,
        source,
        "ground metric self-healed"
    );
    diagnostics.note(format!(
        "[{}] {} read {} but resolved to {} from {}",
        year, field, reported, resolved, source
    ));
}

pub fn resolve_ground_metrics(
    snapshot: &SupplySnapshot,
    previous_buildout: Option<&BuildoutState>,
    diagnostics: &mut Diagnostics,
) -> GroundMetrics {
    let year = snapshot.year;

    let demand_gw = usable(snapshot.demand_gw).unwrap_or_else(|| {
        healed(diagnostics, year, "demand_gw", snapshot.demand_gw, 0.0, "default");
        0.0
    });
    let market_demand_gw = match usable(snapshot.organic_demand_gw) {
        Some(value) if value >= demand_gw => value,
        _ => {
            healed(diagnostics, year, "organic_demand_gw", snapshot.organic_demand_gw, demand_gw, "demand_gw");
            demand_gw
        }
    };
    let capacity_gw = usable(snapshot.capacity_gw).unwrap_or_else(|| {
        healed(diagnostics, year, "capacity_gw", snapshot.capacity_gw, 0.0, "default");
        0.0
    });
    let unserved_gw = (demand_gw - capacity_gw).max(0.0);

    let backlog_gw = match usable(snapshot.backlog_gw) {
        Some(value) => value,
        None => {
            let (value, source) = match previous_buildout {
                Some(buildout) => (buildout.backlog_gw, "previous buildout"),
                None => (unserved_gw, "unserved demand"),
            };
            healed(diagnostics, year, "backlog_gw", snapshot.backlog_gw, value, source);
            value
        }
    };

    let build_rate_gw_yr = match usable(snapshot.build_rate_gw_yr) {
        Some(value) if value > 0.0 => value,
        _ => {
            healed(diagnostics, year, "build_rate_gw_yr", snapshot.build_rate_gw_yr, MIN_BUILD_RATE_GW_YR, "minimum build rate");
            MIN_BUILD_RATE_GW_YR
        }
    };

    let wait_years = match usable(snapshot.avg_wait_years) {
        Some(value) if !(value == 0.0 && backlog_gw > 0.0) => value,
        _ => {
            let recomputed = smooth_wait_years(backlog_gw / build_rate_gw_yr, WAIT_CAP_YEARS);
            let (value, source) = if recomputed > 0.0 || backlog_gw == 0.0 {
                (recomputed, "backlog / build rate")
            } else {
                match previous_buildout {
                    Some(buildout) if buildout.time_to_power_years > 0.0 => {
                        (buildout.time_to_power_years, "previous buildout")
                    }
                    _ => (f64::MIN_POSITIVE, "positive floor"),
                }
            };
            healed(diagnostics, year, "avg_wait_years", snapshot.avg_wait_years, value, source);
            value
        }
    };

    let derived_utilization = utilization(demand_gw, capacity_gw);
    let utilization = match usable(snapshot.utilization) {
        Some(value) if value <= 1.0 && !(value == 0.0 && derived_utilization > 0.0) => value,
        _ => {
            healed(diagnostics, year, "utilization", snapshot.utilization, derived_utilization, "demand / capacity");
            derived_utilization
        }
    };

    let pipeline_gw = usable(snapshot.pipeline_gw)
        .unwrap_or_else(|| backlog_gw.min(build_rate_gw_yr * PIPELINE_LEAD_TIME_YEARS));

    GroundMetrics {
        year,
        demand_gw,
        market_demand_gw,
        capacity_gw,
        backlog_gw,
        build_rate_gw_yr,
        wait_years,
        utilization,
        unserved_gw,
        pipeline_gw,
    }
}
