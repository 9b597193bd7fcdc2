use crate::config::constants::*;

pub fn years_from_base(year: u32) -> f64 {
    year.saturating_sub(BASE_YEAR) as f64
}

/// Multiplier after `years_from_base(year)` years of a constant annual decline.
pub fn calc_learning_factor(annual_decline: f64, year: u32) -> f64 {
    (1.0 - annual_decline).powf(years_from_base(year))
}

pub fn calc_growth_factor(annual_growth: f64, year: u32) -> f64 {
    (1.0 + annual_growth).powf(years_from_base(year))
}

/// Capital recovery factor: converts an upfront cost into an equal annual payment.
pub fn calc_capital_recovery_factor(rate: f64, lifetime_years: f64) -> f64 {
    if lifetime_years <= 0.0 {
        return 1.0;
    }
    if rate.abs() < 1e-9 {
        return 1.0 / lifetime_years;
    }
    let growth = (1.0 + rate).powf(lifetime_years);
    rate * growth / (growth - 1.0)
}

/// Ground-equivalent accelerator cost per PFLOPS of capacity.
pub fn calc_hardware_cost_per_pflop(year: u32) -> f64 {
    (GROUND_HARDWARE_COST_PER_PFLOP * calc_learning_factor(HARDWARE_COST_DECLINE, year))
        .max(HARDWARE_COST_FLOOR_PER_PFLOP)
}

/// Two-segment piecewise exponential anchored at 2025, 2040 and 2060.
/// Years after 2060 keep the second segment's growth rate.
pub fn calc_anchor_demand_gw(year: u32) -> f64 {
    if year <= BASE_YEAR {
        return DEMAND_ANCHOR_2025_GW;
    }
    if year <= DEMAND_ANCHOR_MID_YEAR {
        let span = (DEMAND_ANCHOR_MID_YEAR - BASE_YEAR) as f64;
        let t = (year - BASE_YEAR) as f64 / span;
        DEMAND_ANCHOR_2025_GW * (DEMAND_ANCHOR_2040_GW / DEMAND_ANCHOR_2025_GW).powf(t)
    } else {
        let span = (DEMAND_ANCHOR_END_YEAR - DEMAND_ANCHOR_MID_YEAR) as f64;
        let t = (year - DEMAND_ANCHOR_MID_YEAR) as f64 / span;
        DEMAND_ANCHOR_2040_GW * (DEMAND_ANCHOR_2060_GW / DEMAND_ANCHOR_2040_GW).powf(t)
    }
}

/// Anchor demand with the AI-winter slowdown applied: growth in log space is
/// scaled down from the winter's start year onwards.
pub fn calc_ai_winter_demand_gw(year: u32) -> f64 {
    if year <= AI_WINTER_START_YEAR {
        return calc_anchor_demand_gw(year);
    }
    let at_start = calc_anchor_demand_gw(AI_WINTER_START_YEAR);
    let log_growth = (calc_anchor_demand_gw(year) / at_start).ln();
    at_start * (log_growth * AI_WINTER_GROWTH_FACTOR).exp()
}

pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Saturating wait smoothing: `cap * (1 - e^(-raw / cap))`.
/// Monotone in `raw`, equal to zero only at zero and never above `cap`.
pub fn smooth_wait_years(raw_wait: f64, cap: f64) -> f64 {
    if raw_wait.is_infinite() && raw_wait > 0.0 {
        return cap;
    }
    if raw_wait <= 0.0 || raw_wait.is_nan() {
        return 0.0;
    }
    // exp_m1 keeps tiny waits strictly positive
    -cap * (-raw_wait / cap).exp_m1()
}

/// Linear interpolation on a sorted (year, value) table, clamped at both ends.
pub fn interpolate_by_year(table: &[(u32, f64)], year: u32) -> f64 {
    match table {
        [] => 0.0,
        [(_, only)] => *only,
        _ => {
            let (first_year, first_value) = table[0];
            if year <= first_year {
                return first_value;
            }
            for window in table.windows(2) {
                let (y0, v0) = window[0];
                let (y1, v1) = window[1];
                if year <= y1 {
                    let t = (year - y0) as f64 / (y1 - y0) as f64;
                    return v0 + (v1 - v0) * t;
                }
            }
            table[table.len() - 1].1
        }
    }
}

/// Deliverable GW/yr of one supply-chain bottleneck curve.
pub fn calc_bottleneck_curve(curve: (f64, f64), year: u32) -> f64 {
    let (base, growth) = curve;
    base * calc_growth_factor(growth, year)
}

/// Energy (kWh) consumed per PFLOP-year at a delivered efficiency and PUE.
pub fn calc_kwh_per_pflop_year(gflops_per_w: f64, pue: f64) -> f64 {
    calc_it_kw_per_pflop(gflops_per_w) * pue * HOURS_PER_YEAR
}

/// IT load (kW) needed to sustain one PFLOPS.
pub fn calc_it_kw_per_pflop(gflops_per_w: f64) -> f64 {
    // 1 PFLOPS = 1e6 GFLOPS, so W = 1e6 / (GFLOPS/W) and kW = 1e3 / (GFLOPS/W)
    1_000.0 / gflops_per_w
}

pub fn relative_difference(a: f64, b: f64) -> f64 {
    let scale = a.abs().max(b.abs());
    if scale == 0.0 {
        0.0
    } else {
        (a - b).abs() / scale
    }
}
