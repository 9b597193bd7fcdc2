use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::const_funcs::{calc_learning_factor, interpolate_by_year};
use crate::config::constants::*;
use crate::config::year_params::YearParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerSource {
    Solar,
    Fusion,
}

impl FromStr for PowerSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Solar" => Ok(PowerSource::Solar),
            "Fusion" => Ok(PowerSource::Fusion),
            _ => Err(format!("Unknown power source: {}", s)),
        }
    }
}

impl fmt::Display for PowerSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PowerSource::Solar => write!(f, "Solar"),
            PowerSource::Fusion => write!(f, "Fusion"),
        }
    }
}

// (year, specific power W/kg, capex $/W); nothing before the first milestone.
const FUSION_MILESTONES: [(u32, f64, f64); 4] = [
    (2035, 20.0, 40.0),
    (2040, 60.0, 15.0),
    (2045, 110.0, 8.0),
    (2050, 160.0, 5.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerSystem {
    pub source: PowerSource,
    pub power_kw: f64,
    pub specific_power_w_per_kg: f64,
    pub array_mass_kg: f64,
    pub storage_mass_kg: f64,
    pub mass_kg: f64,
    pub cost_per_w: f64,
    pub cost_usd: f64,
}

impl PowerSystem {
    /// Hardware plus launch, spread over the power system's life, per watt-year.
    pub fn levelized_cost_per_w_year(&self, launch_cost_per_kg: f64) -> f64 {
        let watts = self.power_kw * 1_000.0;
        if watts <= 0.0 {
            return 0.0;
        }
        (self.cost_usd + self.mass_kg * launch_cost_per_kg) / POWER_SYSTEM_LIFETIME_YEARS / watts
    }
}

pub fn solar_cost_per_w(year: u32, learning_multiplier: f64) -> f64 {
    let learning = (SOLAR_COST_LEARNING * learning_multiplier).clamp(0.0, 0.95);
    (SOLAR_COST_PER_W_2025 * calc_learning_factor(learning, year)).max(SOLAR_COST_FLOOR_PER_W)
}

pub fn size_solar(params: &YearParams, learning_multiplier: f64) -> PowerSystem {
    let watts = params.satellite_power_kw * 1_000.0;
    let array_mass_kg = watts / params.specific_power_w_per_kg;
    let storage_mass_kg = array_mass_kg * BATTERY_MASS_FRACTION;
    let cost_per_w = solar_cost_per_w(params.year, learning_multiplier);
    PowerSystem {
        source: PowerSource::Solar,
        power_kw: params.satellite_power_kw,
        specific_power_w_per_kg: params.specific_power_w_per_kg,
        array_mass_kg,
        storage_mass_kg,
        mass_kg: array_mass_kg + storage_mass_kg,
        cost_per_w,
        cost_usd: cost_per_w * watts,
    }
}

pub fn fusion_available(year: u32) -> bool {
    year >= FUSION_MILESTONES[0].0
}

/// Compact fusion sized from the milestone table, or `None` before the first milestone.
pub fn size_fusion(params: &YearParams) -> Option<PowerSystem> {
    if !fusion_available(params.year) {
        return None;
    }
    let specific: Vec<(u32, f64)> = FUSION_MILESTONES.iter().map(|m| (m.0, m.1)).collect();
    let capex: Vec<(u32, f64)> = FUSION_MILESTONES.iter().map(|m| (m.0, m.2)).collect();
    let specific_power = interpolate_by_year(&specific, params.year);
    let cost_per_w = interpolate_by_year(&capex, params.year);
    let watts = params.satellite_power_kw * 1_000.0;
    let mass_kg = watts / specific_power;
    Some(PowerSystem {
        source: PowerSource::Fusion,
        power_kw: params.satellite_power_kw,
        specific_power_w_per_kg: specific_power,
        array_mass_kg: mass_kg,
        storage_mass_kg: 0.0,
        mass_kg,
        cost_per_w,
        cost_usd: cost_per_w * watts,
    })
}

/// Solar unless the fusion toggle is on, fusion is available, and it levelizes cheaper.
pub fn select_power_system(params: &YearParams, launch_cost_per_kg: f64, learning_multiplier: f64) -> PowerSystem {
    let solar = size_solar(params, learning_multiplier);
    if !params.toggles.fusion_power {
        return solar;
    }
    match size_fusion(params) {
        Some(fusion)
            if fusion.levelized_cost_per_w_year(launch_cost_per_kg)
                < solar.levelized_cost_per_w_year(launch_cost_per_kg) =>
        {
            fusion
        }
        _ => solar,
    }
}
