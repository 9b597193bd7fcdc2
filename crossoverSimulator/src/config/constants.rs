// Time Constants
pub const BASE_YEAR: u32 = 2025;
pub const END_YEAR: u32 = 2050;
pub const HOURS_PER_YEAR: f64 = 8760.0;

// Demand Anchor Curve (GW of datacenter load)
pub const DEMAND_ANCHOR_2025_GW: f64 = 120.0;
pub const DEMAND_ANCHOR_2040_GW: f64 = 450.0;
pub const DEMAND_ANCHOR_2060_GW: f64 = 3000.0;
pub const DEMAND_ANCHOR_MID_YEAR: u32 = 2040;
pub const DEMAND_ANCHOR_END_YEAR: u32 = 2060;
pub const AI_WINTER_START_YEAR: u32 = 2027;
pub const AI_WINTER_GROWTH_FACTOR: f64 = 0.5;      // Halves exponential growth after the winter starts

// Grid Buildout
pub const INITIAL_GRID_CAPACITY_GW: f64 = 100.0;
pub const INITIAL_BUILD_RATE_GW_YR: f64 = 12.0;
pub const QUEUE_BUILD_RATE_GROWTH: f64 = 0.08;     // Closed-form queue build rate growth per year
pub const WAIT_CAP_YEARS: f64 = 12.0;              // Saturating cap for smoothed wait time
pub const WAIT_DISCONTINUITY_YEARS: f64 = 4.0;     // Adjacent-year jump flagged as discontinuity
pub const MAX_BUILD_RAMP: f64 = 0.25;              // +/-25% change in build rate per year
pub const MIN_BUILD_RATE_GW_YR: f64 = 1.0;
pub const BACKLOG_FLOOR_UNSERVED_FRACTION: f64 = 0.5;
pub const PIPELINE_LEAD_TIME_YEARS: f64 = 2.0;
pub const DEMAND_ADJUSTMENT_RATE: f64 = 0.3;       // Yearly partial adjustment of demand to price and wait

// Bottleneck capacity curves (GW/yr deliverable in 2025, annual growth)
pub const TRANSFORMER_CAPACITY_GW_YR: (f64, f64) = (22.0, 0.10);
pub const SUBSTATION_CAPACITY_GW_YR: (f64, f64) = (25.0, 0.09);
pub const TRANSMISSION_CAPACITY_GW_YR: (f64, f64) = (18.0, 0.11);
pub const GENERATION_CAPACITY_GW_YR: (f64, f64) = (30.0, 0.08);
pub const SMR_BOTTLENECK_RELIEF: f64 = 1.35;       // Generation curve multiplier with SMR mitigation
pub const SMR_AVAILABLE_YEAR: u32 = 2032;

// Constraint Penalties
pub const BASE_WACC: f64 = 0.08;
pub const WACC_RATIONING_PREMIUM: f64 = 0.06;      // Extra WACC at critical backlog ratio
pub const CRITICAL_BACKLOG_RATIO: f64 = 0.5;
pub const DELAY_PENALTY_CAP_FRACTION: f64 = 0.75;  // Delay carry never exceeds 75% of capex
pub const SCARCITY_UTILIZATION_THRESHOLD: f64 = 0.85;
pub const SCARCITY_GATE_STEEPNESS: f64 = 40.0;
pub const SCARCITY_LOG_COEFFICIENT: f64 = 0.5;
pub const SCARCITY_MULTIPLIER_CAP: f64 = 4.0;
pub const GATE_SUPPRESSION_WAIT_YEARS: f64 = 2.0;
pub const GATE_SUPPRESSION_FLOOR: f64 = 0.05;
pub const VALUE_OF_TIME_PER_KW_YEAR: f64 = 450.0;  // Foregone margin per kW per year of delay

// Ground Cost
pub const GROUND_ENERGY_PRICE_PER_KWH: f64 = 0.075;
pub const GROUND_ENERGY_PRICE_DRIFT: f64 = 0.005;  // Real price drift per year
pub const GROUND_HARDWARE_COST_PER_PFLOP: f64 = 28_000.0;
pub const HARDWARE_COST_DECLINE: f64 = 0.12;       // Per year, per PFLOP
pub const HARDWARE_COST_FLOOR_PER_PFLOP: f64 = 1_500.0;
pub const HARDWARE_LIFETIME_YEARS: f64 = 5.0;
pub const SITE_CAPEX_PER_KW: f64 = 11_000.0;
pub const SITE_LIFETIME_YEARS: f64 = 15.0;
pub const GROUND_OM_FRACTION: f64 = 0.03;          // Annual O&M as share of capex
pub const SMR_ENERGY_DISCOUNT: f64 = 0.85;
pub const BUILDOUT_PREMIUM_PER_KW_PER_WAIT_YEAR: f64 = 600.0;

// Orbital Physics
pub const STEFAN_BOLTZMANN: f64 = 5.670_374_419e-8;
pub const RADIATOR_EMISSIVITY: f64 = 0.90;
pub const RADIATOR_TEMP_K: f64 = 330.0;
pub const SINK_TEMP_K: f64 = 250.0;
pub const RADIATOR_SIDES: f64 = 2.0;
pub const RADIATOR_VIEW_FACTOR: f64 = 0.90;
pub const RADIATOR_FOULING: f64 = 0.05;
pub const RADIATOR_MARGIN: f64 = 1.2;
pub const RADIATOR_AREAL_DENSITY_KG_M2: f64 = 4.0;
pub const RADIATOR_COST_PER_M2: f64 = 2_200.0;
pub const MAX_DEPLOYABLE_RADIATOR_M2: f64 = 2_500.0;
pub const RADIATOR_MASS_ALLOWANCE: f64 = 1.0;     // Radiator mass / (power + payload) mass ceiling
pub const RADIATOR_DENSITY_LEARNING: f64 = 0.02;
pub const RADIATOR_COST_LEARNING: f64 = 0.04;
pub const THERMAL_CAP_FLOOR: f64 = 0.2;
pub const SPACE_MANUFACTURING_MASS_FACTOR: f64 = 0.7;

pub const SOLAR_COST_PER_W_2025: f64 = 22.0;
pub const SOLAR_COST_LEARNING: f64 = 0.11;
pub const SOLAR_COST_FLOOR_PER_W: f64 = 2.0;
pub const BATTERY_MASS_FRACTION: f64 = 0.08;       // Eclipse storage relative to array mass
pub const POWER_SYSTEM_LIFETIME_YEARS: f64 = 6.0;

pub const CHIP_POWER_KW: f64 = 0.7;
pub const ESTIMATED_PAYLOAD_KG_PER_KW: f64 = 6.0;  // First-pass thermal estimate
pub const MISSION_LIFETIME_YEARS: f64 = 6.0;
pub const BUS_MASS_FRACTION: f64 = 0.15;
pub const BUS_COST_PER_KG: f64 = 2_500.0;
pub const BUS_COST_LEARNING: f64 = 0.05;
pub const RAD_HARD_COST_MULTIPLIER: f64 = 2.5;
pub const RAD_HARD_FAILURE_MULTIPLIER: f64 = 0.4;
pub const RAD_HARD_EFFICIENCY_MULTIPLIER: f64 = 0.65;
pub const SHIELDING_MASS_FRACTION: f64 = 0.15;
pub const RAD_HARD_SHIELDING_MASS_FRACTION: f64 = 0.05;
pub const SHIELDING_COST_PER_KG: f64 = 800.0;
pub const INTERCONNECT_COST_PER_CHIP: f64 = 1_200.0;
pub const INTERCONNECT_MASS_PER_CHIP_KG: f64 = 0.4;
pub const INTERCONNECT_LEARNING: f64 = 0.05;
pub const NETWORKING_BASE_COST: f64 = 180_000.0;   // Optical terminals + backhaul per satellite
pub const NETWORKING_MASS_KG: f64 = 60.0;
pub const NETWORKING_LEARNING: f64 = 0.08;
pub const GLOBAL_LATENCY_NETWORK_MULTIPLIER: f64 = 1.5;
pub const REGULATORY_COST_PER_SAT: f64 = 25_000.0;
pub const DEORBIT_RESERVE_FRACTION: f64 = 0.02;    // Deorbit/disposal reserve on hardware cost
pub const MIN_SYSTEM_GFLOPS_PER_W: f64 = 20.0;
pub const MAX_SYSTEM_GFLOPS_PER_W: f64 = 5_000.0;
pub const EFFICIENCY_CHECK_TOLERANCE: f64 = 0.05;
pub const ORBITAL_OPS_COST_PER_SAT_YEAR: f64 = 15_000.0;

// Constellation
pub const MAX_SATELLITE_MASS_KG: f64 = 20_000.0;
pub const LAUNCH_VEHICLE_PAYLOAD_KG: f64 = 100_000.0;
pub const CONSTELLATION_SPARES_OVERHEAD: f64 = 0.03;
pub const SCALING_EFFICIENCY_LOSS_PER_DECADE: f64 = 0.015;
pub const MIN_SCALING_EFFICIENCY: f64 = 0.85;
pub const RESPLIT_SAFETY_FACTOR: f64 = 0.9;

// Launch Cost
pub const LAUNCH_INSURANCE_FRACTION: f64 = 0.06;
pub const LAUNCH_INTEGRATION_PER_KG: f64 = 25.0;
pub const LAUNCH_MARKUP_2025: f64 = 1.2;
pub const LAUNCH_MARKUP_FLOOR: f64 = 0.25;
pub const LAUNCH_MARKUP_DECAY: f64 = 0.08;
pub const AGGRESSIVE_DISCOUNT_MARKUP_FACTOR: f64 = 0.5;
pub const LAUNCH_COST_FLOOR_PER_KG: f64 = 10.0;
pub const WRIGHT_LEARNING_RATE: f64 = 0.15;        // Cost drop per doubling of cumulative mass
pub const INITIAL_CUMULATIVE_MASS_KG: f64 = 5.0e6;
pub const BACKGROUND_LAUNCH_MASS_KG_2025: f64 = 2.0e6;
pub const BACKGROUND_LAUNCH_GROWTH: f64 = 0.15;

// Orbital Fleet
pub const ORBITAL_LAUNCH_MASS_KG_2025: f64 = 2.0e5; // Launch mass available to compute in 2025
pub const ORBITAL_LAUNCH_MASS_GROWTH: f64 = 0.45;
pub const PILOT_DEPLOYMENT_SHARE: f64 = 0.1;

// Pricing
pub const REFERENCE_PFLOPS_PER_GPU: f64 = 1.0;
pub const TARGET_UTILIZATION: f64 = 0.70;
pub const SPARES_PER_NINE: f64 = 0.03;
pub const SLA_CREDIT_FRACTION: f64 = 0.10;
pub const REFERENCE_GPU_HOUR_PRICE: f64 = 2.00;
pub const OPERATOR_MARGIN: f64 = 0.20;
pub const MIN_GPU_HOUR_PRICE: f64 = 0.01;
pub const MAX_GPU_HOUR_PRICE: f64 = 100.0;
pub const GPU_HOUR_CORRUPTION_FACTOR: f64 = 10.0;
pub const MODEL_FLOPS_UTILIZATION: f64 = 0.40;
pub const GROUND_AVAILABILITY: f64 = 0.999;
pub const ORBITAL_AVAILABILITY: f64 = 0.995;
pub const TARGET_AVAILABILITY_NINES: f64 = 3.0;

// Market Share
pub const LOGIT_STEEPNESS: f64 = 2.0;
pub const QUEUE_PRESSURE_WAIT_YEARS: f64 = 3.0;
pub const QUEUE_PRESSURE_BACKLOG_FRACTION: f64 = 0.25;
pub const QUEUE_PRESSURE_GROUND_CAP: f64 = 0.5;
pub const SHARE_SUM_TOLERANCE: f64 = 1e-6;

// Validation
pub const ACCOUNTING_TOLERANCE: f64 = 0.005;
pub const MIN_PLAUSIBLE_GFLOPS_PER_W: f64 = 1.0;
pub const MAX_PLAUSIBLE_GFLOPS_PER_W: f64 = 20_000.0;
