// Module declarations for the crossover simulator

// Configuration and per-year inputs
pub mod config {
    pub mod constants;
    pub mod const_funcs;
    pub mod simulation_config;
    pub mod year_params;
}

// Year stepping, validation and the uncertainty driver
pub mod core {
    pub mod errors;
    pub mod validation;
    pub mod ground_metrics;
    pub mod accounting;
    pub mod market_share;
    pub mod crossover;
    pub mod trajectory;
    pub mod iteration;
    pub mod monte_carlo;
}

// Cost and supply models
pub mod models {
    pub mod launch_cost;
    pub mod launch_learning;
    pub mod orbital;
    pub mod constellation;
    pub mod fleet;
    pub mod ground_supply;
    pub mod ground_penalties;
    pub mod ground_cost;
    pub mod pricing;
}

// Analysis and reporting
pub mod analysis {
    pub mod metrics;
    pub mod sensitivity;
    pub mod scenarios;
    pub mod providers;
    pub mod final_output;
    pub mod reporting;
}

// Utility functions
pub mod utils {
    pub mod logging;
    pub mod csv_export;
}

// CLI interface
pub mod cli {
    pub mod cli;
}

// Re-export commonly used items
pub use crate::config::simulation_config::SimulationConfig;
pub use crate::core::errors::{SimResult, SimulationError};
pub use crate::core::trajectory::{Trajectory, TrajectoryRunner};
