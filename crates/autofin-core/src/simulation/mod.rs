//! Seeded Monte Carlo cash-flow simulation.

pub mod cash_flow;
pub mod seed;

pub use cash_flow::{simulate_cash_flow, SimulationResult};
pub use seed::simulation_seed;
