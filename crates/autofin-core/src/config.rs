//! Engine configuration.
//!
//! Every tunable constant of the simulator, the resale estimator and the
//! eligibility filter lives here as plain data. A config is built once,
//! validated, and passed by reference into each computation; nothing in the
//! engine reads global state. All sections carry serde defaults so a partial
//! YAML/JSON document only overrides the keys it names.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::AutoFinError;
use crate::types::Rate;
use crate::AutoFinResult;

/// Top-level configuration for scoring and ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    pub depreciation: DepreciationSchedule,
    pub eligibility: EligibilityConfig,
}

impl EngineConfig {
    /// Reject configurations that would make the engine misbehave.
    pub fn validate(&self) -> AutoFinResult<()> {
        self.simulation.validate()?;
        self.depreciation.validate()
    }
}

/// Monte Carlo cash-flow simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Trials per simulation when the caller does not ask for a count.
    pub runs: u32,
    /// Lower bound applied to any requested trial count.
    pub min_runs: u32,
    /// Horizon never shorter than this many months (before the trailing buffer).
    pub min_horizon_months: u32,
    /// Months simulated past the longest of term / exit / minimum horizon.
    pub trailing_months: u32,
    /// Longest horizon a single simulation may cover.
    pub max_horizon_months: u32,
    pub income_volatility_floor: f64,
    /// Income volatility = max(floor, (1 - stability) * scale).
    pub income_volatility_scale: f64,
    pub expense_volatility_base: f64,
    /// Expense volatility = base + (1 - stability) * scale.
    pub expense_volatility_scale: f64,
    /// Relative standard deviation of an unexpected-expense shock.
    pub shock_std: f64,
    /// Shock size floor as a share of total flat fees.
    pub shock_fee_share: f64,
    /// Shock size floor as a share of the monthly payment.
    pub shock_payment_share: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            runs: 250,
            min_runs: 25,
            min_horizon_months: 84,
            trailing_months: 12,
            max_horizon_months: 1200,
            income_volatility_floor: 0.015,
            income_volatility_scale: 0.3,
            expense_volatility_base: 0.06,
            expense_volatility_scale: 0.05,
            shock_std: 0.35,
            shock_fee_share: 0.25,
            shock_payment_share: 0.5,
        }
    }
}

impl SimulationConfig {
    /// Trial count actually used for a request.
    pub fn effective_runs(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.runs).max(self.min_runs)
    }

    fn validate(&self) -> AutoFinResult<()> {
        if self.min_runs == 0 {
            return Err(config_error("simulation.min_runs", "must be at least 1"));
        }
        if self.max_horizon_months < self.min_horizon_months + self.trailing_months {
            return Err(config_error(
                "simulation.max_horizon_months",
                "must cover the minimum horizon plus trailing months",
            ));
        }
        if self.income_volatility_floor <= 0.0 || !self.income_volatility_floor.is_finite() {
            return Err(config_error(
                "simulation.income_volatility_floor",
                "must be a positive finite number",
            ));
        }
        if self.expense_volatility_base <= 0.0 || !self.expense_volatility_base.is_finite() {
            return Err(config_error(
                "simulation.expense_volatility_base",
                "must be a positive finite number",
            ));
        }
        if self.shock_std <= 0.0 || !self.shock_std.is_finite() {
            return Err(config_error(
                "simulation.shock_std",
                "must be a positive finite number",
            ));
        }
        Ok(())
    }
}

/// One fixed-length depreciation tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationTier {
    pub months: u32,
    pub annual_rate: Rate,
}

/// Vehicle depreciation curve used by the resale estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DepreciationSchedule {
    /// Sequential tiers applied from month zero.
    pub tiers: Vec<DepreciationTier>,
    /// Annual rate once all tiers are exhausted.
    pub tail_annual_rate: Rate,
    /// Annual mileage included in the base curve.
    pub mileage_baseline: Decimal,
    /// Excess miles per penalty step.
    pub mileage_step: Decimal,
    /// Value lost per full step of excess mileage.
    pub penalty_per_step: Rate,
    /// Resale never drops below this share of the original price.
    pub floor_fraction: Rate,
}

impl Default for DepreciationSchedule {
    fn default() -> Self {
        Self {
            tiers: vec![
                DepreciationTier {
                    months: 12,
                    annual_rate: dec!(0.12),
                },
                DepreciationTier {
                    months: 12,
                    annual_rate: dec!(0.08),
                },
                DepreciationTier {
                    months: 12,
                    annual_rate: dec!(0.07),
                },
            ],
            tail_annual_rate: dec!(0.05),
            mileage_baseline: dec!(12000),
            mileage_step: dec!(5000),
            penalty_per_step: dec!(0.01),
            floor_fraction: dec!(0.2),
        }
    }
}

impl DepreciationSchedule {
    fn validate(&self) -> AutoFinResult<()> {
        let valid_rate = |r: Rate| r >= Decimal::ZERO && r < dec!(12);
        if self.tiers.iter().any(|t| !valid_rate(t.annual_rate)) {
            return Err(config_error(
                "depreciation.tiers",
                "annual rates must lie in [0, 12)",
            ));
        }
        if !valid_rate(self.tail_annual_rate) {
            return Err(config_error(
                "depreciation.tail_annual_rate",
                "must lie in [0, 12)",
            ));
        }
        if self.mileage_step <= Decimal::ZERO {
            return Err(config_error("depreciation.mileage_step", "must be positive"));
        }
        if self.floor_fraction < Decimal::ZERO || self.floor_fraction > Decimal::ONE {
            return Err(config_error(
                "depreciation.floor_fraction",
                "must lie in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Eligibility filter switches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EligibilityConfig {
    /// Assign an income-derived credit band to borrowers that declare none.
    pub infer_missing_credit_band: bool,
}

fn config_error(field: &str, reason: &str) -> AutoFinError {
    AutoFinError::InvalidConfig {
        field: field.into(),
        reason: reason.into(),
    }
}
