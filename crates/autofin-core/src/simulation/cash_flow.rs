use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use crate::borrower::BorrowerProfile;
use crate::config::SimulationConfig;
use crate::error::AutoFinError;
use crate::financing::{FinancingPlan, MarketContext};
use crate::simulation::seed::simulation_seed;
use crate::types::{round_to, Money};
use crate::AutoFinResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Aggregate statistics over all simulated cash-flow trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Share of trials in which the borrower ran out of cash.
    pub missed_payment_probability: f64,
    /// Mean ending balance (defaulted trials contribute their clamped balance).
    pub avg_final_reserve: f64,
    /// 5th percentile of ending balances.
    pub p5_final_reserve: f64,
    /// Lowest balance seen in any month of any trial.
    pub worst_case_reserve: f64,
    /// Mean share of months spent below the reserve buffer.
    pub buffer_violation_rate: f64,
    /// Mean month of first default; surviving trials count the full horizon.
    pub expected_months_to_default: f64,
    /// Months simulated per trial.
    pub analysis_months: u32,
    /// Trials actually run.
    pub trials: u32,
}

/// Outcome of a single trajectory.
#[derive(Debug, Clone, Copy)]
struct TrialOutcome {
    final_cash: f64,
    worst_cash: f64,
    months_below_buffer: u32,
    default_month: Option<u32>,
}

/// Resolved per-month inputs shared by every trial of one simulation.
struct CashFlowModel {
    base_income: f64,
    obligations: f64,
    starting_cash: f64,
    shock_rate: f64,
    shock_base: f64,
    buffer_threshold: f64,
    monthly_payment: f64,
    term: u32,
    horizon: u32,
    income_noise: Normal,
    expense_noise: Normal,
    shock_noise: Normal,
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

impl CashFlowModel {
    fn new(
        profile: &BorrowerProfile,
        plan: &FinancingPlan,
        monthly_payment: f64,
        context: &MarketContext,
        config: &SimulationConfig,
    ) -> AutoFinResult<Self> {
        let stability = profile.income_stability_index;
        let income_volatility = config
            .income_volatility_floor
            .max((1.0 - stability) * config.income_volatility_scale);
        let expense_volatility =
            config.expense_volatility_base + (1.0 - stability) * config.expense_volatility_scale;

        let fees_total = context.total_fees()?.to_f64().unwrap_or_default();
        let shock_base = profile
            .unexpected_expense_impact
            .max(fees_total * config.shock_fee_share)
            .max(monthly_payment * config.shock_payment_share);

        let term = plan.term_or_default().max(1);
        let exit_month = profile.exit_month_or(term);
        let longest = i64::from(term)
            .max(i64::from(exit_month))
            .max(i64::from(config.min_horizon_months));
        let mut horizon = longest + i64::from(config.trailing_months);
        if horizon > i64::from(config.max_horizon_months) {
            tracing::warn!(
                plan_id = %plan.plan_id,
                requested = horizon,
                limit = config.max_horizon_months,
                "simulation horizon truncated"
            );
            horizon = i64::from(config.max_horizon_months);
        }

        Ok(Self {
            base_income: profile.net_monthly_income,
            obligations: profile.monthly_obligations,
            starting_cash: profile.cash_reserves,
            shock_rate: profile.unexpected_expense_rate,
            shock_base,
            buffer_threshold: (profile.net_monthly_income * profile.income_shock_reserve_ratio)
                .max(0.0),
            monthly_payment,
            term: term as u32,
            horizon: horizon as u32,
            income_noise: noise("income_volatility", income_volatility)?,
            expense_noise: noise("expense_volatility", expense_volatility)?,
            shock_noise: noise("shock_std", config.shock_std)?,
        })
    }

    /// Walk one trajectory month by month until the horizon or first default.
    ///
    /// Draw order per month is fixed (income, expenses, shock test, shock
    /// size) so a given seed always replays the same trajectory.
    fn run_trial(&self, rng: &mut StdRng) -> TrialOutcome {
        let mut cash = self.starting_cash;
        let mut worst_cash = cash;
        let mut months_below_buffer = 0u32;

        for month in 0..self.horizon {
            let income = self.base_income * (1.0 + rng.sample(&self.income_noise)).max(0.0);
            let expenses = self.obligations * (1.0 + rng.sample(&self.expense_noise)).max(0.0);
            let shock = if rng.gen::<f64>() < self.shock_rate {
                (self.shock_base * (1.0 + rng.sample(&self.shock_noise))).max(0.0)
            } else {
                0.0
            };
            let payment_due = if month < self.term {
                self.monthly_payment
            } else {
                0.0
            };

            cash += income - expenses - shock - payment_due;
            worst_cash = worst_cash.min(cash);
            if cash < self.buffer_threshold {
                months_below_buffer += 1;
            }
            if cash < 0.0 {
                return TrialOutcome {
                    final_cash: cash.min(-payment_due),
                    worst_cash,
                    months_below_buffer,
                    default_month: Some(month + 1),
                };
            }
        }

        TrialOutcome {
            final_cash: cash,
            worst_cash,
            months_below_buffer,
            default_month: None,
        }
    }
}

fn noise(name: &str, std_dev: f64) -> AutoFinResult<Normal> {
    Normal::new(0.0, std_dev).map_err(|e| AutoFinError::InvalidInput {
        field: name.into(),
        reason: format!("Invalid Normal parameters (std_dev = {std_dev}): {e}"),
    })
}

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

/// Compute the percentile value from a **sorted** slice using linear interpolation.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        len => {
            let rank = p / 100.0 * (len - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            if lower == upper {
                sorted[lower]
            } else {
                let frac = rank - lower as f64;
                sorted[lower] * (1.0 - frac) + sorted[upper] * frac
            }
        }
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> Option<f64> {
    let n = values.len();
    (n > 0).then(|| values.sum::<f64>() / n as f64)
}

fn summarize(outcomes: &[TrialOutcome], horizon: u32) -> SimulationResult {
    let trials = outcomes.len();
    let missed = outcomes.iter().filter(|o| o.default_month.is_some()).count();

    let mut finals: Vec<f64> = outcomes.iter().map(|o| o.final_cash).collect();
    finals.sort_by(|a, b| a.total_cmp(b));

    let missed_probability = if trials == 0 {
        0.0
    } else {
        missed as f64 / trials as f64
    };
    let avg_final = mean(finals.iter().copied()).unwrap_or(0.0);
    let p5_final = percentile_sorted(&finals, 5.0);
    let worst_case = outcomes
        .iter()
        .map(|o| o.worst_cash)
        .reduce(f64::min)
        .unwrap_or(0.0);
    let buffer_rate = mean(
        outcomes
            .iter()
            .map(|o| f64::from(o.months_below_buffer) / f64::from(horizon)),
    )
    .unwrap_or(1.0);
    let expected_default_month = mean(
        outcomes
            .iter()
            .map(|o| f64::from(o.default_month.unwrap_or(horizon))),
    )
    .unwrap_or(f64::from(horizon));

    SimulationResult {
        missed_payment_probability: round_to(missed_probability, 4),
        avg_final_reserve: round_to(avg_final, 2),
        p5_final_reserve: round_to(p5_final, 2),
        worst_case_reserve: round_to(worst_case, 2),
        buffer_violation_rate: round_to(buffer_rate, 4),
        expected_months_to_default: round_to(expected_default_month, 1),
        analysis_months: horizon,
        trials: trials as u32,
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Monte Carlo projection of the borrower's cash balance while carrying
/// `monthly_payment` for the plan's term.
///
/// The random stream is seeded from the (borrower, plan) pair, so identical
/// inputs always produce identical statistics. `runs` overrides the
/// configured trial count but never drops below `config.min_runs`.
pub fn simulate_cash_flow(
    profile: &BorrowerProfile,
    plan: &FinancingPlan,
    monthly_payment: Money,
    context: &MarketContext,
    runs: Option<u32>,
    config: &SimulationConfig,
) -> AutoFinResult<SimulationResult> {
    let payment = monthly_payment.to_f64().unwrap_or_default();
    let model = CashFlowModel::new(profile, plan, payment, context, config)?;
    let runs = config.effective_runs(runs);
    let seed = simulation_seed(profile, plan);

    tracing::debug!(
        plan_id = %plan.plan_id,
        seed,
        runs,
        horizon = model.horizon,
        "running cash-flow simulation"
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let outcomes: Vec<TrialOutcome> = (0..runs).map(|_| model.run_trial(&mut rng)).collect();

    Ok(summarize(&outcomes, model.horizon))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
