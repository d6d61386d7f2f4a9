//! Composite plan scoring.
//!
//! A plan's score blends three views of the same loan:
//!
//! - **protective**: how the borrower's simulated cash balance holds up
//!   (missed-payment probability, time spent under the reserve buffer, and
//!   the 5th-percentile ending balance relative to the payment)
//! - **affordability**: debt-to-income after adding the new payment
//! - **cost**: total outlay up to the exit month net of resale value
//!
//! Weights are 0.6 / 0.25 / 0.15 at both levels of the blend.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::borrower::BorrowerProfile;
use crate::config::EngineConfig;
use crate::financing::{amortized_payment, financed_principal, resale_value};
use crate::financing::{FinancingPlan, MarketContext};
use crate::simulation::simulate_cash_flow;
use crate::error::AutoFinError;
use crate::types::{ratio_serde, round_to, Money};
use crate::AutoFinResult;

/// DTI that normalizes to 1.0.
const DTI_REFERENCE: f64 = 0.40;
const DTI_NORM_CAP: f64 = 2.0;
const DTI_COMPONENT_CAP: f64 = 1.5;
const COST_REFERENCE: f64 = 30_000.0;
const COST_NORM_CAP: f64 = 1.5;
/// Months of payment the p5 reserve must cover for full resilience credit.
const RESILIENCE_PAYMENT_MONTHS: f64 = 3.0;
const MISSED_PROBABILITY_WEIGHT: f64 = 1.3;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Sub-scores behind a plan's composite score, each in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    /// 1 - 1.3 x missed-payment probability.
    pub safety: f64,
    /// 1 - buffer violation rate.
    pub stability: f64,
    /// p5 reserve against three months of payments.
    pub resilience: f64,
    /// Weighted blend of safety, stability and resilience.
    pub protective: f64,
    pub dti_component: f64,
    pub cost_component: f64,
}

/// Metrics and composite score for one (borrower, plan) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPlan {
    pub plan_id: String,
    pub monthly_payment: Money,
    /// Payments to the exit month plus down payment, less resale value.
    pub effective_cost: Money,
    /// Debt-to-income including the new payment; infinite without income.
    #[serde(with = "ratio_serde")]
    pub dti: f64,
    /// The protective sub-score.
    pub safety_score: f64,
    pub missed_payment_probability: f64,
    pub buffer_violation_rate: f64,
    pub p5_final_reserve: f64,
    pub avg_final_reserve: f64,
    pub worst_case_reserve: f64,
    pub expected_months_to_default: f64,
    pub analysis_months: u32,
    /// Composite score in [0, 1], higher is better.
    pub score: f64,
    pub components: ScoreComponents,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price, simulate and score a single plan for a borrower.
///
/// Errors from amortization (non-positive term) or the simulator are
/// returned as-is; ranking callers record them as per-plan failures.
pub fn score_plan(
    profile: &BorrowerProfile,
    plan: &FinancingPlan,
    context: &MarketContext,
    config: &EngineConfig,
) -> AutoFinResult<ScoredPlan> {
    let term = plan.term_or_default();
    let principal = financed_principal(profile, context)?;
    let monthly_payment = amortized_payment(principal, plan.apr_or_zero(), term)?;
    let payment = monthly_payment.to_f64().unwrap_or_default();

    let dti = debt_to_income(profile, payment);

    let exit_month = profile.exit_month_or(term);
    let active_months = term.min(exit_month.max(0));
    let residual = resale_value(
        profile.vehicle_price,
        exit_month,
        profile.miles_per_year,
        &config.depreciation,
    );
    let effective_cost = monthly_payment
        .checked_mul(Decimal::from(active_months))
        .and_then(|paid| paid.checked_add(profile.down_payment))
        .and_then(|total_paid| total_paid.checked_sub(residual))
        .ok_or_else(|| AutoFinError::overflow("effective_cost"))?
        .max(Decimal::ZERO);

    let sim = simulate_cash_flow(
        profile,
        plan,
        monthly_payment,
        context,
        None,
        &config.simulation,
    )?;

    let safety = (1.0 - (sim.missed_payment_probability * MISSED_PROBABILITY_WEIGHT).min(1.0))
        .max(0.0);
    let stability = (1.0 - sim.buffer_violation_rate.min(1.0)).max(0.0);
    let resilience = if payment > 0.0 {
        (sim.p5_final_reserve / (payment * RESILIENCE_PAYMENT_MONTHS)).clamp(0.0, 2.0) / 2.0
    } else {
        1.0
    };
    let protective = (0.6 * safety + 0.25 * stability + 0.15 * resilience).clamp(0.0, 1.0);

    let dti_component = if dti.is_finite() {
        let dti_norm = (dti / DTI_REFERENCE).clamp(0.0, DTI_NORM_CAP);
        (1.0 - dti_norm.min(DTI_COMPONENT_CAP)).max(0.0)
    } else {
        0.0
    };
    let cost_norm = (effective_cost.to_f64().unwrap_or(f64::MAX) / COST_REFERENCE)
        .clamp(0.0, COST_NORM_CAP);
    let cost_component = (1.0 - cost_norm).max(0.0);

    let score = (0.6 * protective + 0.25 * dti_component + 0.15 * cost_component).clamp(0.0, 1.0);

    tracing::debug!(plan_id = %plan.plan_id, score, dti, "scored plan");

    Ok(ScoredPlan {
        plan_id: plan.plan_id.clone(),
        monthly_payment: monthly_payment.round_dp(2),
        effective_cost: effective_cost.round_dp(2),
        dti: round_to(dti, 4),
        safety_score: round_to(protective, 4),
        missed_payment_probability: sim.missed_payment_probability,
        buffer_violation_rate: sim.buffer_violation_rate,
        p5_final_reserve: sim.p5_final_reserve,
        avg_final_reserve: sim.avg_final_reserve,
        worst_case_reserve: sim.worst_case_reserve,
        expected_months_to_default: sim.expected_months_to_default,
        analysis_months: sim.analysis_months,
        score: round_to(score, 4),
        components: ScoreComponents {
            safety: round_to(safety, 4),
            stability: round_to(stability, 4),
            resilience: round_to(resilience, 4),
            protective: round_to(protective, 4),
            dti_component: round_to(dti_component, 4),
            cost_component: round_to(cost_component, 4),
        },
    })
}

fn debt_to_income(profile: &BorrowerProfile, payment: f64) -> f64 {
    if profile.net_monthly_income <= 0.0 {
        f64::INFINITY
    } else {
        (profile.monthly_obligations + payment) / profile.net_monthly_income
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
