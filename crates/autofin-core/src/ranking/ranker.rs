use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::borrower::BorrowerProfile;
use crate::config::EngineConfig;
use crate::error::AutoFinError;
use crate::financing::{FinancingPlan, MarketContext};
use crate::ranking::eligibility::{partition_eligible, PlanExclusion};
use crate::scoring::{score_plan, ScoredPlan};
use crate::AutoFinResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Ordering policy for scored plans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeoffStrategy {
    /// Highest composite score first.
    #[default]
    Balanced,
    /// Lowest monthly payment, then lowest effective cost.
    LowestMonthly,
    /// Lowest effective cost, then lowest monthly payment.
    LowestCost,
    /// Lowest missed-payment probability, then highest safety score, then
    /// lowest monthly payment.
    LowestRisk,
}

impl TradeoffStrategy {
    pub const ALL: [TradeoffStrategy; 4] = [
        TradeoffStrategy::Balanced,
        TradeoffStrategy::LowestMonthly,
        TradeoffStrategy::LowestCost,
        TradeoffStrategy::LowestRisk,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TradeoffStrategy::Balanced => "balanced",
            TradeoffStrategy::LowestMonthly => "lowest_monthly",
            TradeoffStrategy::LowestCost => "lowest_cost",
            TradeoffStrategy::LowestRisk => "lowest_risk",
        }
    }
}

impl fmt::Display for TradeoffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeoffStrategy {
    type Err = AutoFinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TradeoffStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| {
                AutoFinError::invalid(
                    "strategy",
                    format!(
                        "Unknown strategy '{s}'; expected one of balanced, lowest_monthly, lowest_cost, lowest_risk"
                    ),
                )
            })
    }
}

/// A plan whose scoring raised an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanFailure {
    pub plan_id: String,
    pub reason: String,
}

/// Result of scoring one eligible plan.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    Scored(ScoredPlan),
    Failed { plan_id: String, reason: String },
}

/// Ranked plans for one borrower under one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub strategy: TradeoffStrategy,
    pub top: ScoredPlan,
    pub alternatives: Vec<ScoredPlan>,
    /// Plans removed by the eligibility filter.
    #[serde(default)]
    pub excluded: Vec<PlanExclusion>,
    /// Eligible plans that could not be scored.
    #[serde(default)]
    pub failures: Vec<PlanFailure>,
}

impl Recommendation {
    /// Top plan followed by the alternatives.
    pub fn plans(&self) -> impl Iterator<Item = &ScoredPlan> {
        std::iter::once(&self.top).chain(self.alternatives.iter())
    }
}

/// Outcome of ranking a catalog for a borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RankOutcome {
    Ranked(Recommendation),
    /// Nothing survived eligibility and scoring.
    NoEligiblePlans {
        excluded: Vec<PlanExclusion>,
        failures: Vec<PlanFailure>,
    },
}

impl RankOutcome {
    /// Plans removed by the eligibility filter, whichever the outcome.
    pub fn excluded(&self) -> &[PlanExclusion] {
        match self {
            RankOutcome::Ranked(recommendation) => &recommendation.excluded,
            RankOutcome::NoEligiblePlans { excluded, .. } => excluded,
        }
    }

    pub fn failures(&self) -> &[PlanFailure] {
        match self {
            RankOutcome::Ranked(recommendation) => &recommendation.failures,
            RankOutcome::NoEligiblePlans { failures, .. } => failures,
        }
    }

    pub fn into_result(self) -> AutoFinResult<Recommendation> {
        match self {
            RankOutcome::Ranked(recommendation) => Ok(recommendation),
            RankOutcome::NoEligiblePlans { excluded, failures } => {
                Err(no_eligible_plans(&excluded, &failures))
            }
        }
    }
}

pub(crate) fn no_eligible_plans(excluded: &[PlanExclusion], failures: &[PlanFailure]) -> AutoFinError {
    AutoFinError::NoEligiblePlans(format!(
        "{} plan(s) filtered out, {} plan(s) failed scoring",
        excluded.len(),
        failures.len()
    ))
}

/// Scored plans and the reasons the rest were dropped, before ordering.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScoredCatalog {
    pub scored: Vec<ScoredPlan>,
    pub excluded: Vec<PlanExclusion>,
    pub failures: Vec<PlanFailure>,
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

fn compare(strategy: TradeoffStrategy, a: &ScoredPlan, b: &ScoredPlan) -> Ordering {
    match strategy {
        TradeoffStrategy::Balanced => b.score.total_cmp(&a.score),
        TradeoffStrategy::LowestMonthly => a
            .monthly_payment
            .cmp(&b.monthly_payment)
            .then_with(|| a.effective_cost.cmp(&b.effective_cost)),
        TradeoffStrategy::LowestCost => a
            .effective_cost
            .cmp(&b.effective_cost)
            .then_with(|| a.monthly_payment.cmp(&b.monthly_payment)),
        TradeoffStrategy::LowestRisk => a
            .missed_payment_probability
            .total_cmp(&b.missed_payment_probability)
            .then_with(|| b.safety_score.total_cmp(&a.safety_score))
            .then_with(|| a.monthly_payment.cmp(&b.monthly_payment)),
    }
}

/// Order scored plans in place under `strategy`. Ties keep input order.
pub fn sort_scored(plans: &mut [ScoredPlan], strategy: TradeoffStrategy) {
    plans.sort_by(|a, b| compare(strategy, a, b));
}

// ---------------------------------------------------------------------------
// Scoring a catalog
// ---------------------------------------------------------------------------

fn score_one(
    profile: &BorrowerProfile,
    plan: &FinancingPlan,
    context: &MarketContext,
    config: &EngineConfig,
) -> PlanOutcome {
    match score_plan(profile, plan, context, config) {
        Ok(scored) => PlanOutcome::Scored(scored),
        Err(e) => PlanOutcome::Failed {
            plan_id: plan.plan_id.clone(),
            reason: e.to_string(),
        },
    }
}

/// Score every plan, keeping one outcome per plan in input order.
pub fn score_candidates(
    profile: &BorrowerProfile,
    plans: &[&FinancingPlan],
    context: &MarketContext,
    config: &EngineConfig,
) -> Vec<PlanOutcome> {
    #[cfg(feature = "parallel")]
    let candidates = plans.par_iter();
    #[cfg(not(feature = "parallel"))]
    let candidates = plans.iter();

    candidates
        .map(|plan| score_one(profile, plan, context, config))
        .collect()
}

/// Filter and score a catalog without ordering it.
pub(crate) fn score_catalog(
    profile: &BorrowerProfile,
    plans: &[FinancingPlan],
    context: &MarketContext,
    config: &EngineConfig,
) -> ScoredCatalog {
    let (eligible, excluded) = partition_eligible(profile, plans, &config.eligibility);
    for exclusion in &excluded {
        tracing::warn!(plan_id = %exclusion.plan_id, reason = %exclusion.reason, "plan excluded");
    }

    let mut catalog = ScoredCatalog {
        excluded,
        ..ScoredCatalog::default()
    };
    for outcome in score_candidates(profile, &eligible, context, config) {
        match outcome {
            PlanOutcome::Scored(scored) => catalog.scored.push(scored),
            PlanOutcome::Failed { plan_id, reason } => {
                tracing::warn!(plan_id = %plan_id, reason = %reason, "plan failed scoring");
                catalog.failures.push(PlanFailure { plan_id, reason });
            }
        }
    }
    catalog
}

impl ScoredCatalog {
    /// Order a copy of the scored plans and keep the best `k` (at least one).
    pub(crate) fn rank(&self, strategy: TradeoffStrategy, k: usize) -> RankOutcome {
        let mut ordered = self.scored.clone();
        sort_scored(&mut ordered, strategy);
        ordered.truncate(k.max(1));

        let mut ordered = ordered.into_iter();
        match ordered.next() {
            Some(top) => RankOutcome::Ranked(Recommendation {
                strategy,
                top,
                alternatives: ordered.collect(),
                excluded: self.excluded.clone(),
                failures: self.failures.clone(),
            }),
            None => RankOutcome::NoEligiblePlans {
                excluded: self.excluded.clone(),
                failures: self.failures.clone(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Filter `plans` for the borrower, score the survivors, and return the best
/// `k` under `strategy`.
///
/// Plans that fail scoring are reported in the outcome instead of aborting
/// the batch. When nothing can be ranked the outcome is
/// [`RankOutcome::NoEligiblePlans`].
pub fn rank_plans(
    profile: &BorrowerProfile,
    plans: &[FinancingPlan],
    context: &MarketContext,
    strategy: TradeoffStrategy,
    k: usize,
    config: &EngineConfig,
) -> RankOutcome {
    let catalog = score_catalog(profile, plans, context, config);
    let outcome = catalog.rank(strategy, k);

    tracing::info!(
        strategy = %strategy,
        candidates = plans.len(),
        scored = catalog.scored.len(),
        excluded = catalog.excluded.len(),
        failed = catalog.failures.len(),
        "ranked plans"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreComponents;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn scored(id: &str, payment: Decimal, cost: Decimal, missed: f64, safety: f64, score: f64) -> ScoredPlan {
        ScoredPlan {
            plan_id: id.into(),
            monthly_payment: payment,
            effective_cost: cost,
            dti: 0.4,
            safety_score: safety,
            missed_payment_probability: missed,
            buffer_violation_rate: 0.0,
            p5_final_reserve: 0.0,
            avg_final_reserve: 0.0,
            worst_case_reserve: 0.0,
            expected_months_to_default: 96.0,
            analysis_months: 96,
            score,
            components: ScoreComponents {
                safety,
                stability: 1.0,
                resilience: 1.0,
                protective: safety,
                dti_component: 0.0,
                cost_component: 0.0,
            },
        }
    }

    fn fixture() -> Vec<ScoredPlan> {
        vec![
            scored("a", dec!(500), dec!(15000), 0.10, 0.80, 0.70),
            scored("b", dec!(400), dec!(18000), 0.10, 0.85, 0.72),
            scored("c", dec!(400), dec!(16000), 0.05, 0.75, 0.65),
            scored("d", dec!(650), dec!(15000), 0.10, 0.85, 0.72),
        ]
    }

    fn order(strategy: TradeoffStrategy) -> Vec<String> {
        let mut plans = fixture();
        sort_scored(&mut plans, strategy);
        plans.into_iter().map(|p| p.plan_id).collect()
    }

    #[test]
    fn test_balanced_descending_and_stable() {
        assert_eq!(order(TradeoffStrategy::Balanced), ["b", "d", "a", "c"]);
    }

    #[test]
    fn test_lowest_monthly_breaks_ties_on_cost() {
        assert_eq!(order(TradeoffStrategy::LowestMonthly), ["c", "b", "a", "d"]);
    }

    #[test]
    fn test_lowest_cost_breaks_ties_on_payment() {
        assert_eq!(order(TradeoffStrategy::LowestCost), ["a", "d", "c", "b"]);
    }

    #[test]
    fn test_lowest_risk_prefers_safety_then_payment() {
        assert_eq!(order(TradeoffStrategy::LowestRisk), ["c", "b", "d", "a"]);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "lowest_cost".parse::<TradeoffStrategy>().unwrap(),
            TradeoffStrategy::LowestCost
        );
        assert!("cheapest".parse::<TradeoffStrategy>().is_err());
        for strategy in TradeoffStrategy::ALL {
            assert_eq!(strategy.to_string().parse::<TradeoffStrategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_empty_catalog_rank_is_no_eligible_plans() {
        let catalog = ScoredCatalog::default();
        let outcome = catalog.rank(TradeoffStrategy::Balanced, 3);
        assert!(matches!(outcome, RankOutcome::NoEligiblePlans { .. }));
        assert!(matches!(
            outcome.into_result(),
            Err(AutoFinError::NoEligiblePlans(_))
        ));
    }

    #[test]
    fn test_rank_truncates_to_k() {
        let catalog = ScoredCatalog {
            scored: fixture(),
            ..ScoredCatalog::default()
        };
        let recommendation = catalog
            .rank(TradeoffStrategy::Balanced, 2)
            .into_result()
            .unwrap();
        assert_eq!(recommendation.top.plan_id, "b");
        assert_eq!(recommendation.alternatives.len(), 1);

        let at_least_one = catalog.rank(TradeoffStrategy::Balanced, 0).into_result().unwrap();
        assert!(at_least_one.alternatives.is_empty());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = RankOutcome::NoEligiblePlans {
            excluded: vec![],
            failures: vec![],
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "no_eligible_plans");
    }
}
