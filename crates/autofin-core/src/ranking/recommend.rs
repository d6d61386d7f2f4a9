//! Ranking entry points that wrap results for callers: the envelope form,
//! all-strategy scenarios, and batch labeling of many borrowers.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::borrower::BorrowerProfile;
use crate::config::EngineConfig;
use crate::financing::{FinancingPlan, MarketContext};
use crate::ranking::eligibility::PlanExclusion;
use crate::ranking::ranker::{
    no_eligible_plans, score_catalog, PlanFailure, RankOutcome, Recommendation, ScoredCatalog,
    TradeoffStrategy,
};
use crate::types::{with_metadata, ComputationOutput, MIXED_PRECISION};
use crate::AutoFinResult;

/// Number of plan ids recorded per labeled borrower.
const LABEL_TOP_N: usize = 3;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One recommendation per tradeoff strategy for the same borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub balanced: Recommendation,
    pub lowest_monthly: Recommendation,
    pub lowest_cost: Recommendation,
    pub lowest_risk: Recommendation,
}

/// Scenario rankings, or why nothing could be ranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Ranked(ScenarioSet),
    NoEligiblePlans {
        excluded: Vec<PlanExclusion>,
        failures: Vec<PlanFailure>,
    },
}

impl ScenarioOutcome {
    pub fn into_result(self) -> AutoFinResult<ScenarioSet> {
        match self {
            ScenarioOutcome::Ranked(set) => Ok(set),
            ScenarioOutcome::NoEligiblePlans { excluded, failures } => {
                Err(no_eligible_plans(&excluded, &failures))
            }
        }
    }
}

/// Best plans for one borrower under balanced ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileLabel {
    /// Position of the borrower in the input batch.
    pub profile_index: usize,
    pub profile: BorrowerProfile,
    pub best_plan_id: String,
    pub top3_plan_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelBatch {
    pub generated_at: DateTime<Utc>,
    pub labels: Vec<ProfileLabel>,
    /// Borrowers for whom no plan could be scored.
    pub skipped_profiles: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Rank a catalog and wrap the outcome in a [`ComputationOutput`].
///
/// Excluded and failed plans become envelope warnings. An empty ranking is
/// returned as [`RankOutcome::NoEligiblePlans`], not as an error.
pub fn recommend(
    profile: &BorrowerProfile,
    plans: &[FinancingPlan],
    context: &MarketContext,
    strategy: TradeoffStrategy,
    k: usize,
    config: &EngineConfig,
) -> ComputationOutput<RankOutcome> {
    let start = Instant::now();

    let outcome = score_catalog(profile, plans, context, config).rank(strategy, k);

    let mut warnings: Vec<String> = outcome
        .excluded()
        .iter()
        .map(|e| format!("Plan '{}' excluded: {}", e.plan_id, e.reason))
        .collect();
    warnings.extend(
        outcome
            .failures()
            .iter()
            .map(|f| format!("Plan '{}' could not be scored: {}", f.plan_id, f.reason)),
    );

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Monte Carlo cash-flow plan ranking",
        &serde_json::json!({
            "strategy": strategy,
            "k": k.max(1),
            "candidate_plans": plans.len(),
            "trials_per_plan": config.simulation.effective_runs(None),
            "region_state": profile.region_state,
            "infer_missing_credit_band": config.eligibility.infer_missing_credit_band,
        }),
        warnings,
        elapsed,
        MIXED_PRECISION,
        outcome,
    )
}

/// Rank the same catalog under every tradeoff strategy.
///
/// Each plan is scored once and reordered per strategy.
pub fn recommend_scenarios(
    profile: &BorrowerProfile,
    plans: &[FinancingPlan],
    context: &MarketContext,
    k: usize,
    config: &EngineConfig,
) -> ScenarioOutcome {
    let catalog = score_catalog(profile, plans, context, config);
    match rank_every_strategy(&catalog, k) {
        Ok(set) => ScenarioOutcome::Ranked(set),
        Err(_) => ScenarioOutcome::NoEligiblePlans {
            excluded: catalog.excluded,
            failures: catalog.failures,
        },
    }
}

fn rank_every_strategy(catalog: &ScoredCatalog, k: usize) -> AutoFinResult<ScenarioSet> {
    let rank = |strategy| catalog.rank(strategy, k).into_result();

    Ok(ScenarioSet {
        balanced: rank(TradeoffStrategy::Balanced)?,
        lowest_monthly: rank(TradeoffStrategy::LowestMonthly)?,
        lowest_cost: rank(TradeoffStrategy::LowestCost)?,
        lowest_risk: rank(TradeoffStrategy::LowestRisk)?,
    })
}

/// Label each borrower with their best and top three plans.
///
/// Borrowers with no scorable plan are listed in `skipped_profiles` rather
/// than failing the batch.
pub fn label_profiles(
    profiles: &[BorrowerProfile],
    plans: &[FinancingPlan],
    context: &MarketContext,
    config: &EngineConfig,
) -> LabelBatch {
    let mut labels = Vec::with_capacity(profiles.len());
    let mut skipped_profiles = Vec::new();

    for (profile_index, profile) in profiles.iter().enumerate() {
        let ranked = score_catalog(profile, plans, context, config)
            .rank(TradeoffStrategy::Balanced, LABEL_TOP_N)
            .into_result();
        match ranked {
            Ok(recommendation) => labels.push(ProfileLabel {
                profile_index,
                profile: profile.clone(),
                best_plan_id: recommendation.top.plan_id.clone(),
                top3_plan_ids: recommendation.plans().map(|p| p.plan_id.clone()).collect(),
            }),
            Err(_) => skipped_profiles.push(profile_index),
        }
    }

    tracing::info!(
        profiles = profiles.len(),
        labeled = labels.len(),
        skipped = skipped_profiles.len(),
        "labeled borrower batch"
    );

    LabelBatch {
        generated_at: Utc::now(),
        labels,
        skipped_profiles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::financing::PlanType;
    use rust_decimal_macros::dec;

    fn catalog() -> Vec<FinancingPlan> {
        [("36m", 36, dec!(0.029)), ("60m", 60, dec!(0.059)), ("72m", 72, dec!(0.069))]
            .into_iter()
            .map(|(id, term, apr)| FinancingPlan {
                plan_id: id.into(),
                plan_type: PlanType::RetailInstallment,
                term_months: Some(term),
                apr: Some(apr),
                eligible_credit_bands: vec!["A".into(), "B".into()],
            })
            .collect()
    }

    fn quick_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.simulation.runs = 25;
        config
    }

    #[test]
    fn test_recommend_envelope() {
        let mut plans = catalog();
        plans.push(FinancingPlan {
            plan_id: "mystery".into(),
            plan_type: PlanType::Unrecognized,
            term_months: Some(24),
            apr: Some(dec!(0.01)),
            eligible_credit_bands: vec![],
        });
        let output = recommend(
            &BorrowerProfile::default(),
            &plans,
            &MarketContext::default(),
            TradeoffStrategy::LowestMonthly,
            2,
            &quick_config(),
        );

        assert_eq!(output.warnings.len(), 1);
        assert!(output.warnings[0].contains("mystery"));
        assert_eq!(output.metadata.precision, MIXED_PRECISION);
        let recommendation = output.result.into_result().unwrap();
        assert_eq!(recommendation.top.plan_id, "72m");
        assert_eq!(recommendation.alternatives.len(), 1);
    }

    #[test]
    fn test_recommend_empty_ranking_is_an_outcome() {
        let band_c = BorrowerProfile {
            credit_band: Some("C".into()),
            ..BorrowerProfile::default()
        };
        let output = recommend(
            &band_c,
            &catalog(),
            &MarketContext::default(),
            TradeoffStrategy::Balanced,
            3,
            &quick_config(),
        );

        assert_eq!(output.warnings.len(), 3);
        assert_eq!(output.result.excluded().len(), 3);
        assert!(matches!(output.result, RankOutcome::NoEligiblePlans { .. }));

        let json = serde_json::to_value(&output.result).unwrap();
        assert_eq!(json["status"], "no_eligible_plans");
    }

    #[test]
    fn test_scenarios_cover_every_strategy() {
        let set = recommend_scenarios(
            &BorrowerProfile::default(),
            &catalog(),
            &MarketContext::default(),
            3,
            &quick_config(),
        )
        .into_result()
        .unwrap();
        assert_eq!(set.balanced.strategy, TradeoffStrategy::Balanced);
        assert_eq!(set.lowest_monthly.strategy, TradeoffStrategy::LowestMonthly);
        assert_eq!(set.lowest_cost.strategy, TradeoffStrategy::LowestCost);
        assert_eq!(set.lowest_risk.strategy, TradeoffStrategy::LowestRisk);
        assert_eq!(set.lowest_monthly.top.plan_id, "72m");
    }

    #[test]
    fn test_scenarios_without_candidates() {
        let band_c = BorrowerProfile {
            credit_band: Some("C".into()),
            ..BorrowerProfile::default()
        };
        let outcome = recommend_scenarios(
            &band_c,
            &catalog(),
            &MarketContext::default(),
            3,
            &quick_config(),
        );
        match &outcome {
            ScenarioOutcome::NoEligiblePlans { excluded, failures } => {
                assert_eq!(excluded.len(), 3);
                assert!(failures.is_empty());
            }
            ScenarioOutcome::Ranked(_) => panic!("expected no eligible plans"),
        }
        assert_eq!(serde_json::to_value(&outcome).unwrap()["status"], "no_eligible_plans");
        assert!(matches!(
            outcome.into_result(),
            Err(crate::error::AutoFinError::NoEligiblePlans(_))
        ));
    }

    #[test]
    fn test_labels_skip_unservable_profiles() {
        let band_c = BorrowerProfile {
            credit_band: Some("C".into()),
            ..BorrowerProfile::default()
        };
        let batch = label_profiles(
            &[BorrowerProfile::default(), band_c],
            &catalog(),
            &MarketContext::default(),
            &quick_config(),
        );
        assert_eq!(batch.labels.len(), 1);
        assert_eq!(batch.skipped_profiles, vec![1]);

        let label = &batch.labels[0];
        assert_eq!(label.top3_plan_ids.len(), 3);
        assert_eq!(label.best_plan_id, label.top3_plan_ids[0]);
    }
}
