use autofin_core::borrower::payroll::{derive_payroll_features, PayFrequency, PayrollRecord};
use autofin_core::catalog::{fallback_plans, normalize_catalog};
use autofin_core::financing::{FinancingPlan, MarketContext, PlanType};
use autofin_core::ranking::{
    filter_eligible, rank_plans, recommend_scenarios, RankOutcome, TradeoffStrategy,
};
use autofin_core::scoring::score_plan;
use autofin_core::{AutoFinError, BorrowerProfile, EngineConfig};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use serde_json::json;

fn config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.simulation.runs = 40;
    config
}

fn band(code: &str) -> BorrowerProfile {
    BorrowerProfile {
        credit_band: Some(code.into()),
        ..BorrowerProfile::default()
    }
}

// ===========================================================================
// Eligibility
// ===========================================================================

#[test]
fn test_fallback_catalog_filtered_by_band() {
    let catalog = fallback_plans();
    let cfg = EngineConfig::default();

    let ids = |profile: &BorrowerProfile| -> Vec<String> {
        filter_eligible(profile, &catalog, &cfg.eligibility)
            .into_iter()
            .map(|p| p.plan_id.clone())
            .collect()
    };

    assert_eq!(ids(&band("C")), ["48m_4.9", "60m_5.9", "72m_6.9"]);
    assert_eq!(
        ids(&band("A")),
        ["36m_2.9", "48m_4.9", "60m_5.9", "36m_lease", "48m_balloon"]
    );
    assert_eq!(ids(&BorrowerProfile::default()).len(), 6);
}

#[test]
fn test_unmatched_band_is_no_eligible_plans_outcome() {
    let outcome = rank_plans(
        &band("D"),
        &fallback_plans(),
        &MarketContext::default(),
        TradeoffStrategy::Balanced,
        3,
        &config(),
    );
    match outcome {
        RankOutcome::NoEligiblePlans { excluded, failures } => {
            assert_eq!(excluded.len(), 6);
            assert!(failures.is_empty());
        }
        RankOutcome::Ranked(r) => panic!("expected no eligible plans, got {}", r.top.plan_id),
    }
}

// ===========================================================================
// Ranking
// ===========================================================================

#[test]
fn test_lowest_monthly_is_non_decreasing() {
    let recommendation = rank_plans(
        &BorrowerProfile::default(),
        &fallback_plans(),
        &MarketContext::default(),
        TradeoffStrategy::LowestMonthly,
        6,
        &config(),
    )
    .into_result()
    .unwrap();

    let payments: Vec<_> = recommendation.plans().map(|p| p.monthly_payment).collect();
    assert_eq!(payments.len(), 6);
    assert!(payments.windows(2).all(|w| w[0] <= w[1]), "{payments:?}");
    assert_eq!(recommendation.top.plan_id, "72m_6.9");
}

#[test]
fn test_balanced_is_non_increasing_in_score() {
    let recommendation = rank_plans(
        &BorrowerProfile::default(),
        &fallback_plans(),
        &MarketContext::default(),
        TradeoffStrategy::Balanced,
        4,
        &config(),
    )
    .into_result()
    .unwrap();
    let scores: Vec<f64> = recommendation.plans().map(|p| p.score).collect();
    assert_eq!(scores.len(), 4);
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");
}

#[test]
fn test_failing_plan_is_skipped_not_fatal() {
    let mut catalog = fallback_plans();
    catalog.push(FinancingPlan {
        plan_id: "zero_term".into(),
        plan_type: PlanType::RetailInstallment,
        term_months: Some(0),
        apr: Some(dec!(0.03)),
        eligible_credit_bands: vec![],
    });
    let recommendation = rank_plans(
        &BorrowerProfile::default(),
        &catalog,
        &MarketContext::default(),
        TradeoffStrategy::LowestCost,
        10,
        &config(),
    )
    .into_result()
    .unwrap();

    assert_eq!(recommendation.plans().count(), 6);
    assert_eq!(recommendation.failures.len(), 1);
    assert_eq!(recommendation.failures[0].plan_id, "zero_term");
}

#[test]
fn test_every_plan_failing_is_no_eligible_plans() {
    let catalog = vec![FinancingPlan {
        plan_id: "zero_term".into(),
        plan_type: PlanType::RetailInstallment,
        term_months: Some(0),
        apr: Some(dec!(0.03)),
        eligible_credit_bands: vec![],
    }];
    let err = rank_plans(
        &BorrowerProfile::default(),
        &catalog,
        &MarketContext::default(),
        TradeoffStrategy::Balanced,
        3,
        &config(),
    )
    .into_result()
    .unwrap_err();
    assert!(matches!(err, AutoFinError::NoEligiblePlans(_)));
}

#[test]
fn test_overflowing_plan_is_recorded_as_failure() {
    let profile: BorrowerProfile = serde_json::from_value(json!({
        "vehicle_price": "70000000000000000000000000000"
    }))
    .unwrap();
    let catalog = vec![
        FinancingPlan {
            plan_id: "36m_2.9".into(),
            plan_type: PlanType::RetailInstallment,
            term_months: Some(36),
            apr: Some(dec!(0.029)),
            eligible_credit_bands: vec![],
        },
        FinancingPlan {
            plan_id: "60m_5.9".into(),
            plan_type: PlanType::RetailInstallment,
            term_months: Some(60),
            apr: Some(dec!(0.059)),
            eligible_credit_bands: vec![],
        },
    ];

    let outcome = rank_plans(
        &profile,
        &catalog,
        &MarketContext::default(),
        TradeoffStrategy::Balanced,
        3,
        &config(),
    );
    let recommendation = outcome.into_result().unwrap();
    assert_eq!(recommendation.top.plan_id, "36m_2.9");
    assert!(recommendation.alternatives.is_empty());
    assert_eq!(recommendation.failures.len(), 1);
    assert_eq!(recommendation.failures[0].plan_id, "60m_5.9");
    assert!(recommendation.failures[0].reason.contains("overflow"));
}

#[test]
fn test_exit_beyond_horizon_limit_still_ranks() {
    let profile = BorrowerProfile {
        exit_month: Some(1_500),
        ..BorrowerProfile::default()
    };
    let recommendation = rank_plans(
        &profile,
        &fallback_plans(),
        &MarketContext::default(),
        TradeoffStrategy::LowestMonthly,
        3,
        &config(),
    )
    .into_result()
    .unwrap();
    assert!(recommendation.failures.is_empty());
    assert!(recommendation
        .plans()
        .all(|p| p.analysis_months == EngineConfig::default().simulation.max_horizon_months));
}

#[test]
fn test_ranked_plans_match_direct_scoring() {
    let profile = band("B");
    let catalog = fallback_plans();
    let context = MarketContext::default();
    let cfg = config();

    let recommendation = rank_plans(&profile, &catalog, &context, TradeoffStrategy::LowestRisk, 3, &cfg)
        .into_result()
        .unwrap();
    let direct = score_plan(
        &profile,
        catalog
            .iter()
            .find(|p| p.plan_id == recommendation.top.plan_id)
            .unwrap(),
        &context,
        &cfg,
    )
    .unwrap();
    assert_eq!(recommendation.top, direct);
}

#[test]
fn test_scenarios_from_raw_documents() {
    let profile: BorrowerProfile = serde_json::from_value(json!({
        "net_monthly_income": "5400",
        "monthly_obligations": 1200,
        "cash_reserves": 8000,
        "credit_band": "A",
        "exit_month": 48
    }))
    .unwrap();
    let catalog = normalize_catalog(&json!({"plan_types": [{
        "type": "retail_installment",
        "apr_range_by_credit_band": {"A": [0.02, 0.04], "B": [0.05, 0.07]},
        "typical_terms_months": [36, 60, 72]
    }]}));

    let set = recommend_scenarios(&profile, &catalog, &MarketContext::default(), 3, &config())
        .into_result()
        .unwrap();
    assert_eq!(set.lowest_monthly.top.plan_id, "72m_retail_installment_3");
    assert_eq!(set.balanced.plans().count(), 3);
}

// ===========================================================================
// Payroll
// ===========================================================================

#[test]
fn test_biweekly_paystub_features() {
    let features = derive_payroll_features(&PayrollRecord {
        pay_frequency: PayFrequency::Biweekly,
        gross_pay_per_period: dec!(2500),
        net_pay_per_period: dec!(1900),
        total_taxes_withheld_per_period: dec!(450),
        total_deductions_per_period: dec!(150),
    });
    // 2500 * 2.165, 1900 * 2.165
    assert_eq!(features.gross_monthly_income, dec!(5412.50));
    assert_eq!(features.net_monthly_income, dec!(4113.50));
    assert_eq!(features.effective_tax_rate, dec!(0.18));
    assert_eq!(features.deduction_rate, dec!(0.06));
    assert_eq!(features.income_stability_index, dec!(0.9));
}
