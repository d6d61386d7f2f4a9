use autofin_core::config::SimulationConfig;
use autofin_core::financing::{FinancingPlan, MarketContext, PlanType};
use autofin_core::simulation::seed::canonical_seed_record;
use autofin_core::simulation::{simulate_cash_flow, simulation_seed, SimulationResult};
use autofin_core::BorrowerProfile;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn plan(id: &str, term: i32) -> FinancingPlan {
    FinancingPlan {
        plan_id: id.into(),
        plan_type: PlanType::RetailInstallment,
        term_months: Some(term),
        apr: Some(dec!(0.059)),
        eligible_credit_bands: vec![],
    }
}

fn simulate(profile: &BorrowerProfile, plan: &FinancingPlan, payment: Decimal) -> SimulationResult {
    simulate_cash_flow(
        profile,
        plan,
        payment,
        &MarketContext::default(),
        None,
        &SimulationConfig::default(),
    )
    .unwrap()
}

// ===========================================================================
// Seed derivation
// ===========================================================================

#[test]
fn test_reference_seed() {
    let profile = BorrowerProfile::default();
    let plan = plan("60m_5.9", 60);
    assert_eq!(
        canonical_seed_record(&profile, &plan),
        r#"{"net_income": 3200.0, "obligations": 900.0, "plan_id": "60m_5.9", "stability": 0.85, "term": 60}"#
    );
    assert_eq!(simulation_seed(&profile, &plan), 940_727_983);
}

#[test]
fn test_seed_ignores_fields_outside_record() {
    let base = BorrowerProfile::default();
    let richer = BorrowerProfile {
        cash_reserves: 90_000.0,
        vehicle_price: dec!(55000),
        ..BorrowerProfile::default()
    };
    let plan = plan("60m_5.9", 60);
    assert_eq!(simulation_seed(&base, &plan), simulation_seed(&richer, &plan));
}

// ===========================================================================
// Simulation
// ===========================================================================

#[test]
fn test_identical_inputs_identical_statistics() {
    let profile = BorrowerProfile {
        unexpected_expense_rate: 0.3,
        ..BorrowerProfile::default()
    };
    let plan = plan("72m_6.9", 72);
    let first = simulate(&profile, &plan, dec!(470));
    let second = simulate(&profile, &plan, dec!(470));
    assert_eq!(first, second);
    assert_eq!(first.trials, 250);
    assert_eq!(first.analysis_months, 96);
}

#[test]
fn test_heavier_payment_is_riskier() {
    let profile = BorrowerProfile::default();
    let plan = plan("60m_5.9", 60);
    let light = simulate(&profile, &plan, dec!(200));
    let heavy = simulate(&profile, &plan, dec!(2500));
    assert!(heavy.missed_payment_probability >= light.missed_payment_probability);
    assert_eq!(heavy.missed_payment_probability, 1.0);
    assert!(heavy.expected_months_to_default < light.expected_months_to_default);
}

#[test]
fn test_zero_payment_plan_still_simulated() {
    let profile = BorrowerProfile {
        net_monthly_income: 6000.0,
        monthly_obligations: 1000.0,
        unexpected_expense_rate: 0.0,
        ..BorrowerProfile::default()
    };
    let result = simulate(&profile, &plan("36m", 36), Decimal::ZERO);
    assert_eq!(result.missed_payment_probability, 0.0);
    assert!(result.avg_final_reserve > profile.cash_reserves);
}

#[test]
fn test_configured_trial_count() {
    let config = SimulationConfig {
        runs: 40,
        ..SimulationConfig::default()
    };
    let result = simulate_cash_flow(
        &BorrowerProfile::default(),
        &plan("48m", 48),
        dec!(600),
        &MarketContext::default(),
        None,
        &config,
    )
    .unwrap();
    assert_eq!(result.trials, 40);
}
