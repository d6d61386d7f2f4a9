use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};

use autofin_core::borrower::payroll::enrich_payroll_record;
use autofin_core::catalog::{fallback_plans, normalize_catalog};
use autofin_core::financing::{amortized_payment as amortize, financed_principal, FinancingPlan, MarketContext};
use autofin_core::ranking::{rank_plans as rank, recommend_scenarios as scenarios, TradeoffStrategy};
use autofin_core::scoring::score_plan as score;
use autofin_core::simulation::simulate_cash_flow as simulate;
use autofin_core::{BorrowerProfile, EngineConfig};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: for<'de> Deserialize<'de>>(input_json: &str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

fn engine_config(config: Option<EngineConfig>) -> NapiResult<EngineConfig> {
    let config = config.unwrap_or_default();
    config.validate().map_err(to_napi_error)?;
    Ok(config)
}

/// Plans from an explicit list, a raw catalog document, or the built-in catalog.
fn resolve_catalog(plans: Option<Vec<FinancingPlan>>, catalog: Option<Value>) -> Vec<FinancingPlan> {
    match (plans, catalog) {
        (Some(plans), _) => plans,
        (None, Some(raw)) => normalize_catalog(&raw),
        (None, None) => fallback_plans(),
    }
}

fn default_k() -> usize {
    3
}

// ---------------------------------------------------------------------------
// Request shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ScoreRequest {
    profile: BorrowerProfile,
    plan: FinancingPlan,
    #[serde(default)]
    context: MarketContext,
    #[serde(default)]
    config: Option<EngineConfig>,
}

#[derive(Deserialize)]
struct RankRequest {
    profile: BorrowerProfile,
    #[serde(default)]
    plans: Option<Vec<FinancingPlan>>,
    #[serde(default)]
    catalog: Option<Value>,
    #[serde(default)]
    context: MarketContext,
    #[serde(default)]
    strategy: TradeoffStrategy,
    #[serde(default = "default_k")]
    k: usize,
    #[serde(default)]
    config: Option<EngineConfig>,
}

#[derive(Deserialize)]
struct SimulateRequest {
    profile: BorrowerProfile,
    plan: FinancingPlan,
    #[serde(default)]
    monthly_payment: Option<Decimal>,
    #[serde(default)]
    context: MarketContext,
    #[serde(default)]
    runs: Option<u32>,
    #[serde(default)]
    config: Option<EngineConfig>,
}

#[derive(Deserialize)]
struct AmortizeRequest {
    principal: Decimal,
    apr: Decimal,
    term_months: i32,
}

// ---------------------------------------------------------------------------
// Scoring & ranking
// ---------------------------------------------------------------------------

#[napi]
pub fn score_plan(input_json: String) -> NapiResult<String> {
    let req: ScoreRequest = parse(&input_json)?;
    let config = engine_config(req.config)?;
    let output = score(&req.profile, &req.plan, &req.context, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Returns the tagged outcome; an empty ranking is `{"status": "no_eligible_plans", ...}`.
#[napi]
pub fn rank_plans(input_json: String) -> NapiResult<String> {
    let req: RankRequest = parse(&input_json)?;
    let config = engine_config(req.config)?;
    let plans = resolve_catalog(req.plans, req.catalog);
    let outcome = rank(&req.profile, &plans, &req.context, req.strategy, req.k, &config);
    serde_json::to_string(&outcome).map_err(to_napi_error)
}

/// Tagged like `rankPlans`: `{"status": "ranked", "balanced": ...}` or
/// `{"status": "no_eligible_plans", ...}`.
#[napi]
pub fn recommend_scenarios(input_json: String) -> NapiResult<String> {
    let req: RankRequest = parse(&input_json)?;
    let config = engine_config(req.config)?;
    let plans = resolve_catalog(req.plans, req.catalog);
    let outcome = scenarios(&req.profile, &plans, &req.context, req.k, &config);
    serde_json::to_string(&outcome).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Simulation & financing
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_cash_flow(input_json: String) -> NapiResult<String> {
    let req: SimulateRequest = parse(&input_json)?;
    let config = engine_config(req.config)?;
    let payment = match req.monthly_payment {
        Some(payment) => payment,
        None => amortize(
            financed_principal(&req.profile, &req.context).map_err(to_napi_error)?,
            req.plan.apr_or_zero(),
            req.plan.term_or_default(),
        )
        .map_err(to_napi_error)?,
    };
    let output = simulate(
        &req.profile,
        &req.plan,
        payment,
        &req.context,
        req.runs,
        &config.simulation,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortized_payment(input_json: String) -> NapiResult<String> {
    let req: AmortizeRequest = parse(&input_json)?;
    let payment = amortize(req.principal, req.apr, req.term_months).map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "monthly_payment": payment.round_dp(2) }))
        .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Borrower features
// ---------------------------------------------------------------------------

#[napi]
pub fn derive_borrower_features(input_json: String) -> NapiResult<String> {
    let record: Map<String, Value> = parse(&input_json)?;
    let output = enrich_payroll_record(&record).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
