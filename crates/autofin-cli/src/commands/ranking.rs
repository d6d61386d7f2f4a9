use clap::Args;
use serde_json::Value;

use autofin_core::financing::FinancingPlan;
use autofin_core::ranking::{label_profiles, recommend, recommend_scenarios, TradeoffStrategy};
use autofin_core::scoring::score_plan;
use autofin_core::{BorrowerProfile, EngineConfig};

use crate::input;

/// Arguments for scoring one plan
#[derive(Args)]
pub struct ScoreArgs {
    /// Path to borrower profile JSON
    #[arg(long)]
    pub profile: Option<String>,
    /// Path to financing plan JSON
    #[arg(long)]
    pub plan: String,
    /// Path to market context JSON
    #[arg(long)]
    pub context: Option<String>,
}

/// Arguments for ranking a catalog
#[derive(Args)]
pub struct RankArgs {
    /// Path to borrower profile JSON
    #[arg(long)]
    pub profile: Option<String>,
    /// Path to plan catalog JSON (list, {"plans"} or {"plan_types"})
    #[arg(long)]
    pub catalog: Option<String>,
    /// Path to market context JSON
    #[arg(long)]
    pub context: Option<String>,
    /// balanced, lowest_monthly, lowest_cost or lowest_risk
    #[arg(long, default_value = "balanced")]
    pub strategy: String,
    /// Number of plans to return
    #[arg(long, default_value_t = 3)]
    pub k: usize,
}

/// Arguments for ranking under every strategy
#[derive(Args)]
pub struct ScenariosArgs {
    /// Path to borrower profile JSON
    #[arg(long)]
    pub profile: Option<String>,
    /// Path to plan catalog JSON
    #[arg(long)]
    pub catalog: Option<String>,
    /// Path to market context JSON
    #[arg(long)]
    pub context: Option<String>,
    /// Number of plans per strategy
    #[arg(long, default_value_t = 3)]
    pub k: usize,
}

/// Arguments for batch labeling
#[derive(Args)]
pub struct LabelArgs {
    /// Path to a JSON array of borrower profiles
    #[arg(long)]
    pub input: Option<String>,
    /// Path to plan catalog JSON
    #[arg(long)]
    pub catalog: Option<String>,
    /// Path to market context JSON
    #[arg(long)]
    pub context: Option<String>,
}

fn read_profile(path: Option<&str>) -> Result<BorrowerProfile, Box<dyn std::error::Error>> {
    Ok(serde_json::from_value(input::required_document(path, "profile")?)?)
}

pub fn run_score(args: ScoreArgs, engine: &EngineConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let profile = read_profile(args.profile.as_deref())?;
    let plan: FinancingPlan = input::file::read_json(&args.plan)?;
    let context = input::context_or_default(args.context.as_deref())?;

    let scored = score_plan(&profile, &plan, &context, engine)?;
    Ok(serde_json::to_value(scored)?)
}

pub fn run_rank(args: RankArgs, engine: &EngineConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let strategy: TradeoffStrategy = args.strategy.parse()?;
    let profile = read_profile(args.profile.as_deref())?;
    let catalog = input::catalog_or_default(args.catalog.as_deref())?;
    let context = input::context_or_default(args.context.as_deref())?;

    let output = recommend(&profile, &catalog, &context, strategy, args.k, engine);
    Ok(serde_json::to_value(output)?)
}

pub fn run_scenarios(args: ScenariosArgs, engine: &EngineConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let profile = read_profile(args.profile.as_deref())?;
    let catalog = input::catalog_or_default(args.catalog.as_deref())?;
    let context = input::context_or_default(args.context.as_deref())?;

    let scenarios = recommend_scenarios(&profile, &catalog, &context, args.k, engine);
    Ok(serde_json::to_value(scenarios)?)
}

pub fn run_label(args: LabelArgs, engine: &EngineConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let profiles: Vec<BorrowerProfile> =
        serde_json::from_value(input::required_document(args.input.as_deref(), "input")?)?;
    let catalog = input::catalog_or_default(args.catalog.as_deref())?;
    let context = input::context_or_default(args.context.as_deref())?;

    let batch = label_profiles(&profiles, &catalog, &context, engine);
    Ok(serde_json::to_value(batch)?)
}
