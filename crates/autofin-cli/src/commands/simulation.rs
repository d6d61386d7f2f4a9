use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use autofin_core::financing::{amortized_payment, financed_principal, FinancingPlan};
use autofin_core::simulation::{simulate_cash_flow, simulation_seed};
use autofin_core::types::{with_metadata, MIXED_PRECISION};
use autofin_core::{BorrowerProfile, EngineConfig};

use crate::input;

/// Arguments for a single cash-flow simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to borrower profile JSON
    #[arg(long)]
    pub profile: Option<String>,
    /// Path to financing plan JSON
    #[arg(long)]
    pub plan: String,
    /// Path to market context JSON
    #[arg(long)]
    pub context: Option<String>,
    /// Monthly payment to carry; defaults to the plan's amortized payment
    #[arg(long)]
    pub payment: Option<Decimal>,
    /// Number of trials (never fewer than the configured minimum)
    #[arg(long)]
    pub runs: Option<u32>,
}

pub fn run_simulate(args: SimulateArgs, engine: &EngineConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let start = std::time::Instant::now();

    let profile: BorrowerProfile =
        serde_json::from_value(input::required_document(args.profile.as_deref(), "profile")?)?;
    let plan: FinancingPlan = input::file::read_json(&args.plan)?;
    let context = input::context_or_default(args.context.as_deref())?;

    let payment = match args.payment {
        Some(payment) => payment,
        None => amortized_payment(
            financed_principal(&profile, &context)?,
            plan.apr_or_zero(),
            plan.term_or_default(),
        )?,
    };

    let result = simulate_cash_flow(
        &profile,
        &plan,
        payment,
        &context,
        args.runs,
        &engine.simulation,
    )?;

    let output = with_metadata(
        "Seeded Monte Carlo cash-flow simulation",
        &serde_json::json!({
            "plan_id": plan.plan_id,
            "monthly_payment": payment.round_dp(2),
            "seed": simulation_seed(&profile, &plan),
            "requested_runs": args.runs,
        }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        MIXED_PRECISION,
        result,
    );
    Ok(serde_json::to_value(output)?)
}
