use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use autofin_core::financing::pricing::all_in_price;
use autofin_core::financing::resale::mileage_penalty;
use autofin_core::financing::{amortized_payment, financed_principal, resale_value};
use autofin_core::{BorrowerProfile, EngineConfig};

use crate::input;

/// Arguments for a level-payment loan
#[derive(Args)]
pub struct AmortizeArgs {
    /// Amount financed
    #[arg(long)]
    pub principal: Decimal,
    /// Annual rate as a decimal (0.059 = 5.9%)
    #[arg(long)]
    pub apr: Decimal,
    /// Loan term in months
    #[arg(long, allow_negative_numbers = true)]
    pub term: i32,
}

/// Arguments for a resale estimate
#[derive(Args)]
pub struct ResaleArgs {
    /// Original vehicle price
    #[arg(long)]
    pub price: Decimal,
    /// Months of ownership before sale
    #[arg(long, allow_negative_numbers = true)]
    pub months: i32,
    /// Annual mileage
    #[arg(long, default_value = "12000")]
    pub miles: Decimal,
}

/// Arguments for out-the-door pricing
#[derive(Args)]
pub struct PriceArgs {
    /// Path to borrower profile JSON
    #[arg(long)]
    pub profile: Option<String>,
    /// Path to market context JSON (tax and fee tables)
    #[arg(long)]
    pub context: Option<String>,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment = amortized_payment(args.principal, args.apr, args.term)?;
    let total_paid = payment
        .checked_mul(Decimal::from(args.term))
        .ok_or("total paid exceeds the representable range")?;
    Ok(json!({
        "principal": args.principal,
        "apr": args.apr,
        "term_months": args.term,
        "monthly_payment": payment.round_dp(2),
        "total_paid": total_paid.round_dp(2),
        "total_interest": (total_paid - args.principal).round_dp(2),
    }))
}

pub fn run_resale(args: ResaleArgs, engine: &EngineConfig) -> Result<Value, Box<dyn std::error::Error>> {
    if args.price < Decimal::ZERO {
        return Err("--price cannot be negative".into());
    }
    let schedule = &engine.depreciation;
    let value = resale_value(args.price, args.months, args.miles, schedule);
    let retained = if args.price.is_zero() {
        Decimal::ZERO
    } else {
        (value / args.price).round_dp(4)
    };
    Ok(json!({
        "vehicle_price": args.price,
        "exit_months": args.months,
        "miles_per_year": args.miles,
        "mileage_penalty": mileage_penalty(args.miles, schedule).round_dp(4),
        "resale_value": value.round_dp(2),
        "retained_fraction": retained,
    }))
}

pub fn run_price(args: PriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let profile: BorrowerProfile =
        serde_json::from_value(input::required_document(args.profile.as_deref(), "profile")?)?;
    let context = input::context_or_default(args.context.as_deref())?;

    let tax_rate = context.sales_tax_rate(&profile.region_state);
    let fees = context.total_fees()?;
    Ok(json!({
        "vehicle_price": profile.vehicle_price,
        "region_state": profile.region_state,
        "sales_tax_rate": tax_rate,
        "fees_total": fees,
        "all_in_price": all_in_price(profile.vehicle_price, tax_rate, fees)?.round_dp(2),
        "down_payment": profile.down_payment,
        "principal": financed_principal(&profile, &context)?.round_dp(2),
    }))
}
