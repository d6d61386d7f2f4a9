//! Paystub-to-monthly income features.
//!
//! Converts a per-pay-period paystub record into the monthly figures the
//! borrower profile works in, plus an income-stability index implied by the
//! pay frequency.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AutoFinError;
use crate::types::{Money, Rate};
use crate::AutoFinResult;

/// How often the borrower is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayFrequency {
    Weekly,
    Biweekly,
    Semimonthly,
    Monthly,
}

impl PayFrequency {
    pub fn periods_per_month(self) -> Decimal {
        match self {
            PayFrequency::Weekly => dec!(4.33),
            PayFrequency::Biweekly => dec!(2.165),
            PayFrequency::Semimonthly => dec!(2.0),
            PayFrequency::Monthly => dec!(1.0),
        }
    }

    /// Fewer, larger paychecks smooth monthly cash flow.
    pub fn income_stability_index(self) -> Decimal {
        match self {
            PayFrequency::Weekly => dec!(0.85),
            PayFrequency::Biweekly => dec!(0.9),
            PayFrequency::Semimonthly => dec!(0.95),
            PayFrequency::Monthly => dec!(1.0),
        }
    }
}

impl std::str::FromStr for PayFrequency {
    type Err = AutoFinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(PayFrequency::Weekly),
            "biweekly" => Ok(PayFrequency::Biweekly),
            "semimonthly" => Ok(PayFrequency::Semimonthly),
            "monthly" => Ok(PayFrequency::Monthly),
            other => Err(AutoFinError::invalid(
                "pay_frequency",
                format!("unknown pay frequency {other:?}"),
            )),
        }
    }
}

/// Per-period paystub figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRecord {
    pub pay_frequency: PayFrequency,
    #[serde(default)]
    pub gross_pay_per_period: Money,
    #[serde(default)]
    pub net_pay_per_period: Money,
    #[serde(default)]
    pub total_taxes_withheld_per_period: Money,
    #[serde(default)]
    pub total_deductions_per_period: Money,
}

/// Monthly features derived from a paystub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollFeatures {
    pub periods_per_month: Decimal,
    pub gross_monthly_income: Money,
    pub net_monthly_income: Money,
    pub effective_tax_rate: Rate,
    pub deduction_rate: Rate,
    pub income_stability_index: Decimal,
}

/// Derive monthly income features from one paystub record.
pub fn derive_payroll_features(record: &PayrollRecord) -> PayrollFeatures {
    let periods = record.pay_frequency.periods_per_month();
    let gross = record.gross_pay_per_period;

    let (effective_tax_rate, deduction_rate) = if gross > Decimal::ZERO {
        (
            (record.total_taxes_withheld_per_period / gross).round_dp(4),
            (record.total_deductions_per_period / gross).round_dp(4),
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    PayrollFeatures {
        periods_per_month: periods,
        gross_monthly_income: (gross * periods).round_dp(2),
        net_monthly_income: (record.net_pay_per_period * periods).round_dp(2),
        effective_tax_rate,
        deduction_rate,
        income_stability_index: record.pay_frequency.income_stability_index(),
    }
}

/// Merge derived features into a raw paystub record, keeping every original
/// key. Derived keys overwrite same-named originals.
pub fn enrich_payroll_record(record: &Map<String, Value>) -> AutoFinResult<Map<String, Value>> {
    let frequency = match record.get("pay_frequency") {
        Some(Value::String(s)) => s.parse::<PayFrequency>()?,
        other => {
            return Err(AutoFinError::invalid(
                "pay_frequency",
                format!("unknown pay frequency {other:?}"),
            ))
        }
    };

    let typed = PayrollRecord {
        pay_frequency: frequency,
        gross_pay_per_period: money_field(record, "gross_pay_per_period")?,
        net_pay_per_period: money_field(record, "net_pay_per_period")?,
        total_taxes_withheld_per_period: money_field(record, "total_taxes_withheld_per_period")?,
        total_deductions_per_period: money_field(record, "total_deductions_per_period")?,
    };
    let features = derive_payroll_features(&typed);

    let mut enriched = record.clone();
    let derived = [
        ("periods_per_month", features.periods_per_month),
        ("gross_monthly_income", features.gross_monthly_income),
        ("net_monthly_income", features.net_monthly_income),
        ("effective_tax_rate", features.effective_tax_rate),
        ("deduction_rate", features.deduction_rate),
        ("income_stability_index", features.income_stability_index),
    ];
    for (key, value) in derived {
        enriched.insert(key.to_string(), decimal_to_json(value));
    }
    Ok(enriched)
}

fn money_field(record: &Map<String, Value>, key: &str) -> AutoFinResult<Money> {
    let parsed = match record.get(key) {
        None | Some(Value::Null) => return Ok(Decimal::ZERO),
        Some(Value::Number(n)) => {
            let text = n.to_string();
            text.parse::<Decimal>()
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Some(Value::String(s)) => s.trim().parse::<Decimal>().ok(),
        Some(_) => None,
    };
    parsed.ok_or_else(|| AutoFinError::invalid(key, "must be numeric"))
}

/// Enriched records feed profile resolution, which reads plain JSON numbers.
fn decimal_to_json(value: Decimal) -> Value {
    value
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
