//! Borrower profile resolution.
//!
//! Profiles arrive as loosely-typed JSON objects from intake forms, payroll
//! enrichment or batch files. Each field is resolved independently: a
//! missing, null or non-numeric value falls back to the documented default
//! below instead of rejecting the whole profile.
//!
//! Fields consumed by the pricing and resale math are held as `Decimal`;
//! fields consumed only by the cash-flow simulator are `f64`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::Money;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_NET_MONTHLY_INCOME: f64 = 3200.0;
pub const DEFAULT_MONTHLY_OBLIGATIONS: f64 = 900.0;
pub const DEFAULT_INCOME_STABILITY_INDEX: f64 = 0.85;
pub const DEFAULT_CASH_RESERVES: f64 = 2500.0;
pub const DEFAULT_UNEXPECTED_EXPENSE_RATE: f64 = 0.08;
pub const DEFAULT_UNEXPECTED_EXPENSE_IMPACT: f64 = 750.0;
pub const DEFAULT_INCOME_SHOCK_RESERVE_RATIO: f64 = 0.2;
pub const DEFAULT_VEHICLE_PRICE: Money = dec!(30000);
pub const DEFAULT_DOWN_PAYMENT: Money = dec!(5000);
pub const DEFAULT_MILES_PER_YEAR: Decimal = dec!(12000);
pub const DEFAULT_REGION_STATE: &str = "TX";

const CREDIT_BAND_A_MIN_INCOME: f64 = 5000.0;
const CREDIT_BAND_B_MIN_INCOME: f64 = 3500.0;

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Fully-resolved borrower inputs. Immutable input to scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct BorrowerProfile {
    /// Take-home pay per month.
    pub net_monthly_income: f64,
    /// Existing recurring debt and living obligations per month.
    pub monthly_obligations: f64,
    /// 0 (erratic) to 1 (salaried) income regularity.
    pub income_stability_index: f64,
    /// Liquid savings at the start of the plan.
    pub cash_reserves: f64,
    /// Monthly probability of an unplanned expense.
    pub unexpected_expense_rate: f64,
    /// Typical size of an unplanned expense.
    pub unexpected_expense_impact: f64,
    /// Share of monthly income the borrower wants to keep as a cash buffer.
    pub income_shock_reserve_ratio: f64,
    pub vehicle_price: Money,
    pub down_payment: Money,
    pub miles_per_year: Decimal,
    /// Month the borrower expects to sell or return the vehicle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_month: Option<i32>,
    pub region_state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_band: Option<String>,
}

impl Default for BorrowerProfile {
    fn default() -> Self {
        Self {
            net_monthly_income: DEFAULT_NET_MONTHLY_INCOME,
            monthly_obligations: DEFAULT_MONTHLY_OBLIGATIONS,
            income_stability_index: DEFAULT_INCOME_STABILITY_INDEX,
            cash_reserves: DEFAULT_CASH_RESERVES,
            unexpected_expense_rate: DEFAULT_UNEXPECTED_EXPENSE_RATE,
            unexpected_expense_impact: DEFAULT_UNEXPECTED_EXPENSE_IMPACT,
            income_shock_reserve_ratio: DEFAULT_INCOME_SHOCK_RESERVE_RATIO,
            vehicle_price: DEFAULT_VEHICLE_PRICE,
            down_payment: DEFAULT_DOWN_PAYMENT,
            miles_per_year: DEFAULT_MILES_PER_YEAR,
            exit_month: None,
            region_state: DEFAULT_REGION_STATE.to_string(),
            credit_band: None,
        }
    }
}

impl BorrowerProfile {
    /// Resolve a raw field mapping, applying defaults field by field.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        Self {
            net_monthly_income: float_field(fields, "net_monthly_income")
                .unwrap_or(defaults.net_monthly_income),
            monthly_obligations: float_field(fields, "monthly_obligations")
                .unwrap_or(defaults.monthly_obligations),
            income_stability_index: float_field(fields, "income_stability_index")
                .unwrap_or(defaults.income_stability_index),
            cash_reserves: float_field(fields, "cash_reserves").unwrap_or(defaults.cash_reserves),
            unexpected_expense_rate: float_field(fields, "unexpected_expense_rate")
                .unwrap_or(defaults.unexpected_expense_rate),
            unexpected_expense_impact: float_field(fields, "unexpected_expense_impact")
                .unwrap_or(defaults.unexpected_expense_impact),
            income_shock_reserve_ratio: float_field(fields, "income_shock_reserve_ratio")
                .unwrap_or(defaults.income_shock_reserve_ratio),
            vehicle_price: decimal_field(fields, "vehicle_price")
                .unwrap_or(defaults.vehicle_price),
            down_payment: decimal_field(fields, "down_payment").unwrap_or(defaults.down_payment),
            miles_per_year: decimal_field(fields, "miles_per_year")
                .unwrap_or(defaults.miles_per_year),
            exit_month: integer_field(fields, "exit_month"),
            region_state: text_field(fields, "region_state").unwrap_or(defaults.region_state),
            credit_band: text_field(fields, "credit_band"),
        }
    }

    /// Exit month, defaulting to the plan term when the borrower gave none.
    pub fn exit_month_or(&self, term_months: i32) -> i32 {
        self.exit_month.unwrap_or(term_months)
    }

    /// Coarse band implied by take-home income alone.
    pub fn inferred_credit_band(&self) -> &'static str {
        if self.net_monthly_income >= CREDIT_BAND_A_MIN_INCOME {
            "A"
        } else if self.net_monthly_income >= CREDIT_BAND_B_MIN_INCOME {
            "B"
        } else {
            "C"
        }
    }
}

impl From<Map<String, Value>> for BorrowerProfile {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_fields(&fields)
    }
}

// ---------------------------------------------------------------------------
// Lenient field readers
// ---------------------------------------------------------------------------

fn float_field(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    let parsed = match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn decimal_field(fields: &Map<String, Value>, key: &str) -> Option<Decimal> {
    let text = match fields.get(key)? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn integer_field(fields: &Map<String, Value>, key: &str) -> Option<i32> {
    let value = float_field(fields, key)?;
    let truncated = value.trunc();
    if truncated < i32::MIN as f64 || truncated > i32::MAX as f64 {
        return None;
    }
    Some(truncated as i32)
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_empty_mapping_resolves_to_defaults() {
        let profile = BorrowerProfile::from_fields(&Map::new());
        assert_eq!(profile, BorrowerProfile::default());
        assert_eq!(profile.region_state, "TX");
        assert!(profile.exit_month.is_none());
    }

    #[test]
    fn test_non_numeric_fields_fall_back() {
        let profile = BorrowerProfile::from_fields(&fields(json!({
            "net_monthly_income": "lots",
            "vehicle_price": null,
            "cash_reserves": [1, 2],
            "exit_month": "soon",
        })));
        assert_eq!(profile.net_monthly_income, DEFAULT_NET_MONTHLY_INCOME);
        assert_eq!(profile.vehicle_price, DEFAULT_VEHICLE_PRICE);
        assert_eq!(profile.cash_reserves, DEFAULT_CASH_RESERVES);
        assert_eq!(profile.exit_month, None);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let profile = BorrowerProfile::from_fields(&fields(json!({
            "net_monthly_income": " 4100.5 ",
            "vehicle_price": "28999.99",
            "exit_month": "48",
        })));
        assert_eq!(profile.net_monthly_income, 4100.5);
        assert_eq!(profile.vehicle_price, dec!(28999.99));
        assert_eq!(profile.exit_month, Some(48));
    }

    #[test]
    fn test_fractional_exit_month_truncates() {
        let profile = BorrowerProfile::from_fields(&fields(json!({ "exit_month": 36.9 })));
        assert_eq!(profile.exit_month, Some(36));
        assert_eq!(profile.exit_month_or(60), 36);
        assert_eq!(BorrowerProfile::default().exit_month_or(60), 60);
    }

    #[test]
    fn test_deserialize_uses_lenient_resolution() {
        let profile: BorrowerProfile = serde_json::from_str(
            r#"{"credit_band": "B", "region_state": "CA", "down_payment": 2500}"#,
        )
        .unwrap();
        assert_eq!(profile.credit_band.as_deref(), Some("B"));
        assert_eq!(profile.region_state, "CA");
        assert_eq!(profile.down_payment, dec!(2500));
    }

    #[test]
    fn test_blank_credit_band_is_absent() {
        let profile = BorrowerProfile::from_fields(&fields(json!({ "credit_band": "  " })));
        assert!(profile.credit_band.is_none());
    }

    #[test]
    fn test_inferred_credit_band() {
        let mut profile = BorrowerProfile::default();
        assert_eq!(profile.inferred_credit_band(), "C");
        profile.net_monthly_income = 3500.0;
        assert_eq!(profile.inferred_credit_band(), "B");
        profile.net_monthly_income = 7200.0;
        assert_eq!(profile.inferred_credit_band(), "A");
    }
}
