use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Map, Value};

use crate::financing::{FinancingPlan, PlanType};

// ---------------------------------------------------------------------------
// Built-in catalog
// ---------------------------------------------------------------------------

/// Sample catalog used when no usable catalog is supplied.
pub fn fallback_plans() -> Vec<FinancingPlan> {
    fn entry(id: &str, plan_type: PlanType, term: i32, apr: Decimal, bands: &[&str]) -> FinancingPlan {
        FinancingPlan {
            plan_id: id.to_string(),
            plan_type,
            term_months: Some(term),
            apr: Some(apr),
            eligible_credit_bands: bands.iter().map(|b| b.to_string()).collect(),
        }
    }

    vec![
        entry("36m_2.9", PlanType::RetailInstallment, 36, dec!(0.029), &["A", "B"]),
        entry("48m_4.9", PlanType::RetailInstallment, 48, dec!(0.049), &["A", "B", "C"]),
        entry("60m_5.9", PlanType::RetailInstallment, 60, dec!(0.059), &["A", "B", "C"]),
        entry("72m_6.9", PlanType::RetailInstallment, 72, dec!(0.069), &["B", "C"]),
        entry("36m_lease", PlanType::ClosedEndLease, 36, dec!(0.029), &["A", "B"]),
        entry("48m_balloon", PlanType::BalloonPreferredOption, 48, dec!(0.049), &["A", "B"]),
    ]
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Turn any supported catalog document into a list of plans.
///
/// Accepted shapes:
///
/// - a plain array of plan objects
/// - `{"plans": [...]}` with at least one usable plan
/// - `{"plan_types": [...]}` describing APR ranges per credit band and the
///   typical terms of each product family
///
/// Plan objects without a `plan_id` are dropped. Any other document, or a
/// `plan_types` description that yields nothing, falls back to
/// [`fallback_plans`].
pub fn normalize_catalog(raw: &Value) -> Vec<FinancingPlan> {
    match raw {
        Value::Array(entries) => parse_entries(entries),
        Value::Object(fields) => {
            if let Some(Value::Array(entries)) = fields.get("plans") {
                let plans = parse_entries(entries);
                if !plans.is_empty() {
                    return plans;
                }
            }
            let generated = generate_from_plan_types(fields);
            if generated.is_empty() {
                tracing::warn!("catalog describes no plans, using built-in catalog");
                fallback_plans()
            } else {
                generated
            }
        }
        _ => fallback_plans(),
    }
}

fn parse_entries(entries: &[Value]) -> Vec<FinancingPlan> {
    entries
        .iter()
        .filter(|entry| entry.get("plan_id").is_some())
        .filter_map(|entry| match serde_json::from_value::<FinancingPlan>(entry.clone()) {
            Ok(plan) => Some(plan),
            Err(e) => {
                tracing::warn!(entry = %entry, error = %e, "skipping malformed catalog entry");
                None
            }
        })
        .collect()
}

fn generate_from_plan_types(fields: &Map<String, Value>) -> Vec<FinancingPlan> {
    let Some(Value::Array(plan_types)) = fields.get("plan_types") else {
        return Vec::new();
    };

    let mut generated = Vec::new();
    let mut counter = 1u32;
    for family in plan_types {
        let Some(apr_map) = family.get("apr_range_by_credit_band").and_then(Value::as_object)
        else {
            continue;
        };
        let terms: Vec<i64> = family
            .get("typical_terms_months")
            .and_then(Value::as_array)
            .map(|terms| terms.iter().filter_map(json_integer).collect())
            .unwrap_or_default();
        if apr_map.is_empty() || terms.is_empty() {
            continue;
        }
        let Some(apr) = mean_midpoint(apr_map) else {
            continue;
        };

        let type_name = family.get("type").and_then(Value::as_str);
        let plan_type = match type_name {
            Some(name) => serde_json::from_value(Value::String(name.to_string()))
                .unwrap_or(PlanType::Unrecognized),
            None => PlanType::RetailInstallment,
        };
        let eligible_credit_bands: Vec<String> = apr_map.keys().cloned().collect();

        for term in terms {
            let Ok(term_months) = i32::try_from(term) else {
                continue;
            };
            generated.push(FinancingPlan {
                plan_id: format!("{term}m_{}_{counter}", type_name.unwrap_or("plan")),
                plan_type,
                term_months: Some(term_months),
                apr: Some(apr),
                eligible_credit_bands: eligible_credit_bands.clone(),
            });
            counter += 1;
        }
    }
    generated
}

/// Mean of the `[low, high]` midpoints, rounded to 5 dp. Malformed ranges
/// are ignored.
fn mean_midpoint(apr_map: &Map<String, Value>) -> Option<Decimal> {
    let midpoints: Vec<Decimal> = apr_map
        .values()
        .filter_map(|range| match range.as_array().map(Vec::as_slice) {
            Some([low, high]) => Some((json_decimal(low)? + json_decimal(high)?) / dec!(2)),
            _ => None,
        })
        .collect();
    if midpoints.is_empty() {
        return None;
    }
    let total: Decimal = midpoints.iter().copied().sum();
    Some((total / Decimal::from(midpoints.len())).round_dp(5))
}

fn json_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn json_integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|v| v.is_finite()).map(|v| v.trunc() as i64))
}
