pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Columns shown for each plan when a ranking is rendered as rows.
pub const PLAN_COLUMNS: [&str; 8] = [
    "plan_id",
    "monthly_payment",
    "effective_cost",
    "dti",
    "score",
    "safety_score",
    "missed_payment_probability",
    "p5_final_reserve",
];

/// Top plan followed by alternatives, if `value` is a ranked recommendation.
pub fn ranked_plans(value: &Value) -> Option<Vec<&Value>> {
    let top = value.get("top")?;
    let mut plans = vec![top];
    if let Some(Value::Array(alternatives)) = value.get("alternatives") {
        plans.extend(alternatives.iter());
    }
    Some(plans)
}

/// Strategy and recommendation pairs, if `value` is a ranked scenario set.
pub fn scenario_sets(value: &Value) -> Option<Vec<(&str, &Value)>> {
    let sets: Vec<(&str, &Value)> = value
        .as_object()?
        .iter()
        .filter(|(key, _)| key.as_str() != "status")
        .map(|(key, recommendation)| (key.as_str(), recommendation))
        .collect();
    let is_set = !sets.is_empty() && sets.iter().all(|(_, r)| r.get("top").is_some());
    is_set.then_some(sets)
}

/// Render a scalar for a table cell or CSV field.
pub fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(cell).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
