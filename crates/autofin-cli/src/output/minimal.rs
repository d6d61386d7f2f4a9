use serde_json::Value;

use super::{cell, ranked_plans, scenario_sets};

/// Print just the key answer value from the output.
///
/// Rankings print the top plan id, one line per strategy for scenario sets.
/// An empty ranking prints its status. Otherwise the first well-known metric
/// present is printed, falling back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(plans) = ranked_plans(result_obj) {
        if let Some(id) = plans.first().and_then(|top| top.get("plan_id")) {
            println!("{}", cell(id));
            return;
        }
    }
    if let Some(sets) = scenario_sets(result_obj) {
        for (strategy, recommendation) in sets {
            if let Some(id) = recommendation.get("top").and_then(|top| top.get("plan_id")) {
                println!("{strategy}: {}", cell(id));
            }
        }
        return;
    }
    if let Some(status) = result_obj.get("status").and_then(Value::as_str) {
        println!("{status}");
        return;
    }

    let priority_keys = [
        "best_plan_id",
        "score",
        "monthly_payment",
        "missed_payment_probability",
        "resale_value",
        "principal",
        "net_monthly_income",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", cell(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, cell(val));
            return;
        }
    }

    println!("{}", cell(result_obj));
}
