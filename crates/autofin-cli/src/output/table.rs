use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, ranked_plans, scenario_sets, PLAN_COLUMNS};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    // Envelope: render the result, then warnings and methodology.
    if let Some(result) = value.get("result") {
        print_section(result);
        print_envelope_notes(value);
        return;
    }
    print_section(value);
}

fn print_section(value: &Value) {
    if let Some(plans) = ranked_plans(value) {
        print_plan_rows(&plans);
        return;
    }
    if let Some(sets) = scenario_sets(value) {
        for (strategy, recommendation) in sets {
            println!("\n{strategy}");
            if let Some(plans) = ranked_plans(recommendation) {
                print_plan_rows(&plans);
            }
        }
        return;
    }
    match value {
        Value::Object(map) => match map.get("labels") {
            Some(Value::Array(labels)) => {
                print_rows(labels, &["profile_index", "best_plan_id", "top3_plan_ids"])
            }
            _ => print_fields(map),
        },
        Value::Array(rows) => print_array(rows),
        other => println!("{}", cell(other)),
    }
}

fn print_plan_rows(plans: &[&Value]) {
    let mut builder = Builder::default();
    builder.push_record(PLAN_COLUMNS);
    for plan in plans {
        builder.push_record(
            PLAN_COLUMNS
                .iter()
                .map(|column| plan.get(*column).map(cell).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value], columns: &[&str]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(columns.iter().copied());
    for row in rows {
        builder.push_record(
            columns
                .iter()
                .map(|column| row.get(*column).map(cell).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), cell(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array(rows: &[Value]) {
    match rows.first() {
        None => println!("(empty)"),
        Some(Value::Object(first)) => {
            let columns: Vec<&str> = first.keys().map(String::as_str).collect();
            print_rows(rows, &columns);
        }
        Some(_) => {
            for item in rows {
                println!("{}", cell(item));
            }
        }
    }
}

fn print_envelope_notes(envelope: &Value) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
