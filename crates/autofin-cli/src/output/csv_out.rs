use serde_json::Value;
use std::io;

use super::{cell, ranked_plans, scenario_sets, PLAN_COLUMNS};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// Rankings become one row per plan; scenario sets add a leading
/// `strategy` column; anything else is written as field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = value.get("result").unwrap_or(value);
    if let Some(plans) = ranked_plans(body) {
        let _ = wtr.write_record(PLAN_COLUMNS);
        write_plans(&mut wtr, None, &plans);
    } else if let Some(sets) = scenario_sets(body) {
        let _ = wtr.write_record(std::iter::once("strategy").chain(PLAN_COLUMNS));
        for (strategy, recommendation) in sets {
            if let Some(plans) = ranked_plans(recommendation) {
                write_plans(&mut wtr, Some(strategy), &plans);
            }
        }
    } else if let Some(Value::Array(labels)) = body.get("labels") {
        write_array(&mut wtr, labels);
    } else {
        match body {
            Value::Object(map) => {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &cell(val)]);
                }
            }
            Value::Array(arr) => write_array(&mut wtr, arr),
            other => {
                let _ = wtr.write_record([&cell(other)]);
            }
        }
    }

    let _ = wtr.flush();
}

fn write_plans(wtr: &mut StdoutWriter<'_>, strategy: Option<&str>, plans: &[&Value]) {
    for plan in plans {
        let row = PLAN_COLUMNS
            .iter()
            .map(|column| plan.get(*column).map(cell).unwrap_or_default());
        let _ = match strategy {
            Some(strategy) => wtr.write_record(std::iter::once(strategy.to_string()).chain(row)),
            None => wtr.write_record(row),
        };
    }
}

fn write_array(wtr: &mut StdoutWriter<'_>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&cell(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for item in arr {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(*h).map(cell).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&row);
    }
}
