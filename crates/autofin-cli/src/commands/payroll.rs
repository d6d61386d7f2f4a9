use clap::Args;
use serde_json::Value;

use autofin_core::borrower::payroll::enrich_payroll_record;

use crate::input;

/// Arguments for paystub feature derivation
#[derive(Args)]
pub struct PayrollArgs {
    /// Path to a paystub JSON object, or an array of them
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_payroll(args: PayrollArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let document = input::required_document(args.input.as_deref(), "input")?;
    match document {
        Value::Object(record) => Ok(Value::Object(enrich_payroll_record(&record)?)),
        Value::Array(records) => {
            let mut enriched = Vec::with_capacity(records.len());
            for (index, record) in records.iter().enumerate() {
                let Value::Object(record) = record else {
                    return Err(format!("payroll record {index} is not an object").into());
                };
                enriched.push(Value::Object(enrich_payroll_record(record)?));
            }
            Ok(Value::Array(enriched))
        }
        _ => Err("payroll input must be an object or an array of objects".into()),
    }
}
