pub mod file;
pub mod stdin;

use serde_json::Value;

use autofin_core::catalog::{fallback_plans, normalize_catalog};
use autofin_core::financing::{FinancingPlan, MarketContext};

/// JSON document from `--<flag> <file>` or, failing that, from piped stdin.
pub fn required_document(
    path: Option<&str>,
    flag: &str,
) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        file::read_json_value(path)
    } else if let Some(data) = stdin::read_stdin()? {
        Ok(data)
    } else {
        Err(format!("--{flag} <file.json> or stdin required").into())
    }
}

/// Market context from a file, or the built-in tax and fee tables.
pub fn context_or_default(path: Option<&str>) -> Result<MarketContext, Box<dyn std::error::Error>> {
    match path {
        Some(path) => file::read_json(path),
        None => Ok(MarketContext::default()),
    }
}

/// Catalog from a file in any supported schema, or the built-in catalog.
pub fn catalog_or_default(path: Option<&str>) -> Result<Vec<FinancingPlan>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(normalize_catalog(&file::read_json_value(path)?)),
        None => Ok(fallback_plans()),
    }
}
