//! Deterministic per-(borrower, plan) seed derivation.
//!
//! The seed is the first four bytes (big-endian) of a SHA-256 digest over a
//! canonical JSON record. The record is written byte-for-byte the way
//! Python's `json.dumps(record, sort_keys=True)` writes it, so seeds agree
//! with other implementations of the same pipeline:
//!
//! - keys sorted, `", "` and `": "` separators
//! - floats in shortest round-trip form, `.0` on integral values,
//!   exponents as `e+XX` / `e-XX` outside `[1e-4, 1e16)`
//! - strings escaped to pure ASCII (`\uXXXX`, lowercase hex)

use std::fmt::Write as _;

use sha2::{Digest, Sha256};

use crate::borrower::BorrowerProfile;
use crate::financing::FinancingPlan;

/// Canonical JSON text hashed into the simulation seed.
pub fn canonical_seed_record(profile: &BorrowerProfile, plan: &FinancingPlan) -> String {
    format!(
        "{{\"net_income\": {}, \"obligations\": {}, \"plan_id\": {}, \"stability\": {}, \"term\": {}}}",
        json_float(profile.net_monthly_income),
        json_float(profile.monthly_obligations),
        json_string(&plan.plan_id),
        json_float(profile.income_stability_index),
        plan.term_months.unwrap_or(0),
    )
}

/// Seed for the cash-flow simulator's random stream.
pub fn simulation_seed(profile: &BorrowerProfile, plan: &FinancingPlan) -> u64 {
    let digest = Sha256::digest(canonical_seed_record(profile, plan).as_bytes());
    u64::from(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
}

fn json_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let sci = format!("{value:e}");
        return match sci.split_once('e') {
            Some((mantissa, exp)) => {
                let exp: i32 = exp.parse().unwrap_or(0);
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            None => sci,
        };
    }

    let mut text = value.to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    text
}

fn json_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{:04x}", unit);
                }
            }
        }
    }
    out.push('"');
    out
}
