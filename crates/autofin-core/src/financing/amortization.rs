use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::AutoFinError;
use crate::types::{Money, Rate};
use crate::AutoFinResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Level monthly payment that retires `principal` over `term_months` at `apr`.
pub fn amortized_payment(principal: Money, apr: Rate, term_months: i32) -> AutoFinResult<Money> {
    if term_months <= 0 {
        return Err(AutoFinError::invalid(
            "term_months",
            format!("Term must be positive, got {term_months}"),
        ));
    }
    if principal < Decimal::ZERO {
        return Err(AutoFinError::invalid("principal", "Principal cannot be negative"));
    }
    if apr < Decimal::ZERO {
        return Err(AutoFinError::invalid("apr", "APR cannot be negative"));
    }

    let n = Decimal::from(term_months);
    if apr.is_zero() {
        return Ok(principal / n);
    }

    let monthly_rate = apr / MONTHS_PER_YEAR;
    // An overflowing growth factor means (1 + r)^-n is effectively zero.
    let denominator = match (Decimal::ONE + monthly_rate).checked_powi(i64::from(term_months)) {
        Some(growth) if !growth.is_zero() => Decimal::ONE - Decimal::ONE / growth,
        _ => Decimal::ONE,
    };
    if denominator.is_zero() {
        return Ok(principal / n);
    }

    principal
        .checked_mul(monthly_rate)
        .and_then(|interest| interest.checked_div(denominator))
        .ok_or_else(|| AutoFinError::overflow("principal"))
}
