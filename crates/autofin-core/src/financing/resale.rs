//! Vehicle resale (residual) value at the borrower's exit month.
//!
//! Value decays through the schedule's tiers in order, then at the tail
//! rate; each annual rate compounds monthly at `annual / 12`. High annual
//! mileage takes a further proportional haircut, and the result is floored
//! at a fixed share of the original price.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::config::DepreciationSchedule;
use crate::types::{Money, Rate};

/// Estimated resale value after `exit_months` of ownership.
pub fn resale_value(
    vehicle_price: Money,
    exit_months: i32,
    miles_per_year: Decimal,
    schedule: &DepreciationSchedule,
) -> Money {
    let months = exit_months.max(0) as u32;
    let mut remaining = vehicle_price;
    let mut elapsed = 0u32;

    for tier in &schedule.tiers {
        if elapsed >= months {
            break;
        }
        let apply = tier.months.min(months - elapsed);
        remaining = depreciate(remaining, tier.annual_rate, apply);
        elapsed += apply;
    }
    if elapsed < months {
        remaining = depreciate(remaining, schedule.tail_annual_rate, months - elapsed);
    }

    let penalty = mileage_penalty(miles_per_year, schedule);
    remaining *= (Decimal::ONE - penalty).max(Decimal::ZERO);

    remaining.max(vehicle_price * schedule.floor_fraction)
}

/// Share of value lost to mileage above the schedule's baseline.
pub fn mileage_penalty(miles_per_year: Decimal, schedule: &DepreciationSchedule) -> Rate {
    let excess = (miles_per_year - schedule.mileage_baseline).max(Decimal::ZERO);
    excess / schedule.mileage_step * schedule.penalty_per_step
}

fn depreciate(value: Money, annual_rate: Rate, months: u32) -> Money {
    if months == 0 || annual_rate.is_zero() {
        return value;
    }
    let keep = Decimal::ONE - annual_rate / dec!(12);
    let factor = keep
        .checked_powi(i64::from(months))
        .unwrap_or(Decimal::ZERO);
    value * factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> DepreciationSchedule {
        DepreciationSchedule::default()
    }

    #[test]
    fn test_zero_months_keeps_price() {
        assert_eq!(
            resale_value(dec!(30000), 0, dec!(12000), &schedule()),
            dec!(30000)
        );
    }

    #[test]
    fn test_negative_exit_treated_as_zero() {
        assert_eq!(
            resale_value(dec!(30000), -6, dec!(12000), &schedule()),
            dec!(30000)
        );
    }

    #[test]
    fn test_first_year_value() {
        // 30000 * (1 - 0.01)^12 ~ 26591.55
        let v = resale_value(dec!(30000), 12, dec!(12000), &schedule());
        assert!((v - dec!(26591.55)).abs() < dec!(0.01), "v={v}");
    }

    #[test]
    fn test_five_year_value() {
        let v = resale_value(dec!(30000), 60, dec!(12000), &schedule());
        assert!((v - dec!(20695.40)).abs() < dec!(0.01), "v={v}");
    }

    #[test]
    fn test_mileage_penalty_applied() {
        // 10000 excess miles = 2 steps = 2%
        let base = resale_value(dec!(30000), 36, dec!(12000), &schedule());
        let heavy = resale_value(dec!(30000), 36, dec!(22000), &schedule());
        assert!((heavy - base * dec!(0.98)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_low_mileage_not_rewarded() {
        let base = resale_value(dec!(30000), 24, dec!(12000), &schedule());
        let light = resale_value(dec!(30000), 24, dec!(4000), &schedule());
        assert_eq!(base, light);
    }

    #[test]
    fn test_floor_at_twenty_percent() {
        let v = resale_value(dec!(30000), 400, dec!(12000), &schedule());
        assert_eq!(v, dec!(6000));
        let extreme = resale_value(dec!(30000), 24, dec!(1_000_000), &schedule());
        assert_eq!(extreme, dec!(6000));
    }

    #[test]
    fn test_non_increasing_in_exit_month() {
        let mut previous = resale_value(dec!(41000), 0, dec!(15000), &schedule());
        for month in 1..=240 {
            let current = resale_value(dec!(41000), month, dec!(15000), &schedule());
            assert!(current <= previous, "month {month}: {current} > {previous}");
            previous = current;
        }
    }

    #[test]
    fn test_very_long_horizon_terminates() {
        let v = resale_value(dec!(30000), i32::MAX, dec!(12000), &schedule());
        assert_eq!(v, dec!(6000));
    }
}
