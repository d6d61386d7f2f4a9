//! Out-the-door pricing: regional sales tax, flat dealer/registration fees,
//! and the principal left to finance after the down payment.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::borrower::BorrowerProfile;
use crate::error::AutoFinError;
use crate::types::{Money, Rate};
use crate::AutoFinResult;

/// Tax and fee tables shared by every scoring call in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    #[serde(default, alias = "sales_tax_by_state")]
    pub sales_tax_by_region: BTreeMap<String, Rate>,
    /// Flat fees by name (documentation, title/tag/license, ...).
    #[serde(default)]
    pub fees: BTreeMap<String, Money>,
}

impl Default for MarketContext {
    fn default() -> Self {
        let sales_tax_by_region = [
            ("TX", dec!(0.0625)),
            ("CA", dec!(0.085)),
            ("FL", dec!(0.06)),
            ("NY", dec!(0.08875)),
        ]
        .into_iter()
        .map(|(region, rate)| (region.to_string(), rate))
        .collect();
        let fees = [("doc", dec!(200)), ("ttl", dec!(350))]
            .into_iter()
            .map(|(name, amount)| (name.to_string(), amount))
            .collect();
        Self {
            sales_tax_by_region,
            fees,
        }
    }
}

impl MarketContext {
    /// Sales tax for a region; regions missing from the table are untaxed.
    pub fn sales_tax_rate(&self, region: &str) -> Rate {
        self.sales_tax_by_region
            .get(region)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total_fees(&self) -> AutoFinResult<Money> {
        self.fees.values().try_fold(Decimal::ZERO, |total, fee| {
            total.checked_add(*fee).ok_or_else(|| AutoFinError::overflow("fees"))
        })
    }
}

/// Vehicle price grossed up by sales tax, plus flat fees.
pub fn all_in_price(
    vehicle_price: Money,
    sales_tax_rate: Rate,
    fees_total: Money,
) -> AutoFinResult<Money> {
    Decimal::ONE
        .checked_add(sales_tax_rate)
        .and_then(|gross_up| vehicle_price.checked_mul(gross_up))
        .and_then(|taxed| taxed.checked_add(fees_total))
        .ok_or_else(|| AutoFinError::overflow("vehicle_price"))
}

/// Amount to finance for this borrower, never negative.
pub fn financed_principal(
    profile: &BorrowerProfile,
    context: &MarketContext,
) -> AutoFinResult<Money> {
    let price = all_in_price(
        profile.vehicle_price,
        context.sales_tax_rate(&profile.region_state),
        context.total_fees()?,
    )?;
    let principal = price
        .checked_sub(profile.down_payment)
        .ok_or_else(|| AutoFinError::overflow("down_payment"))?;
    Ok(principal.max(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context_principal() {
        // 30000 * 1.0625 + 550 - 5000
        let principal =
            financed_principal(&BorrowerProfile::default(), &MarketContext::default()).unwrap();
        assert_eq!(principal, dec!(27425));
    }

    #[test]
    fn test_unknown_region_untaxed() {
        let mut profile = BorrowerProfile::default();
        profile.region_state = "ZZ".into();
        let principal = financed_principal(&profile, &MarketContext::default()).unwrap();
        assert_eq!(principal, dec!(25550));
    }

    #[test]
    fn test_large_down_payment_floors_at_zero() {
        let mut profile = BorrowerProfile::default();
        profile.down_payment = dec!(50000);
        assert_eq!(
            financed_principal(&profile, &MarketContext::default()).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_state_alias_accepted() {
        let ctx: MarketContext = serde_json::from_str(
            r#"{"sales_tax_by_state": {"WA": 0.065}, "fees": {"doc": 150}}"#,
        )
        .unwrap();
        assert_eq!(ctx.sales_tax_rate("WA"), dec!(0.065));
        assert_eq!(ctx.total_fees().unwrap(), dec!(150));
    }

    #[test]
    fn test_all_in_price() {
        assert_eq!(
            all_in_price(dec!(20000), dec!(0.08), dec!(500)).unwrap(),
            dec!(22100)
        );
    }

    #[test]
    fn test_price_overflow_is_invalid_input() {
        let err = all_in_price(Decimal::MAX, dec!(0.0625), dec!(550)).unwrap_err();
        assert!(matches!(err, AutoFinError::InvalidInput { ref field, .. } if field == "vehicle_price"));
    }

    #[test]
    fn test_down_payment_overflow_is_invalid_input() {
        let mut profile = BorrowerProfile::default();
        profile.vehicle_price = dec!(70000000000000000000000000000);
        profile.down_payment = dec!(-70000000000000000000000000000);
        let err = financed_principal(&profile, &MarketContext::default()).unwrap_err();
        assert!(matches!(err, AutoFinError::InvalidInput { ref field, .. } if field == "down_payment"));
    }

    #[test]
    fn test_fee_overflow_is_invalid_input() {
        let mut ctx = MarketContext::default();
        ctx.fees.insert("a".into(), Decimal::MAX);
        ctx.fees.insert("b".into(), Decimal::MAX);
        assert!(ctx.total_fees().is_err());
    }
}
