use serde::{Deserialize, Serialize};

use crate::types::Rate;

/// Term assumed for a plan that declares none.
pub const DEFAULT_TERM_MONTHS: i32 = 36;

/// Financing product family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    RetailInstallment,
    ClosedEndLease,
    BalloonPreferredOption,
    /// Any product family the engine does not score.
    #[default]
    #[serde(other)]
    Unrecognized,
}

impl PlanType {
    pub fn is_recognized(self) -> bool {
        !matches!(self, PlanType::Unrecognized)
    }
}

/// One entry of a financing catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingPlan {
    pub plan_id: String,
    #[serde(rename = "type", default)]
    pub plan_type: PlanType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_months: Option<i32>,
    /// Annual percentage rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apr: Option<Rate>,
    /// Empty means the plan is open to every credit band.
    #[serde(default)]
    pub eligible_credit_bands: Vec<String>,
}

impl FinancingPlan {
    pub fn term_or_default(&self) -> i32 {
        self.term_months.unwrap_or(DEFAULT_TERM_MONTHS)
    }

    pub fn apr_or_zero(&self) -> Rate {
        self.apr.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deserialize_catalog_entry() {
        let plan: FinancingPlan = serde_json::from_str(
            r#"{"plan_id": "60m_5.9", "type": "retail_installment", "term_months": 60,
                "apr": 0.059, "eligible_credit_bands": ["A", "B", "C"]}"#,
        )
        .unwrap();
        assert_eq!(plan.plan_type, PlanType::RetailInstallment);
        assert_eq!(plan.term_months, Some(60));
        assert_eq!(plan.apr, Some(dec!(0.059)));
        assert_eq!(plan.eligible_credit_bands.len(), 3);
    }

    #[test]
    fn test_unknown_type_is_unrecognized() {
        let plan: FinancingPlan =
            serde_json::from_str(r#"{"plan_id": "x", "type": "subscription"}"#).unwrap();
        assert_eq!(plan.plan_type, PlanType::Unrecognized);
        assert!(!plan.plan_type.is_recognized());
    }

    #[test]
    fn test_missing_fields_default() {
        let plan: FinancingPlan = serde_json::from_str(r#"{"plan_id": "bare"}"#).unwrap();
        assert_eq!(plan.plan_type, PlanType::Unrecognized);
        assert_eq!(plan.term_or_default(), DEFAULT_TERM_MONTHS);
        assert_eq!(plan.apr_or_zero(), dec!(0));
        assert!(plan.eligible_credit_bands.is_empty());
    }
}
