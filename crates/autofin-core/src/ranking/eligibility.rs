use serde::{Deserialize, Serialize};

use crate::borrower::BorrowerProfile;
use crate::config::EligibilityConfig;
use crate::financing::FinancingPlan;

/// Why a catalog plan was not offered to a borrower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ineligibility {
    UnrecognizedType,
    MissingTerms,
    CreditBand,
}

impl std::fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Ineligibility::UnrecognizedType => "plan type is not supported",
            Ineligibility::MissingTerms => "plan does not declare both term_months and apr",
            Ineligibility::CreditBand => "borrower credit band is not eligible",
        };
        f.write_str(text)
    }
}

/// A plan removed by the eligibility filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanExclusion {
    pub plan_id: String,
    pub reason: Ineligibility,
}

/// Credit band the filter checks plans against.
///
/// A declared band always wins; otherwise the income-derived band is used
/// only when inference is switched on.
pub fn effective_credit_band<'a>(
    profile: &'a BorrowerProfile,
    config: &EligibilityConfig,
) -> Option<&'a str> {
    match profile.credit_band.as_deref() {
        Some(band) if !band.is_empty() => Some(band),
        _ if config.infer_missing_credit_band => Some(profile.inferred_credit_band()),
        _ => None,
    }
}

/// Check one plan against a borrower's credit band.
pub fn check_eligibility(plan: &FinancingPlan, credit_band: Option<&str>) -> Result<(), Ineligibility> {
    if let Some(band) = credit_band {
        if !plan.eligible_credit_bands.is_empty()
            && !plan.eligible_credit_bands.iter().any(|b| b == band)
        {
            return Err(Ineligibility::CreditBand);
        }
    }
    if !plan.plan_type.is_recognized() {
        return Err(Ineligibility::UnrecognizedType);
    }
    if plan.term_months.is_none() || plan.apr.is_none() {
        return Err(Ineligibility::MissingTerms);
    }
    Ok(())
}

/// Split a catalog into eligible plans and exclusions, preserving order.
pub fn partition_eligible<'a>(
    profile: &BorrowerProfile,
    plans: &'a [FinancingPlan],
    config: &EligibilityConfig,
) -> (Vec<&'a FinancingPlan>, Vec<PlanExclusion>) {
    let band = effective_credit_band(profile, config);
    let mut eligible = Vec::with_capacity(plans.len());
    let mut excluded = Vec::new();
    for plan in plans {
        match check_eligibility(plan, band) {
            Ok(()) => eligible.push(plan),
            Err(reason) => excluded.push(PlanExclusion {
                plan_id: plan.plan_id.clone(),
                reason,
            }),
        }
    }
    (eligible, excluded)
}

/// Plans from `plans` the borrower may be offered.
pub fn filter_eligible<'a>(
    profile: &BorrowerProfile,
    plans: &'a [FinancingPlan],
    config: &EligibilityConfig,
) -> Vec<&'a FinancingPlan> {
    partition_eligible(profile, plans, config).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::financing::PlanType;
    use rust_decimal_macros::dec;

    fn plan(id: &str, bands: &[&str]) -> FinancingPlan {
        FinancingPlan {
            plan_id: id.into(),
            plan_type: PlanType::RetailInstallment,
            term_months: Some(48),
            apr: Some(dec!(0.049)),
            eligible_credit_bands: bands.iter().map(|b| b.to_string()).collect(),
        }
    }

    fn borrower(band: Option<&str>) -> BorrowerProfile {
        BorrowerProfile {
            credit_band: band.map(str::to_string),
            ..BorrowerProfile::default()
        }
    }

    fn ids(plans: &[&FinancingPlan]) -> Vec<String> {
        plans.iter().map(|p| p.plan_id.clone()).collect()
    }

    #[test]
    fn test_band_membership() {
        let catalog = vec![plan("ab", &["A", "B"]), plan("c", &["C"]), plan("open", &[])];
        let cfg = EligibilityConfig::default();
        assert_eq!(ids(&filter_eligible(&borrower(Some("C")), &catalog, &cfg)), ["c", "open"]);
        assert_eq!(ids(&filter_eligible(&borrower(Some("A")), &catalog, &cfg)), ["ab", "open"]);
    }

    #[test]
    fn test_missing_band_sees_everything() {
        let catalog = vec![plan("ab", &["A", "B"]), plan("c", &["C"])];
        let eligible = filter_eligible(&borrower(None), &catalog, &EligibilityConfig::default());
        assert_eq!(eligible.len(), 2);
    }

    #[test]
    fn test_inferred_band_when_enabled() {
        let catalog = vec![plan("ab", &["A", "B"]), plan("c", &["C"])];
        let cfg = EligibilityConfig {
            infer_missing_credit_band: true,
        };
        // Default income 3200 infers band C.
        assert_eq!(ids(&filter_eligible(&borrower(None), &catalog, &cfg)), ["c"]);
        // A declared band is never overridden.
        assert_eq!(ids(&filter_eligible(&borrower(Some("B")), &catalog, &cfg)), ["ab"]);
    }

    #[test]
    fn test_unrecognized_type_and_missing_terms_excluded() {
        let mut lease_like = plan("other", &[]);
        lease_like.plan_type = PlanType::Unrecognized;
        let mut no_apr = plan("no_apr", &[]);
        no_apr.apr = None;
        let mut no_term = plan("no_term", &[]);
        no_term.term_months = None;
        let catalog = vec![lease_like, no_apr, no_term, plan("ok", &[])];

        let (eligible, excluded) =
            partition_eligible(&borrower(None), &catalog, &EligibilityConfig::default());
        assert_eq!(ids(&eligible), ["ok"]);
        assert_eq!(
            excluded.iter().map(|e| e.reason).collect::<Vec<_>>(),
            [
                Ineligibility::UnrecognizedType,
                Ineligibility::MissingTerms,
                Ineligibility::MissingTerms
            ]
        );
    }
}
