//! Deterministic financing math.
//!
//! - level-payment amortization
//! - out-the-door pricing against a market's tax and fee tables
//! - resale value under a depreciation schedule
//!
//! All arithmetic uses `rust_decimal::Decimal`.

pub mod amortization;
pub mod plan;
pub mod pricing;
pub mod resale;

pub use amortization::amortized_payment;
pub use plan::{FinancingPlan, PlanType};
pub use pricing::{financed_principal, MarketContext};
pub use resale::resale_value;
