//! Borrower-side inputs: profile resolution and paystub enrichment.

#[cfg(feature = "payroll")]
pub mod payroll;
pub mod profile;

pub use profile::BorrowerProfile;
