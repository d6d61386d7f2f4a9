//! Financing catalog loading.

pub mod normalize;

pub use normalize::{fallback_plans, normalize_catalog};
