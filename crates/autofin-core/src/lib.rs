pub mod borrower;
pub mod config;
pub mod error;
pub mod types;

#[cfg(feature = "financing")]
pub mod financing;

#[cfg(feature = "simulation")]
pub mod simulation;

#[cfg(feature = "scoring")]
pub mod scoring;

#[cfg(feature = "ranking")]
pub mod ranking;

#[cfg(feature = "catalog")]
pub mod catalog;

pub use borrower::BorrowerProfile;
pub use config::EngineConfig;
pub use error::AutoFinError;
pub use types::*;

/// Standard result type for all autofin computations
pub type AutoFinResult<T> = Result<T, AutoFinError>;
