pub mod scorer;

pub use scorer::{score_plan, ScoreComponents, ScoredPlan};
