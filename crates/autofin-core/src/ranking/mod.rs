//! Eligibility filtering, ordering under tradeoff strategies, and the
//! recommendation entry points built on them.

pub mod eligibility;
pub mod ranker;
pub mod recommend;

pub use eligibility::{filter_eligible, Ineligibility, PlanExclusion};
pub use ranker::{
    rank_plans, sort_scored, PlanFailure, PlanOutcome, RankOutcome, Recommendation,
    TradeoffStrategy,
};
pub use recommend::{
    label_profiles, recommend, recommend_scenarios, LabelBatch, ScenarioOutcome, ScenarioSet,
};
