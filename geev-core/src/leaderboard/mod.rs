//! The leaderboard ranking and aggregation engine.
//!
//! Data flows one way per request: the service bulk-reads events, the
//! aggregator folds them into per-user totals, the ranker orders them, and
//! the service slices one page. No component mutates persisted state.

pub mod aggregate;
pub mod cache;
pub mod rank;
pub mod service;
pub mod window;

pub use aggregate::{
    Aggregation, DecayParams, MetricTotals, PartialAggregation, aggregate, aggregate_partial,
};
pub use cache::PageCache;
pub use rank::{Category, RankEntry, Ranking, rank};
pub use service::{LeaderboardError, LeaderboardService};
pub use window::Window;
