//! Leaderboard API request and response types.
//!
//! These types are shared between the server handlers and the SDK client.
//! Wire names (`topgivers`, `alltime`, ...) match the query-string literals
//! the frontend already sends.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest page the API will serve in one response.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size used when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Ranking dimension selecting which metric drives the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Most `give` events.
    TopGivers,
    /// Most distinct giveaway campaigns.
    Giveaways,
    /// Most requests made.
    Requestors,
    /// Most requests received.
    Requests,
    /// Highest recency-weighted engagement score.
    Trending,
}

impl Category {
    /// Wire name used in query strings (`?category=topgivers`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TopGivers => "topgivers",
            Category::Giveaways => "giveaways",
            Category::Requestors => "requestors",
            Category::Requests => "requests",
            Category::Trending => "trending",
        }
    }

    /// Human-readable tab label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::TopGivers => "Top Givers",
            Category::Giveaways => "Giveaways",
            Category::Requestors => "Requestors",
            Category::Requests => "Requests",
            Category::Trending => "Trending",
        }
    }

    pub fn all() -> [Category; 5] {
        [
            Category::TopGivers,
            Category::Giveaways,
            Category::Requestors,
            Category::Requests,
            Category::Trending,
        ]
    }
}

/// Time window scoping the aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// Trailing 7 days.
    Week,
    /// Trailing 30 days.
    Month,
    /// No lower bound.
    AllTime,
}

impl Window {
    /// Wire name used in query strings (`?window=alltime`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Window::Week => "week",
            Window::Month => "month",
            Window::AllTime => "alltime",
        }
    }

    /// Human-readable filter label.
    pub fn label(&self) -> &'static str {
        match self {
            Window::Week => "This Week",
            Window::Month => "This Month",
            Window::AllTime => "All Time",
        }
    }

    pub fn all() -> [Window; 3] {
        [Window::Week, Window::Month, Window::AllTime]
    }
}

/// Metric projected for a ranking entry.
///
/// Count categories stay exact integers so ties compare exactly; trending
/// carries the decayed float score. Serializes as a bare JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(u64),
    Score(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Count(n) => *n as f64,
            MetricValue::Score(s) => *s,
        }
    }
}

/// One row of a leaderboard page.
///
/// Identity fields are flattened so a rank card renders without a second
/// lookup; `badges_count` feeds the badge annotation next to each entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    /// 1-based competition rank. Tied entries share a rank number.
    pub rank: u32,
    pub user_id: Uuid,
    pub display_name: CompactString,
    pub handle: CompactString,
    pub avatar_ref: Option<String>,
    pub verified: bool,
    pub metric_value: MetricValue,
    pub is_tied: bool,
    pub badges_count: u64,
}

/// One page of a ranking, sliced from the globally computed ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardPage {
    pub category: Category,
    pub window: Window,
    pub entries: Vec<RankEntry>,
    /// Number of ranked users across all pages.
    pub total_ranked: u64,
    pub page: u32,
    pub page_size: u32,
    /// Unix timestamp of the aggregation snapshot.
    pub generated_at: i64,
}

/// Query-string parameters for `GET /api/v1/leaderboard`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    pub category: Category,
    pub window: Window,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// One entry of the category listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub category: Category,
    pub label: String,
}

/// One entry of the window listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub window: Window,
    pub label: String,
}

/// Response of `GET /api/v1/leaderboard/categories`: everything a frontend
/// needs to render the tab row and time filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardOptions {
    pub categories: Vec<CategoryInfo>,
    pub windows: Vec<WindowInfo>,
}
