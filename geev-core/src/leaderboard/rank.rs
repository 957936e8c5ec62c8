//! Ordering and competition-rank assignment.

use std::cmp::Ordering;
use std::collections::HashMap;

use itertools::Itertools;
use uuid::Uuid;

use geev_sdk::objects::MetricValue;

use crate::entities::user_identities::UserIdentity;

use super::aggregate::MetricTotals;

/// Ranking dimension. Mirrors the API enum in `geev-sdk`; this engine-side
/// type knows which metric it projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    TopGivers,
    Giveaways,
    Requestors,
    Requests,
    Trending,
}

impl Category {
    /// The metric of `MetricTotals` this category ranks by.
    pub fn project(&self, totals: &MetricTotals) -> MetricValue {
        match self {
            Category::TopGivers => MetricValue::Count(totals.gives_count),
            Category::Giveaways => MetricValue::Count(totals.giveaways_count),
            Category::Requestors => MetricValue::Count(totals.requests_count),
            Category::Requests => MetricValue::Count(totals.requests_received_count),
            Category::Trending => MetricValue::Score(totals.engagement_score),
        }
    }
}

impl From<geev_sdk::objects::Category> for Category {
    fn from(value: geev_sdk::objects::Category) -> Self {
        match value {
            geev_sdk::objects::Category::TopGivers => Category::TopGivers,
            geev_sdk::objects::Category::Giveaways => Category::Giveaways,
            geev_sdk::objects::Category::Requestors => Category::Requestors,
            geev_sdk::objects::Category::Requests => Category::Requests,
            geev_sdk::objects::Category::Trending => Category::Trending,
        }
    }
}

impl From<Category> for geev_sdk::objects::Category {
    fn from(value: Category) -> Self {
        match value {
            Category::TopGivers => geev_sdk::objects::Category::TopGivers,
            Category::Giveaways => geev_sdk::objects::Category::Giveaways,
            Category::Requestors => geev_sdk::objects::Category::Requestors,
            Category::Requests => geev_sdk::objects::Category::Requests,
            Category::Trending => geev_sdk::objects::Category::Trending,
        }
    }
}

/// One ranked user before pagination. Transient view object, discarded
/// after response assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct RankEntry {
    /// 1-based competition rank.
    pub rank: u32,
    pub user_id: Uuid,
    pub identity: UserIdentity,
    pub metric_value: MetricValue,
    pub is_tied: bool,
    pub badges_count: u64,
}

/// The full ordering for one `(category, window)` pair, with diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    pub entries: Vec<RankEntry>,
    /// Users dropped because the identity provider had no record for them.
    pub dropped_identities: u64,
}

#[derive(Debug)]
struct ScoredUser {
    user_id: Uuid,
    value: MetricValue,
    badges_count: u64,
    identity: UserIdentity,
}

/// Total order over metric values. Count pairs compare exactly; anything
/// else falls back to IEEE total order on the float projection.
fn metric_cmp(a: &MetricValue, b: &MetricValue) -> Ordering {
    match (a, b) {
        (MetricValue::Count(x), MetricValue::Count(y)) => x.cmp(y),
        _ => a.as_f64().total_cmp(&b.as_f64()),
    }
}

/// Order users by the category metric, descending, and assign competition
/// ranks.
///
/// The secondary sort key is `user_id` ascending, so repeated calls with
/// identical inputs produce byte-identical orderings and pagination stays
/// stable across requests. Users missing from `identities` are dropped and
/// counted, never surfaced as an error.
pub fn rank(
    totals: &HashMap<Uuid, MetricTotals>,
    category: Category,
    identities: &HashMap<Uuid, UserIdentity>,
) -> Ranking {
    let mut dropped = 0u64;
    let mut scored: Vec<ScoredUser> = Vec::with_capacity(totals.len());

    for (&user_id, user_totals) in totals {
        let Some(identity) = identities.get(&user_id) else {
            dropped += 1;
            tracing::warn!(user_id = %user_id, "ranked user has no identity record, dropping entry");
            continue;
        };
        scored.push(ScoredUser {
            user_id,
            value: category.project(user_totals),
            badges_count: user_totals.badges_count,
            identity: identity.clone(),
        });
    }

    scored.sort_by(|a, b| metric_cmp(&b.value, &a.value).then_with(|| a.user_id.cmp(&b.user_id)));

    // Competition ranking: tied values share a rank, and the next distinct
    // value resumes at 1 + entries strictly above it.
    let mut entries = Vec::with_capacity(scored.len());
    let mut above = 0u32;
    for (_, group) in &scored.into_iter().chunk_by(|scored_user| scored_user.value) {
        let group: Vec<ScoredUser> = group.collect();
        let rank = above + 1;
        let is_tied = group.len() > 1;
        for scored_user in group {
            entries.push(RankEntry {
                rank,
                user_id: scored_user.user_id,
                identity: scored_user.identity,
                metric_value: scored_user.value,
                is_tied,
                badges_count: scored_user.badges_count,
            });
            above += 1;
        }
    }

    Ranking {
        entries,
        dropped_identities: dropped,
    }
}
