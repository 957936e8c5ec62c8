//! Pure fold of contribution events into per-user metric totals.
//!
//! The aggregator is a function of its arguments only: no I/O, no clock
//! reads. The caller snapshots `now` once so window bounds and decay
//! weights agree across the whole request (and across partitioned runs).

use std::collections::{HashMap, HashSet};

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::entities::contribution_events::{ContributionEvent, EventKind};

use super::window::Window;

/// Exponential decay parameters for the engagement score.
#[derive(Debug, Clone, Copy)]
pub struct DecayParams {
    lambda_per_sec: f64,
}

impl DecayParams {
    /// Build from a half-life: lambda = ln 2 / half-life seconds.
    pub fn from_half_life(half_life: Duration) -> Self {
        let secs = half_life.as_seconds_f64().max(1.0);
        Self {
            lambda_per_sec: std::f64::consts::LN_2 / secs,
        }
    }

    /// Default decay for the given window.
    pub fn for_window(window: Window) -> Self {
        Self::from_half_life(window.default_half_life())
    }

    /// Weight of a unit-amount event aged `age_secs`.
    pub fn weight(&self, age_secs: f64) -> f64 {
        (-self.lambda_per_sec * age_secs.max(0.0)).exp()
    }
}

/// Per-user totals for one window.
///
/// Always reproducible as a pure fold over the window's events; never
/// persisted by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTotals {
    pub gives_count: u64,
    /// Distinct giveaway campaigns, plus gives that carried no campaign.
    pub giveaways_count: u64,
    /// Requests made by the user.
    pub requests_count: u64,
    /// Requests directed at the user.
    pub requests_received_count: u64,
    pub badges_count: u64,
    /// Recency-weighted engagement, decayed relative to the shared `now`.
    pub engagement_score: f64,
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Users with at least one matching event. Absence means zero activity,
    /// not an explicit zero entry.
    pub totals: HashMap<Uuid, MetricTotals>,
    /// Events ignored because of an unknown kind or a bad amount.
    pub skipped_events: u64,
}

#[derive(Debug, Default)]
struct UserAccumulator {
    /// `giveaways_count` here holds only campaign-less gives; campaign
    /// dedup is resolved at finalization.
    totals: MetricTotals,
    campaigns: HashSet<Uuid>,
}

impl UserAccumulator {
    fn merge(&mut self, other: UserAccumulator) {
        self.totals.gives_count += other.totals.gives_count;
        self.totals.giveaways_count += other.totals.giveaways_count;
        self.totals.requests_count += other.totals.requests_count;
        self.totals.requests_received_count += other.totals.requests_received_count;
        self.totals.badges_count += other.totals.badges_count;
        self.totals.engagement_score += other.totals.engagement_score;
        self.campaigns.extend(other.campaigns);
    }
}

/// Partial fold over one slice of a window's events.
///
/// Merging happens before campaign dedup, so a campaign whose gives span
/// two partitions still counts once after [`PartialAggregation::finalize`].
/// All partitions must share the same `now` snapshot.
#[derive(Debug, Default)]
pub struct PartialAggregation {
    users: HashMap<Uuid, UserAccumulator>,
    skipped_events: u64,
}

impl PartialAggregation {
    /// Combine another partial into this one. Commutative and associative.
    pub fn merge(&mut self, other: PartialAggregation) {
        for (user_id, acc) in other.users {
            self.users.entry(user_id).or_default().merge(acc);
        }
        self.skipped_events += other.skipped_events;
    }

    /// Resolve campaign dedup into final per-user totals.
    pub fn finalize(self) -> Aggregation {
        let totals = self
            .users
            .into_iter()
            .map(|(user_id, acc)| {
                let mut totals = acc.totals;
                totals.giveaways_count += acc.campaigns.len() as u64;
                (user_id, totals)
            })
            .collect();

        Aggregation {
            totals,
            skipped_events: self.skipped_events,
        }
    }
}

/// Fold `events` into per-user totals for `window`.
pub fn aggregate(
    events: &[ContributionEvent],
    window: Window,
    now: OffsetDateTime,
    decay: DecayParams,
) -> Aggregation {
    aggregate_partial(events, window, now, decay).finalize()
}

/// Fold one partition of a window's events, deferring campaign dedup so
/// the result can be merged with other partitions.
pub fn aggregate_partial(
    events: &[ContributionEvent],
    window: Window,
    now: OffsetDateTime,
    decay: DecayParams,
) -> PartialAggregation {
    let mut users: HashMap<Uuid, UserAccumulator> = HashMap::new();
    let mut skipped = 0u64;

    for event in events {
        if !window.contains(event.occurred_at, now) {
            continue;
        }
        let Some(kind) = EventKind::parse(&event.kind) else {
            skipped += 1;
            continue;
        };
        if !event.amount.is_finite() || event.amount < 0.0 {
            skipped += 1;
            continue;
        }

        match kind {
            EventKind::Give => {
                let acc = users.entry(event.user_id).or_default();
                acc.totals.gives_count += 1;
                match event.campaign_id {
                    // Campaigns are deduplicated at finalization.
                    Some(campaign) => {
                        acc.campaigns.insert(campaign);
                    }
                    // No campaign reference: the give counts as its own
                    // giveaway (documented simplification).
                    None => acc.totals.giveaways_count += 1,
                }
            }
            EventKind::Request => {
                users.entry(event.user_id).or_default().totals.requests_count += 1;
                if let Some(target) = event.target_user_id {
                    users
                        .entry(target)
                        .or_default()
                        .totals
                        .requests_received_count += 1;
                }
            }
            EventKind::BadgeAward => {
                users.entry(event.user_id).or_default().totals.badges_count += 1;
            }
            EventKind::Engagement => {
                let age_secs = (now - event.occurred_at).as_seconds_f64();
                users.entry(event.user_id).or_default().totals.engagement_score +=
                    event.amount * decay.weight(age_secs);
            }
        }
    }

    PartialAggregation {
        users,
        skipped_events: skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;

    fn at(unix: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(unix).unwrap()
    }

    fn user(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn event(user_id: Uuid, kind: &str, occurred_at: OffsetDateTime) -> ContributionEvent {
        ContributionEvent {
            event_id: Uuid::from_u128(occurred_at.unix_timestamp() as u128),
            user_id,
            kind: CompactString::from(kind),
            amount: 1.0,
            campaign_id: None,
            target_user_id: None,
            occurred_at,
        }
    }

    #[test]
    fn test_window_edges_are_closed_open() {
        let now = at(1_000_000);
        let start = Window::Week.start(now).unwrap();
        let events = vec![
            event(user(1), "give", start), // exactly at start: included
            event(user(1), "give", now),   // exactly at end: excluded
        ];

        let agg = aggregate(&events, Window::Week, now, DecayParams::for_window(Window::Week));
        assert_eq!(agg.totals[&user(1)].gives_count, 1);
        assert_eq!(agg.skipped_events, 0);
    }

    #[test]
    fn test_unknown_kind_and_bad_amount_are_skipped_and_counted() {
        let now = at(1_000_000);
        let mut bad_amount = event(user(1), "engagement", at(999_000));
        bad_amount.amount = f64::NAN;
        let mut negative = event(user(1), "give", at(999_100));
        negative.amount = -3.0;
        let events = vec![
            event(user(1), "boost", at(999_200)),
            bad_amount,
            negative,
            event(user(1), "give", at(999_300)),
        ];

        let agg = aggregate(&events, Window::AllTime, now, DecayParams::for_window(Window::AllTime));
        assert_eq!(agg.skipped_events, 3);
        assert_eq!(agg.totals[&user(1)].gives_count, 1);
    }

    #[test]
    fn test_distinct_campaigns_drive_giveaways_count() {
        let now = at(1_000_000);
        let campaign_a = Uuid::from_u128(0xa);
        let campaign_b = Uuid::from_u128(0xb);

        let mut events = Vec::new();
        for (i, campaign) in [Some(campaign_a), Some(campaign_a), Some(campaign_b), None]
            .into_iter()
            .enumerate()
        {
            let mut e = event(user(1), "give", at(999_000 + i as i64));
            e.campaign_id = campaign;
            events.push(e);
        }

        let agg = aggregate(&events, Window::AllTime, now, DecayParams::for_window(Window::AllTime));
        let totals = &agg.totals[&user(1)];
        assert_eq!(totals.gives_count, 4);
        // Two distinct campaigns plus one campaign-less give.
        assert_eq!(totals.giveaways_count, 3);
    }

    #[test]
    fn test_requests_attribute_author_and_target() {
        let now = at(1_000_000);
        let mut request = event(user(1), "request", at(999_000));
        request.target_user_id = Some(user(2));

        let agg = aggregate(
            &[request],
            Window::AllTime,
            now,
            DecayParams::for_window(Window::AllTime),
        );
        assert_eq!(agg.totals[&user(1)].requests_count, 1);
        assert_eq!(agg.totals[&user(1)].requests_received_count, 0);
        assert_eq!(agg.totals[&user(2)].requests_received_count, 1);
        assert_eq!(agg.totals[&user(2)].requests_count, 0);
    }

    #[test]
    fn test_inactive_users_are_absent() {
        let now = at(1_000_000);
        let agg = aggregate(
            &[event(user(1), "give", at(999_000))],
            Window::AllTime,
            now,
            DecayParams::for_window(Window::AllTime),
        );
        assert!(!agg.totals.contains_key(&user(2)));
        assert_eq!(agg.totals.len(), 1);
    }

    #[test]
    fn test_engagement_decay_favors_recency() {
        let now = at(10_000_000);
        let mut old = event(user(1), "engagement", now - Duration::days(30));
        old.amount = 5.0;
        let mut fresh = event(user(2), "engagement", now - Duration::hours(1));
        fresh.amount = 5.0;

        let agg = aggregate(
            &[old, fresh],
            Window::AllTime,
            now,
            DecayParams::for_window(Window::AllTime),
        );
        let old_score = agg.totals[&user(1)].engagement_score;
        let fresh_score = agg.totals[&user(2)].engagement_score;
        assert!(fresh_score > old_score);
        // 30 days at a 7-day half-life: well under a sixteenth of the
        // original.
        assert!(old_score < 5.0 / 16.0);
        assert!(fresh_score > 4.5);
    }

    #[test]
    fn test_fold_is_order_independent() {
        let now = at(1_000_000);
        let mut events = vec![
            event(user(1), "give", at(900_000)),
            event(user(2), "badge_award", at(900_100)),
            event(user(1), "engagement", at(900_200)),
            event(user(2), "request", at(900_300)),
        ];
        let forward = aggregate(&events, Window::AllTime, now, DecayParams::for_window(Window::AllTime));
        events.reverse();
        let backward = aggregate(&events, Window::AllTime, now, DecayParams::for_window(Window::AllTime));

        assert_eq!(forward.totals, backward.totals);
        assert_eq!(forward.skipped_events, backward.skipped_events);
    }

    #[test]
    fn test_partitioned_merge_matches_single_pass() {
        let now = at(1_000_000);
        let campaign = Uuid::from_u128(0xc);
        let mut first_give = event(user(1), "give", at(900_000));
        first_give.campaign_id = Some(campaign);
        let mut second_give = event(user(1), "give", at(900_300));
        second_give.campaign_id = Some(campaign);
        // The shared campaign straddles the partition boundary.
        let events = vec![
            first_give,
            event(user(1), "badge_award", at(900_100)),
            event(user(1), "engagement", at(900_200)),
            second_give,
        ];
        let decay = DecayParams::for_window(Window::AllTime);

        let whole = aggregate(&events, Window::AllTime, now, decay);
        let mut merged = aggregate_partial(&events[..2], Window::AllTime, now, decay);
        merged.merge(aggregate_partial(&events[2..], Window::AllTime, now, decay));
        let merged = merged.finalize();

        assert_eq!(merged.totals[&user(1)].giveaways_count, 1);
        assert_eq!(merged.totals[&user(1)], whole.totals[&user(1)]);
        assert_eq!(merged.skipped_events, whole.skipped_events);
    }
}
