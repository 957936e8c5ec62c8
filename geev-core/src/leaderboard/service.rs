//! Leaderboard orchestration: validate, aggregate, rank, paginate.

use std::sync::Arc;

use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use geev_sdk::objects::{self as api, LeaderboardPage, MAX_PAGE_SIZE};

use crate::store::{EventStore, IdentityProvider, StoreError};

use super::aggregate::{aggregate, DecayParams};
use super::cache::PageCache;
use super::rank::{rank, RankEntry};
use super::window::Window;

/// Errors surfaced to the caller of [`LeaderboardService::get_leaderboard`].
#[derive(Debug, Error)]
pub enum LeaderboardError {
    /// Caller error, rejected before any upstream read.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The event store or identity provider could not be reached.
    /// Retryable by the caller.
    #[error("leaderboard temporarily unavailable: {0}")]
    Unavailable(#[from] StoreError),
}

/// Engagement half-life overrides, one slot per window.
#[derive(Debug, Clone, Copy, Default)]
struct HalfLives {
    week: Option<Duration>,
    month: Option<Duration>,
    all_time: Option<Duration>,
}

/// Orchestrates one `(category, window)` ranking per request.
///
/// Stateless per call apart from the optional shared page cache, so
/// concurrent requests need no locking.
pub struct LeaderboardService<S, I> {
    events: S,
    identities: I,
    cache: Option<Arc<PageCache>>,
    half_lives: HalfLives,
}

impl<S: EventStore, I: IdentityProvider> LeaderboardService<S, I> {
    pub fn new(events: S, identities: I) -> Self {
        Self {
            events,
            identities,
            cache: None,
            half_lives: HalfLives::default(),
        }
    }

    /// Attach a shared read-through page cache.
    pub fn with_cache(mut self, cache: Arc<PageCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Override the engagement half-life for one window.
    pub fn with_half_life(mut self, window: api::Window, half_life: Duration) -> Self {
        match window {
            api::Window::Week => self.half_lives.week = Some(half_life),
            api::Window::Month => self.half_lives.month = Some(half_life),
            api::Window::AllTime => self.half_lives.all_time = Some(half_life),
        }
        self
    }

    fn decay_for(&self, window: Window) -> DecayParams {
        let override_half_life = match window {
            Window::Week => self.half_lives.week,
            Window::Month => self.half_lives.month,
            Window::AllTime => self.half_lives.all_time,
        };
        match override_half_life {
            Some(half_life) => DecayParams::from_half_life(half_life),
            None => DecayParams::for_window(window),
        }
    }

    /// Compute one leaderboard page against the current clock.
    pub async fn get_leaderboard(
        &self,
        category: api::Category,
        window: api::Window,
        page: u32,
        page_size: u32,
    ) -> Result<LeaderboardPage, LeaderboardError> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(LeaderboardError::InvalidArgument(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(category, window, page, page_size).await {
                return Ok((*hit).clone());
            }
        }

        let page_view = self
            .get_leaderboard_at(category, window, page, page_size, OffsetDateTime::now_utc())
            .await?;

        if let Some(cache) = &self.cache {
            cache
                .insert(category, window, page, page_size, Arc::new(page_view.clone()))
                .await;
        }

        Ok(page_view)
    }

    /// Compute one leaderboard page against an explicit snapshot instant.
    ///
    /// Window bounds and decay weights both key off `now`, so two calls
    /// with the same arguments and an unchanged event set return identical
    /// output. Bypasses the cache.
    pub async fn get_leaderboard_at(
        &self,
        category: api::Category,
        window: api::Window,
        page: u32,
        page_size: u32,
        now: OffsetDateTime,
    ) -> Result<LeaderboardPage, LeaderboardError> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(LeaderboardError::InvalidArgument(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }

        let core_window = Window::from(window);

        // The only suspension points are the two bulk upstream reads; all
        // computation after them is pure.
        let events = self.events.events_in_window(core_window, now).await?;
        let aggregation = aggregate(&events, core_window, now, self.decay_for(core_window));
        if aggregation.skipped_events > 0 {
            debug!(
                skipped = aggregation.skipped_events,
                window = core_window.as_str(),
                "skipped malformed contribution events"
            );
        }

        let user_ids: Vec<Uuid> = aggregation.totals.keys().copied().collect();
        let identity_map = self.identities.identities(&user_ids).await?;

        let ranking = rank(&aggregation.totals, category.into(), &identity_map);
        if ranking.dropped_identities > 0 {
            warn!(
                dropped = ranking.dropped_identities,
                category = category.as_str(),
                "dropped ranked users with missing identity records"
            );
        }

        Ok(paginate(category, window, ranking.entries, page, page_size, now))
    }
}

/// Slice the global ranking into one page view.
///
/// The full ranking is always computed first so rank numbers reflect global
/// position; a page past the end is a valid empty result, not an error.
fn paginate(
    category: api::Category,
    window: api::Window,
    entries: Vec<RankEntry>,
    page: u32,
    page_size: u32,
    now: OffsetDateTime,
) -> LeaderboardPage {
    let total_ranked = entries.len() as u64;
    let start = (page as usize).saturating_mul(page_size as usize);

    let page_entries = entries
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .map(to_api_entry)
        .collect();

    LeaderboardPage {
        category,
        window,
        entries: page_entries,
        total_ranked,
        page,
        page_size,
        generated_at: now.unix_timestamp(),
    }
}

/// Flatten a ranked entry into the wire shape.
fn to_api_entry(entry: RankEntry) -> api::RankEntry {
    api::RankEntry {
        rank: entry.rank,
        user_id: entry.user_id,
        display_name: entry.identity.display_name,
        handle: entry.identity.handle,
        avatar_ref: entry.identity.avatar_ref,
        verified: entry.identity.verified,
        metric_value: entry.metric_value,
        is_tied: entry.is_tied,
        badges_count: entry.badges_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    use async_trait::async_trait;
    use compact_str::CompactString;

    use crate::entities::contribution_events::ContributionEvent;
    use crate::entities::user_identities::UserIdentity;

    struct FixedEvents(Vec<ContributionEvent>);

    #[async_trait]
    impl EventStore for FixedEvents {
        async fn events_in_window(
            &self,
            window: Window,
            now: OffsetDateTime,
        ) -> Result<Vec<ContributionEvent>, StoreError> {
            Ok(self
                .0
                .iter()
                .filter(|e| window.contains(e.occurred_at, now))
                .cloned()
                .collect())
        }
    }

    struct FixedIdentities(HashMap<Uuid, UserIdentity>);

    #[async_trait]
    impl IdentityProvider for FixedIdentities {
        async fn identities(
            &self,
            user_ids: &[Uuid],
        ) -> Result<HashMap<Uuid, UserIdentity>, StoreError> {
            Ok(user_ids
                .iter()
                .filter_map(|id| self.0.get(id).map(|identity| (*id, identity.clone())))
                .collect())
        }
    }

    struct FailingEvents;

    #[async_trait]
    impl EventStore for FailingEvents {
        async fn events_in_window(
            &self,
            _window: Window,
            _now: OffsetDateTime,
        ) -> Result<Vec<ContributionEvent>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    fn at(unix: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(unix).unwrap()
    }

    fn user(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn identity(user_id: Uuid) -> UserIdentity {
        UserIdentity {
            user_id,
            display_name: CompactString::from(format!("User{}", user_id.as_u128())),
            handle: CompactString::from(format!("@user{}", user_id.as_u128())),
            avatar_ref: Some(format!("/avatars/{}.jpg", user_id.as_u128())),
            verified: user_id.as_u128() % 2 == 0,
        }
    }

    fn give(user_id: Uuid, occurred_at: OffsetDateTime) -> ContributionEvent {
        ContributionEvent {
            event_id: Uuid::new_v4(),
            user_id,
            kind: CompactString::from("give"),
            amount: 1.0,
            campaign_id: None,
            target_user_id: None,
            occurred_at,
        }
    }

    /// Seven users with 7, 6, ..., 1 gives each, all inside the week window.
    fn seven_user_fixture(now: OffsetDateTime) -> (FixedEvents, FixedIdentities) {
        let mut events = Vec::new();
        let mut identities = HashMap::new();
        for n in 1..=7u128 {
            let id = user(n);
            identities.insert(id, identity(id));
            for i in 0..(8 - n) as i64 {
                events.push(give(id, now - Duration::minutes(10 + i)));
            }
        }
        (FixedEvents(events), FixedIdentities(identities))
    }

    #[tokio::test]
    async fn test_pagination_slices_global_ranking() {
        let now = at(10_000_000);
        let (events, identities) = seven_user_fixture(now);
        let service = LeaderboardService::new(events, identities);

        let first = service
            .get_leaderboard_at(api::Category::TopGivers, api::Window::Week, 0, 3, now)
            .await
            .unwrap();
        assert_eq!(first.total_ranked, 7);
        let ranks: Vec<u32> = first.entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);

        let last = service
            .get_leaderboard_at(api::Category::TopGivers, api::Window::Week, 2, 3, now)
            .await
            .unwrap();
        assert_eq!(last.entries.len(), 1);
        assert_eq!(last.entries[0].rank, 7);

        let beyond = service
            .get_leaderboard_at(api::Category::TopGivers, api::Window::Week, 3, 3, now)
            .await
            .unwrap();
        assert!(beyond.entries.is_empty());
        assert_eq!(beyond.total_ranked, 7);
    }

    #[tokio::test]
    async fn test_all_pages_cover_every_ranked_user_once() {
        let now = at(10_000_000);
        let (events, identities) = seven_user_fixture(now);
        let service = LeaderboardService::new(events, identities);

        let mut seen = HashSet::new();
        for page in 0..4u32 {
            let view = service
                .get_leaderboard_at(api::Category::TopGivers, api::Window::Week, page, 3, now)
                .await
                .unwrap();
            for entry in view.entries {
                assert!(seen.insert(entry.user_id), "user appeared on two pages");
            }
        }
        assert_eq!(seen.len(), 7);
    }

    #[tokio::test]
    async fn test_idempotent_for_fixed_snapshot() {
        let now = at(10_000_000);
        let (events, identities) = seven_user_fixture(now);
        let service = LeaderboardService::new(events, identities);

        let a = service
            .get_leaderboard_at(api::Category::TopGivers, api::Window::Week, 0, 5, now)
            .await
            .unwrap();
        let b = service
            .get_leaderboard_at(api::Category::TopGivers, api::Window::Week, 0, 5, now)
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[tokio::test]
    async fn test_page_size_bounds_are_rejected() {
        let now = at(10_000_000);
        let service = LeaderboardService::new(
            FixedEvents(Vec::new()),
            FixedIdentities(HashMap::new()),
        );

        for bad in [0u32, MAX_PAGE_SIZE + 1] {
            let err = service
                .get_leaderboard_at(api::Category::Trending, api::Window::Month, 0, bad, now)
                .await
                .unwrap_err();
            assert!(matches!(err, LeaderboardError::InvalidArgument(_)));
        }
    }

    #[tokio::test]
    async fn test_upstream_failure_is_unavailable() {
        let service =
            LeaderboardService::new(FailingEvents, FixedIdentities(HashMap::new()));

        let err = service
            .get_leaderboard(api::Category::TopGivers, api::Window::AllTime, 0, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, LeaderboardError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_missing_identity_is_dropped_not_fatal() {
        let now = at(10_000_000);
        let unknown = user(99);
        let known = user(1);
        let events = FixedEvents(vec![
            give(known, now - Duration::hours(1)),
            give(unknown, now - Duration::hours(1)),
            give(unknown, now - Duration::hours(2)),
        ]);
        let identities = FixedIdentities([(known, identity(known))].into());
        let service = LeaderboardService::new(events, identities);

        let view = service
            .get_leaderboard_at(api::Category::TopGivers, api::Window::Week, 0, 10, now)
            .await
            .unwrap();
        assert_eq!(view.total_ranked, 1);
        assert_eq!(view.entries[0].user_id, known);
    }

    #[tokio::test]
    async fn test_empty_window_is_a_valid_empty_result() {
        let now = at(10_000_000);
        // All activity predates the week window.
        let events = FixedEvents(vec![give(user(1), now - Duration::days(20))]);
        let identities = FixedIdentities([(user(1), identity(user(1)))].into());
        let service = LeaderboardService::new(events, identities);

        let view = service
            .get_leaderboard_at(api::Category::TopGivers, api::Window::Week, 0, 10, now)
            .await
            .unwrap();
        assert!(view.entries.is_empty());
        assert_eq!(view.total_ranked, 0);
    }

    #[tokio::test]
    async fn test_alltime_ranking_invariant_under_event_reordering() {
        let now = at(10_000_000);
        let mut events = Vec::new();
        let mut identities = HashMap::new();
        for n in 1..=4u128 {
            let id = user(n);
            identities.insert(id, identity(id));
            for i in 0..n as i64 {
                events.push(give(id, now - Duration::days(i + 1)));
            }
        }

        let forward = LeaderboardService::new(
            FixedEvents(events.clone()),
            FixedIdentities(identities.clone()),
        );
        events.reverse();
        let backward =
            LeaderboardService::new(FixedEvents(events), FixedIdentities(identities));

        let a = forward
            .get_leaderboard_at(api::Category::TopGivers, api::Window::AllTime, 0, 10, now)
            .await
            .unwrap();
        let b = backward
            .get_leaderboard_at(api::Category::TopGivers, api::Window::AllTime, 0, 10, now)
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_requests() {
        let now = at(10_000_000);
        let (events, identities) = seven_user_fixture(now);
        let cache = Arc::new(PageCache::new(std::time::Duration::from_secs(60)));
        let service =
            LeaderboardService::new(events, identities).with_cache(Arc::clone(&cache));

        let first = service
            .get_leaderboard(api::Category::TopGivers, api::Window::AllTime, 0, 5)
            .await
            .unwrap();
        let cached = cache
            .get(api::Category::TopGivers, api::Window::AllTime, 0, 5)
            .await
            .unwrap();
        assert_eq!(*cached, first);

        let second = service
            .get_leaderboard(api::Category::TopGivers, api::Window::AllTime, 0, 5)
            .await
            .unwrap();
        // Identical snapshot proves the second response came from the cache.
        assert_eq!(first.generated_at, second.generated_at);
        assert_eq!(first, second);
    }
}
