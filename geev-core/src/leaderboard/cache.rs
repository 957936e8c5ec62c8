//! Read-through page cache.
//!
//! Entries are immutable snapshots behind `Arc`, replaced wholesale on
//! refresh, so a reader never observes a partially updated page. Caching is
//! an optimization only; correctness never depends on it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use geev_sdk::objects::{Category, LeaderboardPage, Window};

type CacheKey = (Category, Window, u32, u32);

/// TTL cache of rendered leaderboard pages keyed by
/// `(category, window, page, page_size)`.
pub struct PageCache {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, (Instant, Arc<LeaderboardPage>)>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached page if it is still fresh.
    pub async fn get(
        &self,
        category: Category,
        window: Window,
        page: u32,
        page_size: u32,
    ) -> Option<Arc<LeaderboardPage>> {
        let entries = self.entries.read().await;
        let (inserted_at, page_view) = entries.get(&(category, window, page, page_size))?;
        if inserted_at.elapsed() > self.ttl {
            return None;
        }
        Some(Arc::clone(page_view))
    }

    /// Store a freshly rendered page, evicting anything already expired.
    pub async fn insert(
        &self,
        category: Category,
        window: Window,
        page: u32,
        page_size: u32,
        page_view: Arc<LeaderboardPage>,
    ) {
        let ttl = self.ttl;
        let mut entries = self.entries.write().await;
        entries.retain(|_, (inserted_at, _)| inserted_at.elapsed() <= ttl);
        entries.insert((category, window, page, page_size), (Instant::now(), page_view));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geev_sdk::objects::{Category, Window};

    fn empty_page(page: u32) -> Arc<LeaderboardPage> {
        Arc::new(LeaderboardPage {
            category: Category::TopGivers,
            window: Window::Week,
            entries: Vec::new(),
            total_ranked: 0,
            page,
            page_size: 10,
            generated_at: 0,
        })
    }

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let cache = PageCache::new(Duration::from_secs(60));
        cache
            .insert(Category::TopGivers, Window::Week, 0, 10, empty_page(0))
            .await;

        let hit = cache.get(Category::TopGivers, Window::Week, 0, 10).await;
        assert!(hit.is_some());
        // Different key, no hit.
        let miss = cache.get(Category::Trending, Window::Week, 0, 10).await;
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_misses() {
        let cache = PageCache::new(Duration::from_millis(0));
        cache
            .insert(Category::TopGivers, Window::Week, 0, 10, empty_page(0))
            .await;

        tokio::time::sleep(Duration::from_millis(5)).await;
        let hit = cache.get(Category::TopGivers, Window::Week, 0, 10).await;
        assert!(hit.is_none());
    }
}
