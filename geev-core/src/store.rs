//! Read adapters over the event store and identity provider.
//!
//! The engine consumes these as traits so the service can run against
//! in-memory fakes in tests; the Postgres implementations delegate to the
//! kanau query messages in `entities`.

use std::collections::HashMap;

use async_trait::async_trait;
use kanau::processor::Processor;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::entities::contribution_events::{ContributionEvent, ListContributionEvents};
use crate::entities::user_identities::{GetUserIdentities, UserIdentity};
use crate::framework::DatabaseProcessor;
use crate::leaderboard::window::Window;

/// Upstream read failure.
///
/// Retryable by the caller; the engine itself never retries and never
/// substitutes placeholder data for a failed read.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Read-only access to raw contribution events.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// All events with `occurred_at` in `[window start, now)`, oldest first.
    async fn events_in_window(
        &self,
        window: Window,
        now: OffsetDateTime,
    ) -> Result<Vec<ContributionEvent>, StoreError>;
}

/// Read-only access to user profile records.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Identities for the given users. An absent key means "unknown user".
    async fn identities(
        &self,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, UserIdentity>, StoreError>;
}

#[async_trait]
impl EventStore for DatabaseProcessor {
    async fn events_in_window(
        &self,
        window: Window,
        now: OffsetDateTime,
    ) -> Result<Vec<ContributionEvent>, StoreError> {
        let events = self
            .process(ListContributionEvents {
                since: window.start(now),
                until: now,
            })
            .await?;
        Ok(events)
    }
}

#[async_trait]
impl IdentityProvider for DatabaseProcessor {
    async fn identities(
        &self,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, UserIdentity>, StoreError> {
        let rows = self
            .process(GetUserIdentities {
                user_ids: user_ids.to_vec(),
            })
            .await?;
        Ok(rows.into_iter().map(|row| (row.user_id, row)).collect())
    }
}
