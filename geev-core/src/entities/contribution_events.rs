use compact_str::CompactString;
use kanau::processor::Processor;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::framework::DatabaseProcessor;

/// A single immutable contribution fact from the activity feed.
///
/// Rows are append-only and owned by the feed service; this engine never
/// writes them. `kind` stays raw text at this boundary so one unrecognized
/// row degrades to a counted skip in the aggregator instead of failing the
/// whole bulk read.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ContributionEvent {
    pub event_id: Uuid,
    /// The acting user: giver, requester, badge recipient or engager.
    pub user_id: Uuid,
    pub kind: CompactString,
    pub amount: f64,
    /// Giveaway campaign a `give` belongs to, when the feed recorded one.
    pub campaign_id: Option<Uuid>,
    /// Recipient of a `request`.
    pub target_user_id: Option<Uuid>,
    pub occurred_at: OffsetDateTime,
}

/// Parsed contribution kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Give,
    Request,
    BadgeAward,
    Engagement,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Give => "give",
            EventKind::Request => "request",
            EventKind::BadgeAward => "badge_award",
            EventKind::Engagement => "engagement",
        }
    }

    /// Returns `None` for kinds this engine version does not know.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "give" => Some(EventKind::Give),
            "request" => Some(EventKind::Request),
            "badge_award" => Some(EventKind::BadgeAward),
            "engagement" => Some(EventKind::Engagement),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
/// Bulk-read all events inside a window, oldest first.
///
/// `since` is the closed lower bound; `None` means all-time. `until` is the
/// open upper bound, the request-time snapshot.
pub struct ListContributionEvents {
    pub since: Option<OffsetDateTime>,
    pub until: OffsetDateTime,
}

impl Processor<ListContributionEvents> for DatabaseProcessor {
    type Output = Vec<ContributionEvent>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListContributionEvents")]
    async fn process(
        &self,
        query: ListContributionEvents,
    ) -> Result<Vec<ContributionEvent>, sqlx::Error> {
        match query.since {
            Some(since) => {
                sqlx::query_as::<_, ContributionEvent>(
                    r#"
                    SELECT event_id, user_id, kind, amount,
                           campaign_id, target_user_id, occurred_at
                    FROM contribution_events
                    WHERE occurred_at >= $1 AND occurred_at < $2
                    ORDER BY occurred_at ASC
                    "#,
                )
                .bind(since)
                .bind(query.until)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, ContributionEvent>(
                    r#"
                    SELECT event_id, user_id, kind, amount,
                           campaign_id, target_user_id, occurred_at
                    FROM contribution_events
                    WHERE occurred_at < $1
                    ORDER BY occurred_at ASC
                    "#,
                )
                .bind(query.until)
                .fetch_all(&self.pool)
                .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_round_trip() {
        for kind in [
            EventKind::Give,
            EventKind::Request,
            EventKind::BadgeAward,
            EventKind::Engagement,
        ] {
            assert_eq!(EventKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_kind_is_none() {
        assert_eq!(EventKind::parse("boost"), None);
        assert_eq!(EventKind::parse(""), None);
        // Parsing is exact, not case-folded.
        assert_eq!(EventKind::parse("Give"), None);
    }
}
