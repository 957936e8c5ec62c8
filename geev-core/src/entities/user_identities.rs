use compact_str::CompactString;
use kanau::processor::Processor;
use uuid::Uuid;

use crate::framework::DatabaseProcessor;

/// Profile reference data owned by the identity subsystem.
///
/// Joined into rankings by `user_id`; the engine treats it as read-only.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserIdentity {
    pub user_id: Uuid,
    pub display_name: CompactString,
    /// `@name` style handle.
    pub handle: CompactString,
    pub avatar_ref: Option<String>,
    pub verified: bool,
}

#[derive(Debug, Clone)]
/// Fetch identities for the given user set in one round trip.
///
/// Users absent from the result are unknown to the identity subsystem;
/// the ranker drops them with a diagnostic count.
pub struct GetUserIdentities {
    pub user_ids: Vec<Uuid>,
}

impl Processor<GetUserIdentities> for DatabaseProcessor {
    type Output = Vec<UserIdentity>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserIdentities")]
    async fn process(&self, query: GetUserIdentities) -> Result<Vec<UserIdentity>, sqlx::Error> {
        if query.user_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, UserIdentity>(
            r#"
            SELECT user_id, display_name, handle, avatar_ref, verified
            FROM user_identities
            WHERE user_id = ANY($1)
            "#,
        )
        .bind(&query.user_ids)
        .fetch_all(&self.pool)
        .await
    }
}
