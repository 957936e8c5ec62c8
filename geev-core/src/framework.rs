use sqlx::PgPool;

/// Executes kanau query messages against the Postgres read path.
///
/// The leaderboard engine only reads; there is no transaction-scoped
/// variant because no query message mutates state.
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
