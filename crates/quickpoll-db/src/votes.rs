use crate::{format_timestamp, DbError, DbPool};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VoteLogRow {
    pub id: i64,
    pub poll_id: String,
    pub option_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Count one vote for `option_id` and append it to the vote log.
///
/// The increment only matches an option owned by `poll_id`; when nothing
/// matches the transaction is rolled back and [`DbError::NotFound`] is
/// returned. Counter and log row are committed together or not at all.
pub async fn record_vote(
    pool: &DbPool,
    poll_id: &str,
    option_id: i64,
    now: DateTime<Utc>,
) -> Result<VoteLogRow, DbError> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE poll_options
         SET votes_count = votes_count + 1
         WHERE id = ?1 AND poll_id = ?2",
    )
    .bind(option_id)
    .bind(poll_id)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    let row = sqlx::query_as::<_, VoteLogRow>(
        "INSERT INTO poll_votes_logs (poll_id, option_id, created_at)
         VALUES (?1, ?2, ?3)
         RETURNING id, poll_id, option_id, created_at",
    )
    .bind(poll_id)
    .bind(option_id)
    .bind(format_timestamp(now))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Vote log of a poll, oldest first.
pub async fn get_poll_votes(pool: &DbPool, poll_id: &str) -> Result<Vec<VoteLogRow>, DbError> {
    let rows = sqlx::query_as::<_, VoteLogRow>(
        "SELECT id, poll_id, option_id, created_at
         FROM poll_votes_logs
         WHERE poll_id = ?1
         ORDER BY id ASC",
    )
    .bind(poll_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
