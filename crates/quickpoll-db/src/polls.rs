use crate::{format_timestamp, DbError, DbPool};
use chrono::{DateTime, Utc};
use quickpoll_models::SortBy;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PollRow {
    pub id: String,
    pub username: String,
    pub category: String,
    pub description: Option<String>,
    pub question: String,
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PollOptionRow {
    pub id: i64,
    pub poll_id: String,
    pub option_text: String,
    pub votes_count: i64,
}

/// Poll listing row with the vote total summed over its options.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PollSummaryRow {
    pub id: String,
    pub username: String,
    pub category: String,
    pub description: Option<String>,
    pub question: String,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub total_votes: i64,
}

#[derive(Debug, Clone)]
pub struct NewPoll<'a> {
    pub id: &'a str,
    pub username: &'a str,
    pub category: &'a str,
    pub description: Option<&'a str>,
    pub question: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Filters and window for [`list_polls`]. `category` and `search` of `None`
/// disable the respective filter.
#[derive(Debug, Clone, Copy)]
pub struct PollListFilter<'a> {
    pub category: Option<&'a str>,
    pub search: Option<&'a str>,
    pub sort_by: SortBy,
    pub limit: i64,
    pub offset: i64,
}

const POLL_COLUMNS: &str = "id, username, category, description, question, views, created_at";

const SUMMARY_SELECT: &str = "SELECT p.id, p.username, p.category, p.description, p.question,
        p.views, p.created_at,
        COALESCE((SELECT SUM(o.votes_count) FROM poll_options o WHERE o.poll_id = p.id), 0)
            AS total_votes
     FROM polls p";

const FILTER_CLAUSE: &str = r"WHERE (?1 IS NULL OR p.category = ?1 COLLATE NOCASE)
       AND (?2 IS NULL
            OR p.question_folded LIKE ?2 ESCAPE '\'
            OR p.description_folded LIKE ?2 ESCAPE '\')";

fn order_clause(sort_by: SortBy) -> &'static str {
    match sort_by {
        SortBy::Newest => "ORDER BY p.created_at DESC, p.rowid DESC",
        SortBy::Oldest => "ORDER BY p.created_at ASC, p.rowid ASC",
        SortBy::MostVoted => "ORDER BY total_votes DESC, p.rowid DESC",
        SortBy::MostViewed => "ORDER BY p.views DESC, p.rowid DESC",
    }
}

/// Build a `LIKE` pattern matching `needle` anywhere, with wildcards in the
/// needle itself taken literally.
pub fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

/// Search pattern matched against the folded columns, so the comparison
/// ignores case beyond ASCII.
fn search_pattern(needle: &str) -> String {
    like_pattern(&needle.to_lowercase())
}

/// Insert a poll and its options in one transaction. Options keep the order
/// of `options`.
pub async fn create_poll(
    pool: &DbPool,
    poll: &NewPoll<'_>,
    options: &[String],
) -> Result<(PollRow, Vec<PollOptionRow>), DbError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, PollRow>(
        "INSERT INTO polls
            (id, username, category, description, question, created_at,
             question_folded, description_folded)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         RETURNING id, username, category, description, question, views, created_at",
    )
    .bind(poll.id)
    .bind(poll.username)
    .bind(poll.category)
    .bind(poll.description)
    .bind(poll.question)
    .bind(format_timestamp(poll.created_at))
    .bind(poll.question.to_lowercase())
    .bind(poll.description.map(str::to_lowercase))
    .fetch_one(&mut *tx)
    .await?;

    let mut option_rows = Vec::with_capacity(options.len());
    for text in options {
        let option = sqlx::query_as::<_, PollOptionRow>(
            "INSERT INTO poll_options (poll_id, option_text)
             VALUES (?1, ?2)
             RETURNING id, poll_id, option_text, votes_count",
        )
        .bind(poll.id)
        .bind(text)
        .fetch_one(&mut *tx)
        .await?;
        option_rows.push(option);
    }

    tx.commit().await?;
    Ok((row, option_rows))
}

pub async fn get_poll(pool: &DbPool, id: &str) -> Result<Option<PollRow>, DbError> {
    let row = sqlx::query_as::<_, PollRow>(&format!(
        "SELECT {POLL_COLUMNS} FROM polls WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Options of a poll in creation order.
pub async fn get_poll_options(pool: &DbPool, poll_id: &str) -> Result<Vec<PollOptionRow>, DbError> {
    let rows = sqlx::query_as::<_, PollOptionRow>(
        "SELECT id, poll_id, option_text, votes_count
         FROM poll_options
         WHERE poll_id = ?1
         ORDER BY id ASC",
    )
    .bind(poll_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Bump the view counter in place and return the new value.
pub async fn increment_views(pool: &DbPool, id: &str) -> Result<i64, DbError> {
    let views: Option<i64> =
        sqlx::query_scalar("UPDATE polls SET views = views + 1 WHERE id = ?1 RETURNING views")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    views.ok_or(DbError::NotFound)
}

/// One page of polls. Filtering and ordering happen before the window is
/// applied, so ordering holds across pages.
pub async fn list_polls(
    pool: &DbPool,
    filter: &PollListFilter<'_>,
) -> Result<Vec<PollSummaryRow>, DbError> {
    let sql = format!(
        "{SUMMARY_SELECT}
         {FILTER_CLAUSE}
         {}
         LIMIT ?3 OFFSET ?4",
        order_clause(filter.sort_by)
    );
    let pattern = filter.search.map(search_pattern);

    let rows = sqlx::query_as::<_, PollSummaryRow>(&sql)
        .bind(filter.category)
        .bind(pattern)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Number of polls matching the same filters as [`list_polls`].
pub async fn count_polls(
    pool: &DbPool,
    category: Option<&str>,
    search: Option<&str>,
) -> Result<i64, DbError> {
    let sql = format!("SELECT COUNT(*) FROM polls p {FILTER_CLAUSE}");
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(category)
        .bind(search.map(search_pattern))
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_pool;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, minute, 0).unwrap()
    }

    async fn seed(
        pool: &DbPool,
        question: &str,
        category: &str,
        description: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> (PollRow, Vec<PollOptionRow>) {
        let id = uuid::Uuid::new_v4().to_string();
        create_poll(
            pool,
            &NewPoll {
                id: &id,
                username: "alice",
                category,
                description,
                question,
                created_at,
            },
            &["Yes".to_string(), "No".to_string()],
        )
        .await
        .unwrap()
    }

    async fn add_votes(pool: &DbPool, option_id: i64, votes: i64) {
        sqlx::query("UPDATE poll_options SET votes_count = votes_count + ?2 WHERE id = ?1")
            .bind(option_id)
            .bind(votes)
            .execute(pool)
            .await
            .unwrap();
    }

    fn filter(sort_by: SortBy) -> PollListFilter<'static> {
        PollListFilter {
            category: None,
            search: None,
            sort_by,
            limit: 10,
            offset: 0,
        }
    }

    #[tokio::test]
    async fn test_create_poll_keeps_option_order() {
        let pool = memory_pool().await;
        let id = uuid::Uuid::new_v4().to_string();
        let options: Vec<String> = ["Red", "Green", "Blue", "Teal"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (poll, created) = create_poll(
            &pool,
            &NewPoll {
                id: &id,
                username: "bob",
                category: "General",
                description: None,
                question: "Favourite colour?",
                created_at: at(0),
            },
            &options,
        )
        .await
        .unwrap();
        assert_eq!(poll.id, id);
        assert_eq!(poll.views, 0);
        assert_eq!(poll.created_at, at(0));
        assert_eq!(created.len(), 4);

        let read_back = get_poll_options(&pool, &id).await.unwrap();
        let texts: Vec<&str> = read_back.iter().map(|o| o.option_text.as_str()).collect();
        assert_eq!(texts, vec!["Red", "Green", "Blue", "Teal"]);
        assert!(read_back.iter().all(|o| o.votes_count == 0));
    }

    #[tokio::test]
    async fn test_get_poll_not_found() {
        let pool = memory_pool().await;
        let poll = get_poll(&pool, "00000000-0000-0000-0000-000000000000")
            .await
            .unwrap();
        assert!(poll.is_none());
    }

    #[tokio::test]
    async fn test_increment_views_returns_new_value() {
        let pool = memory_pool().await;
        let (poll, _) = seed(&pool, "Q", "General", None, at(0)).await;
        assert_eq!(increment_views(&pool, &poll.id).await.unwrap(), 1);
        assert_eq!(increment_views(&pool, &poll.id).await.unwrap(), 2);
        let stored = get_poll(&pool, &poll.id).await.unwrap().unwrap();
        assert_eq!(stored.views, 2);
    }

    #[tokio::test]
    async fn test_increment_views_missing_poll() {
        let pool = memory_pool().await;
        let err = increment_views(&pool, "00000000-0000-0000-0000-000000000000")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[tokio::test]
    async fn test_list_sorts_by_creation_time() {
        let pool = memory_pool().await;
        seed(&pool, "middle", "General", None, at(5)).await;
        seed(&pool, "first", "General", None, at(1)).await;
        seed(&pool, "last", "General", None, at(9)).await;

        let newest = list_polls(&pool, &filter(SortBy::Newest)).await.unwrap();
        let questions: Vec<&str> = newest.iter().map(|p| p.question.as_str()).collect();
        assert_eq!(questions, vec!["last", "middle", "first"]);

        let oldest = list_polls(&pool, &filter(SortBy::Oldest)).await.unwrap();
        let questions: Vec<&str> = oldest.iter().map(|p| p.question.as_str()).collect();
        assert_eq!(questions, vec!["first", "middle", "last"]);
    }

    #[tokio::test]
    async fn test_list_total_votes_is_sum_of_options() {
        let pool = memory_pool().await;
        let (_, options) = seed(&pool, "Q", "General", None, at(0)).await;
        add_votes(&pool, options[0].id, 3).await;
        add_votes(&pool, options[1].id, 4).await;

        let rows = list_polls(&pool, &filter(SortBy::Newest)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_votes, 7);
    }

    #[tokio::test]
    async fn test_list_sorts_globally_before_paginating() {
        let pool = memory_pool().await;
        for (minute, votes) in [(0, 1), (1, 9), (2, 5), (3, 7), (4, 3)] {
            let (_, options) =
                seed(&pool, &format!("votes-{votes}"), "General", None, at(minute)).await;
            add_votes(&pool, options[0].id, votes).await;
        }

        let mut page = filter(SortBy::MostVoted);
        page.limit = 2;
        let first = list_polls(&pool, &page).await.unwrap();
        page.offset = 2;
        let second = list_polls(&pool, &page).await.unwrap();
        page.offset = 4;
        let third = list_polls(&pool, &page).await.unwrap();

        let totals: Vec<i64> = first
            .iter()
            .chain(second.iter())
            .chain(third.iter())
            .map(|p| p.total_votes)
            .collect();
        assert_eq!(totals, vec![9, 7, 5, 3, 1]);
    }

    #[tokio::test]
    async fn test_list_sorts_by_views() {
        let pool = memory_pool().await;
        let (quiet, _) = seed(&pool, "quiet", "General", None, at(0)).await;
        let (busy, _) = seed(&pool, "busy", "General", None, at(1)).await;
        for _ in 0..3 {
            increment_views(&pool, &busy.id).await.unwrap();
        }
        increment_views(&pool, &quiet.id).await.unwrap();

        let rows = list_polls(&pool, &filter(SortBy::MostViewed)).await.unwrap();
        assert_eq!(rows[0].question, "busy");
        assert_eq!(rows[0].views, 3);
        assert_eq!(rows[1].question, "quiet");
    }

    #[tokio::test]
    async fn test_list_filters_category_case_insensitively() {
        let pool = memory_pool().await;
        seed(&pool, "gpu", "Technology", None, at(0)).await;
        seed(&pool, "match", "Sports", None, at(1)).await;

        let mut f = filter(SortBy::Newest);
        f.category = Some("technology");
        let rows = list_polls(&pool, &f).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].question, "gpu");
        assert_eq!(count_polls(&pool, Some("TECHNOLOGY"), None).await.unwrap(), 1);
        assert_eq!(count_polls(&pool, Some("Politics"), None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_searches_question_and_description() {
        let pool = memory_pool().await;
        seed(&pool, "Best Rust crate?", "Technology", None, at(0)).await;
        seed(&pool, "Lunch", "General", Some("pizza or RUST-coloured soup"), at(1)).await;
        seed(&pool, "Weekend plans", "General", Some("hiking"), at(2)).await;

        let mut f = filter(SortBy::Oldest);
        f.search = Some("rust");
        let rows = list_polls(&pool, &f).await.unwrap();
        let questions: Vec<&str> = rows.iter().map(|p| p.question.as_str()).collect();
        assert_eq!(questions, vec!["Best Rust crate?", "Lunch"]);
        assert_eq!(count_polls(&pool, None, Some("rust")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_search_wildcards_are_literal() {
        let pool = memory_pool().await;
        seed(&pool, "100% sure?", "General", None, at(0)).await;
        seed(&pool, "1000 sure?", "General", None, at(1)).await;

        assert_eq!(count_polls(&pool, None, Some("0%")).await.unwrap(), 1);
        assert_eq!(count_polls(&pool, None, Some("_")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_ignores_case_beyond_ascii() {
        let pool = memory_pool().await;
        seed(&pool, "Beste Äpfel?", "General", None, at(0)).await;
        seed(&pool, "Birnen", "General", Some("GRÜNE oder gelbe"), at(1)).await;

        for needle in ["äpfel", "ÄPFEL", "Äpfel"] {
            assert_eq!(count_polls(&pool, None, Some(needle)).await.unwrap(), 1, "{needle}");
        }
        let mut f = filter(SortBy::Newest);
        f.search = Some("grüne");
        let rows = list_polls(&pool, &f).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].question, "Birnen");
        assert_eq!(rows[0].description.as_deref(), Some("GRÜNE oder gelbe"));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
        assert_eq!(search_pattern("ÄPFEL_"), "%äpfel\\_%");
    }
}
