use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of a poll identifier (UUID text form).
pub const POLL_ID_LEN: usize = 36;

/// One row of the poll listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSummary {
    pub id: String,
    pub username: String,
    pub question: String,
    pub description: Option<String>,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub category: String,
    pub total_votes: i64,
}

/// A poll together with its options, as shown on the poll page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSnapshot {
    pub id: String,
    pub username: String,
    pub category: String,
    pub description: Option<String>,
    pub question: String,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub total_votes: i64,
    pub options: Vec<OptionSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionSnapshot {
    pub id: i64,
    pub option: String,
    pub votes_count: i64,
    pub percentage: u8,
}

/// Whether `raw` has the shape of a poll identifier: 36 hex digits or hyphens.
pub fn is_poll_id(raw: &str) -> bool {
    raw.len() == POLL_ID_LEN && raw.chars().all(|ch| ch.is_ascii_hexdigit() || ch == '-')
}

/// Share of `total` held by `votes`, rounded to the nearest whole percent.
pub fn vote_percentage(votes: i64, total: i64) -> u8 {
    if total <= 0 || votes <= 0 {
        return 0;
    }
    let pct = (votes as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}
