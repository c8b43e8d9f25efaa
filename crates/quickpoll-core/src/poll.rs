use crate::error::{CoreError, Resource};
use crate::observability;
use crate::store::Store;
use chrono::Utc;
use quickpoll_db::polls::{NewPoll, PollListFilter, PollOptionRow, PollRow, PollSummaryRow};
use quickpoll_db::votes::VoteLogRow;
use quickpoll_db::DbError;
use quickpoll_models::{
    is_poll_id, vote_percentage, Category, OptionSnapshot, Pagination, PollSnapshot, PollSummary,
    SortBy,
};

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 20;
const MAX_NAME_LEN: usize = 64;
const MAX_QUESTION_LEN: usize = 300;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_OPTION_LEN: usize = 200;

/// Page size bounds for the poll listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 50,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CreatePollInput {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub question: String,
    pub options: Vec<String>,
}

/// Listing request as received from the caller; absent values take defaults.
#[derive(Clone, Debug, Default)]
pub struct PollListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort_by: SortBy,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct PollPage {
    pub polls: Vec<PollSummary>,
    pub pagination: Pagination,
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.chars().count() > max {
        return Err(CoreError::invalid(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

struct ValidatedPoll {
    name: String,
    category: Category,
    description: Option<String>,
    question: String,
    options: Vec<String>,
}

fn validate_new_poll(input: CreatePollInput) -> Result<ValidatedPoll, CoreError> {
    let name = input.name.trim().to_string();
    let question = input.question.trim().to_string();
    if name.is_empty() || question.is_empty() {
        return Err(CoreError::invalid("Invalid data"));
    }
    check_len("name", &name, MAX_NAME_LEN)?;
    check_len("question", &question, MAX_QUESTION_LEN)?;

    let category = match input.category.as_deref().map(str::trim) {
        None | Some("") => Category::default(),
        Some(raw) => raw
            .parse::<Category>()
            .map_err(|e| CoreError::invalid(e.to_string()))?,
    };

    let description = input
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    if let Some(description) = &description {
        check_len("description", description, MAX_DESCRIPTION_LEN)?;
    }

    if input.options.len() < MIN_OPTIONS {
        return Err(CoreError::invalid("At least 2 options are required"));
    }
    if input.options.len() > MAX_OPTIONS {
        return Err(CoreError::invalid(format!(
            "At most {MAX_OPTIONS} options are allowed"
        )));
    }
    let mut options = Vec::with_capacity(input.options.len());
    for option in &input.options {
        let option = option.trim();
        if option.is_empty() {
            return Err(CoreError::invalid("Each option must have text"));
        }
        check_len("option", option, MAX_OPTION_LEN)?;
        options.push(option.to_string());
    }

    Ok(ValidatedPoll {
        name,
        category,
        description,
        question,
        options,
    })
}

/// Create a poll with its options and return the new poll id.
pub async fn create_poll(store: &Store, input: CreatePollInput) -> Result<String, CoreError> {
    let poll = validate_new_poll(input)?;
    let id = uuid::Uuid::new_v4().to_string();

    let new_poll = NewPoll {
        id: &id,
        username: &poll.name,
        category: poll.category.as_str(),
        description: poll.description.as_deref(),
        question: &poll.question,
        created_at: Utc::now(),
    };
    store
        .call(
            "create_poll",
            quickpoll_db::polls::create_poll(store.pool(), &new_poll, &poll.options),
        )
        .await?;

    observability::poll_created();
    tracing::info!(poll_id = %id, options = poll.options.len(), "poll created");
    Ok(id)
}

/// Validate and record one vote.
///
/// Failures, in the order they are checked: missing or malformed ids are
/// [`CoreError::InvalidInput`] and never reach the store; an unknown poll is
/// `NotFound(Poll)`; an option that is unknown or belongs to another poll is
/// `NotFound(Option)` and leaves all counters untouched.
pub async fn register_vote(
    store: &Store,
    poll_id: &str,
    option_id: &str,
) -> Result<VoteLogRow, CoreError> {
    let result = register_vote_inner(store, poll_id.trim(), option_id.trim()).await;
    if result.is_err() {
        observability::vote_rejected();
    }
    result
}

async fn register_vote_inner(
    store: &Store,
    poll_id: &str,
    option_id: &str,
) -> Result<VoteLogRow, CoreError> {
    if poll_id.is_empty() || option_id.is_empty() {
        return Err(CoreError::invalid("Missing pollId or optionId"));
    }
    if !is_poll_id(poll_id) {
        return Err(CoreError::invalid("Invalid pollId format"));
    }
    // Ids are stored as lowercase hex.
    let poll_id = poll_id.to_ascii_lowercase();
    let poll_id = poll_id.as_str();

    store
        .call(
            "get_poll",
            quickpoll_db::polls::get_poll(store.pool(), poll_id),
        )
        .await?
        .ok_or(CoreError::NotFound(Resource::Poll))?;

    let option_id: i64 = option_id
        .parse()
        .map_err(|_| CoreError::NotFound(Resource::Option))?;

    let entry = match store
        .call(
            "record_vote",
            quickpoll_db::votes::record_vote(store.pool(), poll_id, option_id, Utc::now()),
        )
        .await
    {
        Ok(entry) => entry,
        Err(CoreError::Store(DbError::NotFound)) => {
            return Err(CoreError::NotFound(Resource::Option))
        }
        Err(e) => return Err(e),
    };

    observability::vote_registered();
    tracing::debug!(poll_id, option_id, vote_id = entry.id, "vote registered");
    Ok(entry)
}

fn option_snapshot(row: PollOptionRow, total_votes: i64) -> OptionSnapshot {
    let votes_count = row.votes_count.max(0);
    OptionSnapshot {
        id: row.id,
        option: row.option_text,
        votes_count,
        percentage: vote_percentage(votes_count, total_votes),
    }
}

fn poll_snapshot(poll: PollRow, views: i64, options: Vec<PollOptionRow>) -> PollSnapshot {
    let total_votes: i64 = options.iter().map(|o| o.votes_count.max(0)).sum();
    PollSnapshot {
        id: poll.id,
        username: poll.username,
        category: poll.category,
        description: poll.description,
        question: poll.question,
        views,
        created_at: poll.created_at,
        total_votes,
        options: options
            .into_iter()
            .map(|row| option_snapshot(row, total_votes))
            .collect(),
    }
}

/// Load a poll with its options. With `register_view` the view counter is
/// bumped first; a failed bump is logged and the read still succeeds.
pub async fn get_poll_with_options(
    store: &Store,
    poll_id: &str,
    register_view: bool,
) -> Result<PollSnapshot, CoreError> {
    let poll_id = poll_id.trim();
    if poll_id.is_empty() {
        return Err(CoreError::invalid("Missing pollId"));
    }
    // A malformed id cannot name a poll.
    if !is_poll_id(poll_id) {
        return Err(CoreError::NotFound(Resource::Poll));
    }
    let poll_id = poll_id.to_ascii_lowercase();
    let poll_id = poll_id.as_str();

    let poll = store
        .call(
            "get_poll",
            quickpoll_db::polls::get_poll(store.pool(), poll_id),
        )
        .await?
        .ok_or(CoreError::NotFound(Resource::Poll))?;

    let mut views = poll.views;
    if register_view {
        match store
            .call(
                "increment_views",
                quickpoll_db::polls::increment_views(store.pool(), poll_id),
            )
            .await
        {
            Ok(updated) => {
                views = updated;
                observability::view_registered();
            }
            Err(e) => {
                observability::view_increment_failed();
                tracing::warn!(poll_id, error = %e, "failed to register poll view");
            }
        }
    }

    let options = store
        .call(
            "get_poll_options",
            quickpoll_db::polls::get_poll_options(store.pool(), poll_id),
        )
        .await?;

    Ok(poll_snapshot(poll, views, options))
}

fn normalize_category(raw: Option<&str>) -> Option<String> {
    let raw = raw.map(str::trim).filter(|c| !c.is_empty())?;
    if raw.eq_ignore_ascii_case("all") {
        return None;
    }
    // Unknown names are kept as-is; they simply match no poll.
    Some(
        Category::parse(raw)
            .map(|c| c.as_str().to_string())
            .unwrap_or_else(|| raw.to_string()),
    )
}

fn summary(row: PollSummaryRow) -> PollSummary {
    PollSummary {
        id: row.id,
        username: row.username,
        question: row.question,
        description: row.description,
        views: row.views,
        created_at: row.created_at,
        category: row.category,
        total_votes: row.total_votes.max(0),
    }
}

/// Filter, sort and paginate polls. Sorting is global: page N of
/// `most_voted` never holds a poll with more votes than any poll on page N-1.
pub async fn list_polls(
    store: &Store,
    limits: PageLimits,
    query: PollListQuery,
) -> Result<PollPage, CoreError> {
    let category = normalize_category(query.category.as_deref());
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let page = query.page.unwrap_or(1).max(1);
    let max_page_size = limits.max_page_size.max(1);
    let limit = query
        .limit
        .unwrap_or(limits.default_page_size)
        .clamp(1, max_page_size);

    tracing::debug!(
        category = category.as_deref().unwrap_or("all"),
        search,
        sort_by = query.sort_by.as_str(),
        page,
        limit,
        "listing polls"
    );

    let filter = PollListFilter {
        category: category.as_deref(),
        search,
        sort_by: query.sort_by,
        limit,
        offset: Pagination::offset(page, limit),
    };

    let total_items = store
        .call(
            "count_polls",
            quickpoll_db::polls::count_polls(store.pool(), filter.category, filter.search),
        )
        .await?;
    let rows = store
        .call(
            "list_polls",
            quickpoll_db::polls::list_polls(store.pool(), &filter),
        )
        .await?;

    Ok(PollPage {
        polls: rows.into_iter().map(summary).collect(),
        pagination: Pagination::new(page, limit, total_items),
    })
}
