use serde::Serialize;

/// Ordering applied to the poll listing before it is paginated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Newest,
    Oldest,
    MostVoted,
    MostViewed,
}

impl SortBy {
    /// Unknown values fall back to [`SortBy::Newest`].
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "oldest" => SortBy::Oldest,
            "most_voted" => SortBy::MostVoted,
            "most_viewed" => SortBy::MostViewed,
            _ => SortBy::Newest,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Newest => "newest",
            SortBy::Oldest => "oldest",
            SortBy::MostVoted => "most_voted",
            SortBy::MostViewed => "most_viewed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
}

impl Pagination {
    pub fn new(current_page: i64, limit: i64, total_items: i64) -> Self {
        let limit = limit.max(1);
        let total_items = total_items.max(0);
        Self {
            current_page,
            total_pages: (total_items + limit - 1) / limit,
            total_items,
        }
    }

    /// Row offset of the first item on a 1-based `page`.
    pub fn offset(page: i64, limit: i64) -> i64 {
        (page.max(1) - 1).saturating_mul(limit.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_by_parses_known_values() {
        assert_eq!(SortBy::parse("oldest"), SortBy::Oldest);
        assert_eq!(SortBy::parse("MOST_VOTED"), SortBy::MostVoted);
        assert_eq!(SortBy::parse("most_viewed"), SortBy::MostViewed);
        assert_eq!(SortBy::parse("newest"), SortBy::Newest);
        for sort_by in [SortBy::Newest, SortBy::Oldest, SortBy::MostVoted, SortBy::MostViewed] {
            assert_eq!(SortBy::parse(sort_by.as_str()), sort_by);
        }
    }

    #[test]
    fn sort_by_falls_back_to_newest() {
        assert_eq!(SortBy::parse("trending"), SortBy::Newest);
        assert_eq!(SortBy::parse(""), SortBy::Newest);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).total_pages, 2);
        assert_eq!(Pagination::new(3, 4, 9).total_pages, 3);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(Pagination::offset(1, 10), 0);
        assert_eq!(Pagination::offset(3, 10), 20);
        assert_eq!(Pagination::offset(0, 10), 0);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(Pagination::new(2, 5, 12)).unwrap();
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["totalItems"], 12);
    }
}
