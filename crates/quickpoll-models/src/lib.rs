pub mod category;
pub mod listing;
pub mod poll;

pub use category::{Category, UnknownCategory};
pub use listing::{Pagination, SortBy};
pub use poll::{is_poll_id, vote_percentage, OptionSnapshot, PollSnapshot, PollSummary};
