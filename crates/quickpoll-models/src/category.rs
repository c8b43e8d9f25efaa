use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

/// Topic a poll is filed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    General,
    Technology,
    Entertainment,
    Health,
    Sports,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::General,
        Category::Technology,
        Category::Entertainment,
        Category::Health,
        Category::Sports,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Technology => "Technology",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health",
            Category::Sports => "Sports",
        }
    }

    /// Case-insensitive lookup. The browse page labels Technology as "Tech",
    /// so that spelling is accepted as well.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("tech") {
            return Some(Category::Technology);
        }
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Category::parse("technology"), Some(Category::Technology));
        assert_eq!(Category::parse("  SPORTS "), Some(Category::Sports));
        assert_eq!(Category::parse("General"), Some(Category::General));
    }

    #[test]
    fn accepts_tech_alias() {
        assert_eq!(Category::parse("Tech"), Some(Category::Technology));
        assert_eq!("tech".parse::<Category>(), Ok(Category::Technology));
    }

    #[test]
    fn rejects_unknown_categories() {
        assert_eq!(Category::parse("Politics"), None);
        assert_eq!(
            "".parse::<Category>(),
            Err(UnknownCategory(String::new()))
        );
    }

    #[test]
    fn display_uses_canonical_name() {
        assert_eq!(Category::Entertainment.to_string(), "Entertainment");
        assert_eq!(Category::default(), Category::General);
    }
}
