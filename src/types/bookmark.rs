use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fixed set of categories a bookmark can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    General,
    Work,
    Personal,
    Learning,
    Tools,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 5] = [
        Category::General,
        Category::Work,
        Category::Personal,
        Category::Learning,
        Category::Tools,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Learning => "Learning",
            Category::Tools => "Tools",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Parses the exact category label. Matching is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// A bookmark as held by the authoritative store and mirrored locally.
///
/// `id` is assigned by the authoritative store and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub category: Category,
    /// Owner reference; only meaningful to the authoritative store.
    #[serde(default, rename = "user_id")]
    pub owner: Option<String>,
    /// Creation time in UNIX seconds, when the store reports it.
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl BookmarkRecord {
    /// Builds a record with no owner or timestamp. Handy for local fixtures.
    pub fn new(id: &str, title: &str, url: &str, category: Category) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            category,
            owner: None,
            created_at: None,
        }
    }
}

/// User input for a bookmark that has not been created yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub category: Category,
}

impl NewBookmark {
    pub fn new(title: &str, url: &str, category: Category) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            category,
        }
    }
}

/// Category selector used by the filtered view. `All` is the wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }

    /// Selector labels in the order a category picker shows them.
    pub fn labels() -> Vec<&'static str> {
        std::iter::once("All")
            .chain(Category::ALL.iter().map(Category::as_str))
            .collect()
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "All" {
            Ok(CategoryFilter::All)
        } else {
            s.parse::<Category>().map(CategoryFilter::Only)
        }
    }
}
