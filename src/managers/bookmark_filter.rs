//! Search and category filtering over the local bookmark list.

use crate::types::bookmark::{BookmarkRecord, CategoryFilter};

/// Free-text query plus category selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkFilter {
    pub query: String,
    pub category: CategoryFilter,
}

impl BookmarkFilter {
    pub fn new(query: &str, category: CategoryFilter) -> Self {
        Self {
            query: query.to_string(),
            category,
        }
    }

    /// True when either the query or the category narrows the list.
    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || self.category != CategoryFilter::All
    }

    /// Title or url contains the query (case-insensitive), and the category
    /// selector accepts the record's category.
    pub fn matches(&self, record: &BookmarkRecord) -> bool {
        let needle = self.query.to_lowercase();
        let matches_search = record.title.to_lowercase().contains(&needle)
            || record.url.to_lowercase().contains(&needle);
        matches_search && self.category.matches(record.category)
    }

    /// Returns the matching records in their original order.
    pub fn apply(&self, records: &[BookmarkRecord]) -> Vec<BookmarkRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Message a list view shows when nothing is displayed.
pub fn empty_view_message(filter: &BookmarkFilter) -> &'static str {
    if filter.is_active() {
        "No bookmarks match your search."
    } else {
        "No bookmarks yet. Add your first one!"
    }
}
