// Query filtering for generic records

use crate::record::Record;

/// Case-insensitive substring filter over a record's filterable text field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Lowercased search text, never empty
    needle: String,
}

impl Filter {
    /// Build a filter for `text`; an empty string means "no filter"
    pub fn contains(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        Some(Self {
            needle: text.to_lowercase(),
        })
    }

    /// Build a filter from an optional query value
    pub fn from_query(text: Option<&str>) -> Option<Self> {
        text.and_then(Self::contains)
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.needle)
    }

    pub fn matches_record<T: Record>(&self, record: &T) -> bool {
        self.matches(record.filter_text())
    }
}
