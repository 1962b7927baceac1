//! Paginated list envelope.

use serde::{Deserialize, Serialize};

/// One page of results, in the backend's Spring Data shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    /// Total number of pages
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of items across all pages
    #[serde(default)]
    pub total_elements: u64,
    /// Zero-based page index
    #[serde(default)]
    pub number: u32,
    /// Requested page size
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    /// Returns true if a page after this one exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number + 1 < self.total_pages
    }

    /// Returns true if a page before this one exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 0
    }
}

/// Sort direction accepted by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending
    Asc,
    /// Descending
    #[default]
    Desc,
}

impl SortDirection {
    /// Returns the query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_page_navigation() {
        let page: Page<u32> = serde_json::from_str(
            r#"{"content":[1,2],"totalPages":3,"totalElements":6,"number":1,"size":2}"#,
        )
        .unwrap();
        assert_eq!(page.content, vec![1, 2]);
        assert!(page.has_next());
        assert!(page.has_previous());

        let last = Page::<u32> {
            number: 2,
            ..page
        };
        assert!(!last.has_next());
    }

    #[test]
    fn test_page_missing_fields() {
        let page: Page<u32> = serde_json::from_str("{}").unwrap();
        assert!(page.content.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }
}
