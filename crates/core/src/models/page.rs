//! Paging envelope and health payload.

use serde::{Deserialize, Serialize};

/// A page of results as returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub size: u32,
    /// Zero-based page index.
    #[serde(default)]
    pub number: u32,
}

impl<T> Page<T> {
    /// An empty first page.
    #[must_use]
    pub const fn empty(size: u32) -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            size,
            number: 0,
        }
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number + 1 < self.total_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 0
    }
}

/// Backend health report from `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl Health {
    /// Whether the backend reports itself as up.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("UP")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_navigation() {
        let page: Page<u8> = serde_json::from_str(
            r#"{"content":[1,2],"totalElements":42,"totalPages":3,"size":20,"number":1}"#,
        )
        .unwrap();
        assert!(page.has_next());
        assert!(page.has_previous());

        let empty: Page<u8> = Page::empty(20);
        assert!(!empty.has_next());
        assert!(!empty.has_previous());
    }

    #[test]
    fn test_health_is_up() {
        let health: Health = serde_json::from_str(
            r#"{"status":"UP","message":"E-Commerce Engine is running!","timestamp":1700000000000}"#,
        )
        .unwrap();
        assert!(health.is_up());
    }
}
