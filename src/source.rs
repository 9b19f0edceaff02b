//! Remote catalog interface.
//!
//! The search API itself lives outside this crate; the engine only
//! consumes its result shape and the two fetch entry points.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Book as returned by the remote search API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceBook {
    /// Stable external identifier.
    pub id: String,
    /// Book title.
    pub title: String,
    /// Authors (may be empty).
    pub authors: Vec<String>,
    /// Subtitle.
    pub subtitle: Option<String>,
    /// Book description or summary.
    pub description: Option<String>,
    /// Cover image URL.
    pub cover_url: Option<String>,
    /// Publication date.
    pub published: Option<String>,
    /// Average rating (None when the source has none).
    pub rating: Option<f64>,
}

impl SourceBook {
    /// Display name for authors, comma-joined.
    pub fn authors_display(&self) -> String {
        if self.authors.is_empty() {
            "Unknown Author".to_string()
        } else {
            self.authors.join(", ")
        }
    }
}

/// Remote book search provider.
#[async_trait]
pub trait BookSource: Send + Sync {
    /// Free-text search.
    async fn fetch_by_query(&self, query: &str) -> Result<Vec<SourceBook>>;

    /// Category browse.
    async fn fetch_by_category(&self, category: &str) -> Result<Vec<SourceBook>>;
}
