//! Cache manager: TTL bookkeeping over the record store.

use crate::db::{CachedBook, Database, now_timestamp};
use crate::error::Result;
use crate::source::SourceBook;
use std::time::Duration;

/// Default freshness window for cached books.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Translates fetched book batches into cache upserts and serves
/// best-effort reads.
///
/// Reads never fail: a storage error degrades to an empty result with a
/// warning, since the cache is an optimization, not the source of record.
#[derive(Clone)]
pub struct BookCache {
    db: Database,
    ttl: Duration,
}

impl BookCache {
    /// Create a cache manager over the shared store.
    pub fn new(db: Database, ttl: Duration) -> Self {
        Self { db, ttl }
    }

    /// Create a cache manager with the default one-hour TTL.
    pub fn with_default_ttl(db: Database) -> Self {
        Self::new(db, DEFAULT_CACHE_TTL)
    }

    /// Cache a fetched batch under a category.
    ///
    /// New books get a fresh freshness window; existing rows have their
    /// source fields and window refreshed while `is_favorite` and
    /// `user_rating` are preserved. Re-caching the same batch is
    /// idempotent apart from the refreshed timestamps.
    pub fn cache(&self, books: &[SourceBook], category: &str) -> Result<usize> {
        if books.is_empty() {
            return Ok(0);
        }

        let now = now_timestamp();
        let expires_at = now + self.ttl.as_secs() as i64;
        let rows: Vec<CachedBook> = books
            .iter()
            .map(|b| CachedBook {
                id: b.id.clone(),
                title: b.title.clone(),
                author: b.authors_display(),
                subtitle: b.subtitle.clone(),
                description: b.description.clone(),
                cover_url: b.cover_url.clone(),
                published: b.published.clone(),
                category: category.to_string(),
                rating: b.rating.unwrap_or(0.0),
                user_rating: None,
                is_favorite: false,
                cached_at: now,
                expires_at,
            })
            .collect();

        let count = self.db.upsert_books(&rows)?;
        tracing::debug!(category = %category, books = count, "Cached book batch");
        Ok(count)
    }

    /// Point lookup by id.
    pub fn get(&self, id: &str) -> Option<CachedBook> {
        match self.db.get_book(id) {
            Ok(book) => book,
            Err(e) => {
                tracing::warn!(error = %e, id = %id, "Cache read failed");
                None
            }
        }
    }

    /// Books cached under a category.
    ///
    /// `include_expired = true` is the offline fallback: stale rows are
    /// better than an empty shelf when there is no network.
    pub fn by_category(&self, category: &str, include_expired: bool) -> Vec<CachedBook> {
        match self.db.get_books_by_category(category, include_expired) {
            Ok(books) => books,
            Err(e) => {
                tracing::warn!(error = %e, category = %category, "Cache read failed");
                Vec::new()
            }
        }
    }

    /// Case-insensitive substring search over the cached set.
    pub fn search(&self, query: &str, limit: usize) -> Vec<CachedBook> {
        match self.db.search_books(query, limit) {
            Ok(books) => books,
            Err(e) => {
                tracing::warn!(error = %e, "Cache search failed");
                Vec::new()
            }
        }
    }

    /// Configured freshness window.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
