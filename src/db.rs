mod schema;

pub use schema::{Database, FavoritesWatch};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Cached book record.
///
/// One row per external book id. Source-derived fields are overwritten on
/// every re-fetch; `is_favorite` and `user_rating` belong to the user and
/// survive upserts. A favorited row is exempt from TTL eviction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedBook {
    /// Stable external identifier (primary key).
    pub id: String,
    /// Book title.
    pub title: String,
    /// Primary author(s), comma-joined.
    pub author: String,
    /// Subtitle.
    pub subtitle: Option<String>,
    /// Book description or summary.
    pub description: Option<String>,
    /// Cover image URL.
    pub cover_url: Option<String>,
    /// Publication date as given by the source.
    pub published: Option<String>,
    /// Category or query under which the book was last fetched.
    pub category: String,
    /// Source-provided rating (0.0 if absent).
    pub rating: f64,
    /// User's personal rating; absent until set.
    pub user_rating: Option<f64>,
    /// Whether the user favorited this book.
    pub is_favorite: bool,
    /// When the record was cached.
    pub cached_at: i64,
    /// Freshness deadline (`cached_at` + TTL).
    pub expires_at: i64,
}

impl CachedBook {
    /// Whether the freshness window has passed.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at < now
    }
}

/// Reading status of a favorited book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReadingStatus {
    /// Not started yet.
    Unstarted,
    /// Currently reading.
    Reading,
    /// Finished reading.
    Finished,
}

impl ReadingStatus {
    /// Stable name used in the database and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Unstarted => "UNSTARTED",
            ReadingStatus::Reading => "READING",
            ReadingStatus::Finished => "FINISHED",
        }
    }

    /// Parse a status name, case-insensitive. Unknown values map to
    /// `Unstarted` so a malformed remote record never poisons a pull.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "READING" => ReadingStatus::Reading,
            "FINISHED" => ReadingStatus::Finished,
            _ => ReadingStatus::Unstarted,
        }
    }
}

/// Durable favorite entry.
///
/// Snapshot of the book's source fields taken at favorite time, so the
/// favorite survives cache eviction of the underlying row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteEntry {
    /// Book ID (primary key, 1:1 with the cache row while it exists).
    pub book_id: String,
    /// Book title.
    pub title: String,
    /// Primary author(s).
    pub author: String,
    /// Subtitle.
    pub subtitle: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Cover image URL.
    pub cover_url: Option<String>,
    /// Publication date.
    pub published: Option<String>,
    /// Source-provided rating.
    pub rating: f64,
    /// User's personal rating.
    pub user_rating: Option<f64>,
    /// Reading status.
    pub status: ReadingStatus,
    /// Current page.
    pub current_page: i64,
    /// Total pages (0 if unknown).
    pub total_pages: i64,
    /// Reading progress in [0, 1].
    pub progress: f64,
    /// When the book was favorited.
    pub added_at: i64,
    /// Last favorite mutation (add, rating, status, progress).
    pub updated_at: i64,
}

impl FavoriteEntry {
    /// Build a fresh entry from a cached book.
    pub fn from_book(book: &CachedBook, now: i64) -> Self {
        Self {
            book_id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            subtitle: book.subtitle.clone(),
            description: book.description.clone(),
            cover_url: book.cover_url.clone(),
            published: book.published.clone(),
            rating: book.rating,
            user_rating: book.user_rating,
            status: ReadingStatus::Unstarted,
            current_page: 0,
            total_pages: 0,
            progress: 0.0,
            added_at: now,
            updated_at: now,
        }
    }
}

/// Timestamp helper (epoch seconds).
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}
