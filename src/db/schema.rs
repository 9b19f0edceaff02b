use crate::db::*;
use crate::error::{AppError, Result};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

/// Database wrapper for thread-safe access.
///
/// Cloning is cheap; all clones share the same connection and the same
/// favorites watch channel. Every mutating method runs inside a single
/// atomic write scope (one statement or an explicit transaction).
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    favorites_tx: watch::Sender<Vec<FavoriteEntry>>,
}

/// Subscription to the favorite list.
///
/// Yields the current list immediately, then the full list again after
/// every favorite mutation. Dropping the watch detaches it.
pub struct FavoritesWatch {
    rx: watch::Receiver<Vec<FavoriteEntry>>,
    primed: bool,
}

impl FavoritesWatch {
    /// Wait for the next emission. `None` once the store is gone.
    pub async fn next(&mut self) -> Option<Vec<FavoriteEntry>> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Current list without waiting.
    pub fn latest(&self) -> Vec<FavoriteEntry> {
        self.rx.borrow().clone()
    }
}

impl Database {
    /// Open or create database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Storage(format!("Failed to open database: {}", e)))?;

        Self::from_connection(conn)
    }

    /// Open in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Storage(format!("Failed to open database: {}", e)))?;

        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let (favorites_tx, _) = watch::channel(Vec::new());
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            favorites_tx,
        };

        db.initialize_schema()?;
        // Seed the watch channel for a reopened database.
        db.publish_favorites();
        Ok(db)
    }

    /// Initialize database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            -- Cached books table (ephemeral except favorited rows)
            CREATE TABLE IF NOT EXISTS books (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                subtitle TEXT,
                description TEXT,
                cover_url TEXT,
                published TEXT,
                category TEXT NOT NULL,
                rating REAL NOT NULL DEFAULT 0,
                user_rating REAL,
                is_favorite INTEGER NOT NULL DEFAULT 0,
                cached_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            );

            -- Favorites table (durable snapshots, survive cache eviction)
            CREATE TABLE IF NOT EXISTS favorites (
                book_id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                subtitle TEXT,
                description TEXT,
                cover_url TEXT,
                published TEXT,
                rating REAL NOT NULL DEFAULT 0,
                user_rating REAL,
                status TEXT NOT NULL DEFAULT 'UNSTARTED',
                current_page INTEGER NOT NULL DEFAULT 0,
                total_pages INTEGER NOT NULL DEFAULT 0,
                progress REAL NOT NULL DEFAULT 0,
                added_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_books_category ON books(category);
            CREATE INDEX IF NOT EXISTS idx_books_expires ON books(expires_at);
            CREATE INDEX IF NOT EXISTS idx_favorites_added ON favorites(added_at);
            "#,
        )
        .map_err(|e| AppError::Storage(format!("Failed to initialize schema: {}", e)))?;

        Ok(())
    }

    // ========== BOOK OPERATIONS ==========

    /// Upsert a batch of books in one transaction.
    ///
    /// Source-derived fields and the freshness window are overwritten;
    /// `is_favorite` and `user_rating` of an existing row are preserved.
    pub fn upsert_books(&self, books: &[CachedBook]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Storage(format!("Failed to start transaction: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO books
                     (id, title, author, subtitle, description, cover_url, published,
                      category, rating, user_rating, is_favorite, cached_at, expires_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                     ON CONFLICT (id) DO UPDATE SET
                        title = excluded.title,
                        author = excluded.author,
                        subtitle = excluded.subtitle,
                        description = excluded.description,
                        cover_url = excluded.cover_url,
                        published = excluded.published,
                        category = excluded.category,
                        rating = excluded.rating,
                        cached_at = excluded.cached_at,
                        expires_at = excluded.expires_at",
                )
                .map_err(|e| AppError::Storage(format!("Failed to prepare upsert: {}", e)))?;

            for book in books {
                stmt.execute(params![
                    book.id,
                    book.title,
                    book.author,
                    book.subtitle,
                    book.description,
                    book.cover_url,
                    book.published,
                    book.category,
                    book.rating,
                    book.user_rating,
                    book.is_favorite,
                    book.cached_at,
                    book.expires_at,
                ])
                .map_err(|e| AppError::Storage(format!("Failed to upsert book: {}", e)))?;
            }
        }

        tx.commit()
            .map_err(|e| AppError::Storage(format!("Failed to commit upsert: {}", e)))?;

        Ok(books.len())
    }

    /// Get book by ID.
    pub fn get_book(&self, id: &str) -> Result<Option<CachedBook>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, title, author, subtitle, description, cover_url, published,
                    category, rating, user_rating, is_favorite, cached_at, expires_at
             FROM books WHERE id = ?1",
            params![id],
            Self::row_to_book,
        )
        .optional()
        .map_err(|e| AppError::Storage(format!("Failed to get book: {}", e)))
    }

    /// Get books in a category.
    ///
    /// With `include_expired = false` only rows inside their freshness
    /// window are returned; `true` returns everything (offline fallback).
    pub fn get_books_by_category(
        &self,
        category: &str,
        include_expired: bool,
    ) -> Result<Vec<CachedBook>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, title, author, subtitle, description, cover_url, published,
                        category, rating, user_rating, is_favorite, cached_at, expires_at
                 FROM books
                 WHERE category = ?1 AND (?2 OR expires_at > ?3)
                 ORDER BY title",
            )
            .map_err(|e| AppError::Storage(format!("Failed to prepare query: {}", e)))?;

        let books = stmt
            .query_map(
                params![category, include_expired, now_timestamp()],
                Self::row_to_book,
            )
            .map_err(|e| AppError::Storage(format!("Failed to get books: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Storage(format!("Failed to collect books: {}", e)))?;

        Ok(books)
    }

    /// Case-insensitive substring search over title, author and description.
    ///
    /// Result order is store-defined; callers must not read relevance into it.
    pub fn search_books(&self, query: &str, limit: usize) -> Result<Vec<CachedBook>> {
        let pattern = format!("%{}%", query.to_lowercase());
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, title, author, subtitle, description, cover_url, published,
                        category, rating, user_rating, is_favorite, cached_at, expires_at
                 FROM books
                 WHERE lower(title) LIKE ?1
                    OR lower(author) LIKE ?1
                    OR lower(COALESCE(description, '')) LIKE ?1
                 LIMIT ?2",
            )
            .map_err(|e| AppError::Storage(format!("Failed to prepare search: {}", e)))?;

        let books = stmt
            .query_map(params![pattern, limit as i64], Self::row_to_book)
            .map_err(|e| AppError::Storage(format!("Failed to search books: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Storage(format!("Failed to collect search results: {}", e)))?;

        Ok(books)
    }

    /// Delete expired, non-favorited rows. Favorited rows are never
    /// touched by this path.
    pub fn delete_expired_non_favorites(&self) -> Result<usize> {
        let rows = {
            let conn = self.conn.lock();
            conn.execute(
                "DELETE FROM books WHERE expires_at < ?1 AND is_favorite = 0",
                params![now_timestamp()],
            )
            .map_err(|e| AppError::Storage(format!("Failed to purge expired books: {}", e)))?
        };
        Ok(rows)
    }

    fn row_to_book(row: &rusqlite::Row<'_>) -> rusqlite::Result<CachedBook> {
        Ok(CachedBook {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            subtitle: row.get(3)?,
            description: row.get(4)?,
            cover_url: row.get(5)?,
            published: row.get(6)?,
            category: row.get(7)?,
            rating: row.get(8)?,
            user_rating: row.get(9)?,
            is_favorite: row.get(10)?,
            cached_at: row.get(11)?,
            expires_at: row.get(12)?,
        })
    }

    // ========== FAVORITE OPERATIONS ==========

    /// Mark a book favorited, creating the cache row first if it fell out
    /// of cache. Returns the durable entry.
    pub fn add_favorite(&self, book: &CachedBook) -> Result<FavoriteEntry> {
        let now = now_timestamp();
        let entry = {
            let mut conn = self.conn.lock();
            let tx = conn
                .transaction()
                .map_err(|e| AppError::Storage(format!("Failed to start transaction: {}", e)))?;

            tx.execute(
                "INSERT INTO books
                 (id, title, author, subtitle, description, cover_url, published,
                  category, rating, user_rating, is_favorite, cached_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1, ?11, ?12)
                 ON CONFLICT (id) DO UPDATE SET is_favorite = 1",
                params![
                    book.id,
                    book.title,
                    book.author,
                    book.subtitle,
                    book.description,
                    book.cover_url,
                    book.published,
                    book.category,
                    book.rating,
                    book.user_rating,
                    book.cached_at,
                    book.expires_at,
                ],
            )
            .map_err(|e| AppError::Storage(format!("Failed to flag favorite: {}", e)))?;

            let snapshot = FavoriteEntry::from_book(book, now);
            tx.execute(
                "INSERT INTO favorites
                 (book_id, title, author, subtitle, description, cover_url, published,
                  rating, user_rating, status, current_page, total_pages, progress,
                  added_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                 ON CONFLICT (book_id) DO UPDATE SET
                    title = excluded.title,
                    author = excluded.author,
                    subtitle = excluded.subtitle,
                    description = excluded.description,
                    cover_url = excluded.cover_url,
                    published = excluded.published,
                    rating = excluded.rating,
                    updated_at = excluded.updated_at",
                params![
                    snapshot.book_id,
                    snapshot.title,
                    snapshot.author,
                    snapshot.subtitle,
                    snapshot.description,
                    snapshot.cover_url,
                    snapshot.published,
                    snapshot.rating,
                    snapshot.user_rating,
                    snapshot.status.as_str(),
                    snapshot.current_page,
                    snapshot.total_pages,
                    snapshot.progress,
                    snapshot.added_at,
                    snapshot.updated_at,
                ],
            )
            .map_err(|e| AppError::Storage(format!("Failed to save favorite: {}", e)))?;

            let entry = tx
                .query_row(
                    "SELECT book_id, title, author, subtitle, description, cover_url,
                            published, rating, user_rating, status, current_page,
                            total_pages, progress, added_at, updated_at
                     FROM favorites WHERE book_id = ?1",
                    params![book.id],
                    Self::row_to_favorite,
                )
                .map_err(|e| AppError::Storage(format!("Failed to read favorite: {}", e)))?;

            tx.commit()
                .map_err(|e| AppError::Storage(format!("Failed to commit favorite: {}", e)))?;
            entry
        };

        self.publish_favorites();
        Ok(entry)
    }

    /// Clear the favorite flag and drop the durable entry. The cache row
    /// stays and becomes eligible for ordinary TTL eviction.
    pub fn remove_favorite(&self, id: &str) -> Result<bool> {
        let removed = {
            let mut conn = self.conn.lock();
            let tx = conn
                .transaction()
                .map_err(|e| AppError::Storage(format!("Failed to start transaction: {}", e)))?;

            tx.execute(
                "UPDATE books SET is_favorite = 0 WHERE id = ?1",
                params![id],
            )
            .map_err(|e| AppError::Storage(format!("Failed to clear favorite flag: {}", e)))?;

            let rows = tx
                .execute("DELETE FROM favorites WHERE book_id = ?1", params![id])
                .map_err(|e| AppError::Storage(format!("Failed to delete favorite: {}", e)))?;

            tx.commit()
                .map_err(|e| AppError::Storage(format!("Failed to commit unfavorite: {}", e)))?;
            rows > 0
        };

        if removed {
            self.publish_favorites();
        }
        Ok(removed)
    }

    /// Point mutation of the favorite flag. No-op (not an error) when the
    /// id is absent from the cache.
    pub fn set_favorite(&self, id: &str, favorite: bool) -> Result<bool> {
        if !favorite {
            return self.remove_favorite(id);
        }

        let book = match self.get_book(id)? {
            Some(b) => b,
            None => return Ok(false),
        };
        self.add_favorite(&book)?;
        Ok(true)
    }

    /// Set the user's personal rating on both the cache row and the
    /// favorite entry. No-op when the id is absent.
    pub fn set_user_rating(&self, id: &str, rating: f64) -> Result<bool> {
        let now = now_timestamp();
        let (book_rows, fav_rows) = {
            let mut conn = self.conn.lock();
            let tx = conn
                .transaction()
                .map_err(|e| AppError::Storage(format!("Failed to start transaction: {}", e)))?;

            let book_rows = tx
                .execute(
                    "UPDATE books SET user_rating = ?1 WHERE id = ?2",
                    params![rating, id],
                )
                .map_err(|e| AppError::Storage(format!("Failed to set rating: {}", e)))?;

            let fav_rows = tx
                .execute(
                    "UPDATE favorites SET user_rating = ?1, updated_at = ?2 WHERE book_id = ?3",
                    params![rating, now, id],
                )
                .map_err(|e| AppError::Storage(format!("Failed to set favorite rating: {}", e)))?;

            tx.commit()
                .map_err(|e| AppError::Storage(format!("Failed to commit rating: {}", e)))?;
            (book_rows, fav_rows)
        };

        if fav_rows > 0 {
            self.publish_favorites();
        }
        Ok(book_rows > 0 || fav_rows > 0)
    }

    /// Set the reading status of a favorite. Transitions are unconditional.
    pub fn set_reading_status(&self, id: &str, status: ReadingStatus) -> Result<bool> {
        let rows = {
            let conn = self.conn.lock();
            conn.execute(
                "UPDATE favorites SET status = ?1, updated_at = ?2 WHERE book_id = ?3",
                params![status.as_str(), now_timestamp(), id],
            )
            .map_err(|e| AppError::Storage(format!("Failed to set reading status: {}", e)))?
        };

        if rows > 0 {
            self.publish_favorites();
        }
        Ok(rows > 0)
    }

    /// Update page position of a favorite. The stored progress fraction is
    /// clamped to [0, 1].
    pub fn set_reading_progress(
        &self,
        id: &str,
        current_page: i64,
        total_pages: i64,
    ) -> Result<bool> {
        let progress = if total_pages > 0 {
            (current_page as f64 / total_pages as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let rows = {
            let conn = self.conn.lock();
            conn.execute(
                "UPDATE favorites
                 SET current_page = ?1, total_pages = ?2, progress = ?3, updated_at = ?4
                 WHERE book_id = ?5",
                params![current_page, total_pages, progress, now_timestamp(), id],
            )
            .map_err(|e| AppError::Storage(format!("Failed to set progress: {}", e)))?
        };

        if rows > 0 {
            self.publish_favorites();
        }
        Ok(rows > 0)
    }

    /// Get a favorite entry by book ID.
    pub fn get_favorite(&self, id: &str) -> Result<Option<FavoriteEntry>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT book_id, title, author, subtitle, description, cover_url, published,
                    rating, user_rating, status, current_page, total_pages, progress,
                    added_at, updated_at
             FROM favorites WHERE book_id = ?1",
            params![id],
            Self::row_to_favorite,
        )
        .optional()
        .map_err(|e| AppError::Storage(format!("Failed to get favorite: {}", e)))
    }

    /// All favorites, newest first.
    pub fn list_favorites(&self) -> Result<Vec<FavoriteEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT book_id, title, author, subtitle, description, cover_url, published,
                        rating, user_rating, status, current_page, total_pages, progress,
                        added_at, updated_at
                 FROM favorites ORDER BY added_at DESC, book_id DESC",
            )
            .map_err(|e| AppError::Storage(format!("Failed to prepare query: {}", e)))?;

        let favorites = stmt
            .query_map([], Self::row_to_favorite)
            .map_err(|e| AppError::Storage(format!("Failed to list favorites: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Storage(format!("Failed to collect favorites: {}", e)))?;

        Ok(favorites)
    }

    /// Whether a book is currently favorited.
    pub fn is_favorite(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE book_id = ?1)",
            params![id],
            |row| row.get(0),
        )
        .map_err(|e| AppError::Storage(format!("Failed to check favorite: {}", e)))
    }

    fn row_to_favorite(row: &rusqlite::Row<'_>) -> rusqlite::Result<FavoriteEntry> {
        let status: String = row.get(9)?;
        Ok(FavoriteEntry {
            book_id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            subtitle: row.get(3)?,
            description: row.get(4)?,
            cover_url: row.get(5)?,
            published: row.get(6)?,
            rating: row.get(7)?,
            user_rating: row.get(8)?,
            status: ReadingStatus::parse(&status),
            current_page: row.get(10)?,
            total_pages: row.get(11)?,
            progress: row.get(12)?,
            added_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }

    // ========== OBSERVATION ==========

    /// Subscribe to the favorite list. The watch yields the current list
    /// immediately and re-emits after every favorite mutation.
    pub fn observe_favorites(&self) -> FavoritesWatch {
        FavoritesWatch {
            rx: self.favorites_tx.subscribe(),
            primed: false,
        }
    }

    fn publish_favorites(&self) {
        match self.list_favorites() {
            Ok(list) => {
                self.favorites_tx.send_replace(list);
            }
            Err(e) => tracing::warn!(error = %e, "Failed to publish favorites snapshot"),
        }
    }
}
