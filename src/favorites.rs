//! Favorites ledger: the favorite-centric view over the record store.

use crate::db::{CachedBook, Database, FavoriteEntry, FavoritesWatch, ReadingStatus};
use crate::error::Result;
use crate::sync::SyncBridge;
use std::sync::Arc;

/// Mediates all favorite-state transitions.
///
/// Every mutation applies optimistically to local storage and returns its
/// local result; when a sync bridge is attached, a detached task mirrors
/// the change to the cloud afterwards, and its failure is visible only in
/// the log.
pub struct FavoritesLedger {
    db: Database,
    sync: Option<Arc<SyncBridge>>,
}

impl FavoritesLedger {
    /// Create a local-only ledger.
    pub fn new(db: Database) -> Self {
        Self { db, sync: None }
    }

    /// Create a ledger that mirrors mutations through the sync bridge.
    ///
    /// Mirroring runs on detached tokio tasks, so this constructor is for
    /// use inside a tokio runtime.
    pub fn with_sync(db: Database, sync: Arc<SyncBridge>) -> Self {
        Self {
            db,
            sync: Some(sync),
        }
    }

    /// Favorite a book, creating the cache row first if it already fell
    /// out of cache.
    pub fn add(&self, book: &CachedBook) -> Result<FavoriteEntry> {
        let entry = self.db.add_favorite(book)?;
        tracing::info!(book_id = %entry.book_id, title = %entry.title, "Added favorite");
        self.mirror_push(entry.clone());
        Ok(entry)
    }

    /// Unfavorite a book. The cache row is left to ordinary TTL eviction.
    pub fn remove(&self, id: &str) -> Result<()> {
        let removed = self.db.remove_favorite(id)?;
        if removed {
            tracing::info!(book_id = %id, "Removed favorite");
            self.mirror_remove(id);
        }
        Ok(())
    }

    /// Set the user's personal rating.
    ///
    /// The UI rating domain is [1.0, 5.0] but the store does not clamp;
    /// out-of-range values are logged and persisted as given.
    pub fn set_rating(&self, id: &str, rating: f64) -> Result<()> {
        if !(1.0..=5.0).contains(&rating) {
            tracing::warn!(book_id = %id, rating = rating, "Rating outside the usual 1-5 range");
        }

        self.db.set_user_rating(id, rating)?;
        self.mirror_entry(id);
        Ok(())
    }

    /// Set the reading status. Transitions are unconditional.
    pub fn set_status(&self, id: &str, status: ReadingStatus) -> Result<()> {
        let changed = self.db.set_reading_status(id, status)?;
        if changed && status == ReadingStatus::Finished {
            // The reading-statistics collaborator picks this event up.
            tracing::info!(book_id = %id, "Book finished");
        }
        if changed {
            self.mirror_entry(id);
        }
        Ok(())
    }

    /// Update the page position of a favorite.
    pub fn set_progress(&self, id: &str, current_page: i64, total_pages: i64) -> Result<()> {
        let changed = self.db.set_reading_progress(id, current_page, total_pages)?;
        if changed {
            self.mirror_entry(id);
        }
        Ok(())
    }

    /// Whether a book is currently favorited. Storage failure reads as
    /// not-favorited.
    pub fn is_favorite(&self, id: &str) -> bool {
        match self.db.is_favorite(id) {
            Ok(fav) => fav,
            Err(e) => {
                tracing::warn!(book_id = %id, error = %e, "Favorite check failed");
                false
            }
        }
    }

    /// All favorites, newest first. Storage failure reads as empty.
    pub fn all(&self) -> Vec<FavoriteEntry> {
        match self.db.list_favorites() {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(error = %e, "Favorite listing failed");
                Vec::new()
            }
        }
    }

    /// Subscribe to the favorite list: immediate initial emission, then
    /// the full list again after every favorite mutation.
    pub fn observe(&self) -> FavoritesWatch {
        self.db.observe_favorites()
    }

    fn mirror_push(&self, entry: FavoriteEntry) {
        if let Some(bridge) = &self.sync {
            bridge.spawn_push(entry);
        }
    }

    fn mirror_remove(&self, id: &str) {
        if let Some(bridge) = &self.sync {
            bridge.spawn_remove(id.to_string());
        }
    }

    /// Mirror the current entry state after an in-place update; no-op for
    /// books that are not favorites.
    fn mirror_entry(&self, id: &str) {
        if self.sync.is_none() {
            return;
        }
        match self.db.get_favorite(id) {
            Ok(Some(entry)) => self.mirror_push(entry),
            Ok(None) => {}
            Err(e) => tracing::warn!(book_id = %id, error = %e, "Mirror lookup failed"),
        }
    }
}
