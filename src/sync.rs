//! Cloud favorites synchronization.
//!
//! Best-effort mirroring of the local favorites into a per-user remote
//! collection. Local operations never wait on the network; a missed push
//! is corrected by the next mutation to the same entry or by the bulk
//! reconciliation that runs at sign-in.

pub mod remote;

pub use remote::{AuthProvider, CloudFavoriteRecord, HttpRemoteStore, RemoteStore};

use crate::db::{Database, FavoriteEntry};
use crate::error::{AppError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Bridge between the local favorites and their remote mirror.
///
/// Holds no identity between calls: the user id is re-resolved from the
/// [`AuthProvider`] on every operation, so a sign-out mid-flight simply
/// makes the next call fail with [`AppError::NotAuthenticated`].
#[derive(Clone)]
pub struct SyncBridge {
    db: Database,
    auth: Arc<dyn AuthProvider>,
    remote: Arc<dyn RemoteStore>,
}

/// Live subscription to the remote favorite collection.
///
/// Errors are delivered as stream elements so a transient fault does not
/// terminate the subscription. Dropping the handle aborts the underlying
/// poll task; no further elements are delivered.
pub struct LiveFavorites {
    rx: mpsc::Receiver<Result<Vec<CloudFavoriteRecord>>>,
    task: JoinHandle<()>,
}

impl LiveFavorites {
    /// Next snapshot or failure element. `None` after cancellation.
    pub async fn next(&mut self) -> Option<Result<Vec<CloudFavoriteRecord>>> {
        self.rx.recv().await
    }
}

impl Drop for LiveFavorites {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl SyncBridge {
    /// Create a bridge over the shared store and the two remote
    /// collaborators.
    pub fn new(db: Database, auth: Arc<dyn AuthProvider>, remote: Arc<dyn RemoteStore>) -> Self {
        Self { db, auth, remote }
    }

    fn require_user(&self) -> Result<String> {
        self.auth.current_user_id().ok_or(AppError::NotAuthenticated)
    }

    /// Push a single favorite to the remote collection.
    ///
    /// The remote copy wins when its `lastUpdated` is newer than the
    /// local entry's; a stale push never overwrites a newer remote write.
    pub async fn push_favorite(&self, entry: &FavoriteEntry) -> Result<()> {
        let user_id = self.require_user()?;
        self.push_with_user(&user_id, entry).await
    }

    async fn push_with_user(&self, user_id: &str, entry: &FavoriteEntry) -> Result<()> {
        let record = CloudFavoriteRecord::from_entry(entry);

        if let Some(existing) = self.remote.get(user_id, &entry.book_id).await?
            && existing.last_updated > record.last_updated
        {
            tracing::debug!(book_id = %entry.book_id, "Remote copy is newer, push skipped");
            return Ok(());
        }

        self.remote.set_merge(user_id, &record).await?;
        tracing::debug!(book_id = %entry.book_id, "Pushed favorite");
        Ok(())
    }

    /// Delete a favorite from the remote collection.
    pub async fn remove_remote(&self, book_id: &str) -> Result<()> {
        let user_id = self.require_user()?;
        self.remote.delete(&user_id, book_id).await?;
        tracing::debug!(book_id = %book_id, "Removed remote favorite");
        Ok(())
    }

    /// One-shot fetch of the user's full remote favorite set.
    pub async fn pull_once(&self) -> Result<Vec<CloudFavoriteRecord>> {
        let user_id = self.require_user()?;
        self.remote.list(&user_id).await
    }

    /// Push each entry independently, best-effort.
    ///
    /// One entry's failure does not abort the remaining pushes. Returns
    /// the number of successful pushes.
    pub async fn bulk_push(&self, entries: &[FavoriteEntry]) -> Result<usize> {
        let user_id = self.require_user()?;

        let mut pushed = 0;
        for entry in entries {
            match self.push_with_user(&user_id, entry).await {
                Ok(()) => pushed += 1,
                Err(e) => {
                    tracing::warn!(book_id = %entry.book_id, error = %e, "Bulk push entry failed")
                }
            }
        }

        tracing::info!(pushed = pushed, total = entries.len(), "Bulk push complete");
        Ok(pushed)
    }

    /// Seed the cloud from the full local favorite set. Run once at
    /// sign-in to catch up favorites accumulated while signed out.
    pub async fn push_all(&self) -> Result<usize> {
        let entries = self.db.list_favorites()?;
        self.bulk_push(&entries).await
    }

    /// Subscribe to the remote collection via polling.
    ///
    /// Emits the current snapshot immediately, then again whenever the
    /// collection changes. Authentication is re-checked on every poll. A
    /// failing poll delivers one failure element; further polls stay
    /// silent until the fault clears, then the next snapshot is emitted.
    pub fn observe_live(&self, poll_interval: Duration) -> LiveFavorites {
        let auth = self.auth.clone();
        let remote = self.remote.clone();
        let (tx, rx) = mpsc::channel(8);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            let mut last: Option<Vec<CloudFavoriteRecord>> = None;
            let mut faulted = false;

            loop {
                ticker.tick().await;

                let item = match auth.current_user_id() {
                    Some(user_id) => remote.list(&user_id).await,
                    None => Err(AppError::NotAuthenticated),
                };

                match item {
                    Ok(records) => {
                        faulted = false;
                        if last.as_ref() == Some(&records) {
                            continue;
                        }
                        last = Some(records.clone());
                        if tx.send(Ok(records)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        last = None;
                        if faulted {
                            continue;
                        }
                        faulted = true;
                        if tx.send(Err(e)).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        LiveFavorites { rx, task }
    }

    /// Detached push: local mutation results stay untouched by network
    /// faults, which surface only in the log.
    pub fn spawn_push(&self, entry: FavoriteEntry) {
        let bridge = self.clone();
        tokio::spawn(async move {
            match bridge.push_favorite(&entry).await {
                Ok(()) => {}
                Err(e) if e.is_not_authenticated() => {
                    tracing::debug!(book_id = %entry.book_id, "Cloud push skipped, not signed in")
                }
                Err(e) => {
                    tracing::warn!(book_id = %entry.book_id, error = %e, "Cloud push failed")
                }
            }
        });
    }

    /// Detached remote delete, same failure policy as [`Self::spawn_push`].
    pub fn spawn_remove(&self, book_id: String) {
        let bridge = self.clone();
        tokio::spawn(async move {
            match bridge.remove_remote(&book_id).await {
                Ok(()) => {}
                Err(e) if e.is_not_authenticated() => {
                    tracing::debug!(book_id = %book_id, "Cloud delete skipped, not signed in")
                }
                Err(e) => {
                    tracing::warn!(book_id = %book_id, error = %e, "Cloud delete failed")
                }
            }
        });
    }
}
