//! shelfsync: offline book cache and favorites synchronization engine.
//!
//! This crate provides the persistence core of a reading-discovery app:
//! a time-expiring SQLite cache of remotely fetched book records, a
//! durable favorites collection layered on top of it, and best-effort
//! reconciliation of favorite state with a per-user cloud collection.
//!
//! # Features
//!
//! - Idempotent batch caching with a freshness window
//! - Favorites exempt from cache expiration
//! - Reactive observation of the favorite list
//! - User ratings, reading status and reading progress
//! - Offline-first cloud mirroring with last-writer-wins pushes
//! - Scheduled purge of expired, non-favorited entries

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Cache manager.
pub mod cache;
/// Configuration.
pub mod config;
/// Database operations.
pub mod db;
/// Error types.
pub mod error;
/// Favorites ledger.
pub mod favorites;
/// Scheduled cache cleanup.
pub mod reaper;
/// Remote catalog interface.
pub mod source;
/// Cloud favorites synchronization.
pub mod sync;

#[cfg(test)]
mod tests;

pub use cache::BookCache;
pub use config::Config;
pub use db::{CachedBook, Database, FavoriteEntry, ReadingStatus};
pub use error::{AppError, Result};
pub use favorites::FavoritesLedger;
pub use reaper::Reaper;
pub use source::{BookSource, SourceBook};
pub use sync::{AuthProvider, CloudFavoriteRecord, HttpRemoteStore, RemoteStore, SyncBridge};
