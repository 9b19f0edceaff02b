//! Remote collaborator interfaces: authentication and the per-user
//! favorite document collection.

use crate::db::{FavoriteEntry, ReadingStatus};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout for remote requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Authentication provider.
///
/// Consulted on every cloud call; the bridge never caches identity, so a
/// sign-out takes effect on the very next operation.
pub trait AuthProvider: Send + Sync {
    /// Current user id, or `None` when signed out.
    fn current_user_id(&self) -> Option<String>;

    /// Whether a user is signed in.
    fn is_signed_in(&self) -> bool {
        self.current_user_id().is_some()
    }
}

/// Remote mirror of a favorite, one document per book within a user-scoped
/// collection. Timestamps are epoch milliseconds on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFavoriteRecord {
    /// Book ID (document key).
    pub book_id: String,
    /// Book title.
    pub title: String,
    /// Primary author(s).
    pub author: String,
    /// Subtitle.
    pub subtitle: Option<String>,
    /// Cover image URL.
    pub cover_image_url: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Source-provided rating.
    pub rating: f64,
    /// Publication date.
    pub published_date: Option<String>,
    /// Reading status enum name.
    pub reading_status: String,
    /// User's personal rating.
    pub user_rating: Option<f64>,
    /// When the book was favorited (epoch millis).
    pub added_timestamp: i64,
    /// Last mutation, the merge tiebreak (epoch millis).
    pub last_updated: i64,
}

impl CloudFavoriteRecord {
    /// Build the wire record from a local entry. Local epoch seconds
    /// become epoch milliseconds here and nowhere else.
    pub fn from_entry(entry: &FavoriteEntry) -> Self {
        Self {
            book_id: entry.book_id.clone(),
            title: entry.title.clone(),
            author: entry.author.clone(),
            subtitle: entry.subtitle.clone(),
            cover_image_url: entry.cover_url.clone(),
            description: entry.description.clone(),
            rating: entry.rating,
            published_date: entry.published.clone(),
            reading_status: entry.status.as_str().to_string(),
            user_rating: entry.user_rating,
            added_timestamp: entry.added_at * 1000,
            last_updated: entry.updated_at * 1000,
        }
    }

    /// Parsed reading status.
    pub fn status(&self) -> ReadingStatus {
        ReadingStatus::parse(&self.reading_status)
    }
}

/// Per-user remote document collection.
///
/// `set_merge` has merge semantics: fields absent from the payload are
/// left untouched on the backend.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch one document, `None` when absent.
    async fn get(&self, user_id: &str, book_id: &str) -> Result<Option<CloudFavoriteRecord>>;

    /// Fetch the user's full favorite collection.
    async fn list(&self, user_id: &str) -> Result<Vec<CloudFavoriteRecord>>;

    /// Upsert one document with merge semantics.
    async fn set_merge(&self, user_id: &str, record: &CloudFavoriteRecord) -> Result<()>;

    /// Delete one document.
    async fn delete(&self, user_id: &str, book_id: &str) -> Result<()>;
}

/// REST implementation of the remote document store.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteStore {
    /// Create a client for the given backend base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Remote(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self, user_id: &str) -> String {
        format!("{}/users/{}/favorites", self.base_url, user_id)
    }

    fn document_url(&self, user_id: &str, book_id: &str) -> String {
        format!("{}/users/{}/favorites/{}", self.base_url, user_id, book_id)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let preview: String = body.chars().take(256).collect();
        Err(AppError::Remote(format!("{}: {}", status, preview)))
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn get(&self, user_id: &str, book_id: &str) -> Result<Option<CloudFavoriteRecord>> {
        let response = self
            .client
            .get(self.document_url(user_id, book_id))
            .send()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::check_status(response).await?;
        let record = response
            .json::<CloudFavoriteRecord>()
            .await
            .map_err(|e| AppError::Remote(format!("Invalid response body: {}", e)))?;
        Ok(Some(record))
    }

    async fn list(&self, user_id: &str) -> Result<Vec<CloudFavoriteRecord>> {
        let response = self
            .client
            .get(self.collection_url(user_id))
            .send()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;

        let response = Self::check_status(response).await?;
        response
            .json::<Vec<CloudFavoriteRecord>>()
            .await
            .map_err(|e| AppError::Remote(format!("Invalid response body: {}", e)))
    }

    async fn set_merge(&self, user_id: &str, record: &CloudFavoriteRecord) -> Result<()> {
        let response = self
            .client
            .patch(self.document_url(user_id, &record.book_id))
            .json(record)
            .send()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;

        Self::check_status(response).await?;
        Ok(())
    }

    async fn delete(&self, user_id: &str, book_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.document_url(user_id, book_id))
            .send()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            // Deleting an absent document is not a fault.
            return Ok(());
        }

        Self::check_status(response).await?;
        Ok(())
    }
}
