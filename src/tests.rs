use crate::cache::BookCache;
use crate::config::Config;
use crate::db::{CachedBook, Database, ReadingStatus, now_timestamp};
use crate::error::{AppError, Result};
use crate::favorites::FavoritesLedger;
use crate::reaper::Reaper;
use crate::source::{BookSource, SourceBook};
use crate::sync::{
    AuthProvider, CloudFavoriteRecord, HttpRemoteStore, RemoteStore, SyncBridge,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn test_db() -> Database {
    Database::open_memory().unwrap()
}

fn source_book(id: &str, title: &str) -> SourceBook {
    SourceBook {
        id: id.to_string(),
        title: title.to_string(),
        authors: vec!["Frank Herbert".to_string()],
        subtitle: None,
        description: Some("A desert planet epic".to_string()),
        cover_url: None,
        published: Some("1965".to_string()),
        rating: Some(4.5),
    }
}

fn cached_book(id: &str, title: &str, category: &str, expires_in: i64) -> CachedBook {
    let now = now_timestamp();
    CachedBook {
        id: id.to_string(),
        title: title.to_string(),
        author: "Frank Herbert".to_string(),
        subtitle: None,
        description: None,
        cover_url: None,
        published: None,
        category: category.to_string(),
        rating: 4.0,
        user_rating: None,
        is_favorite: false,
        cached_at: now,
        expires_at: now + expires_in,
    }
}

struct FakeAuth {
    user: Mutex<Option<String>>,
}

impl FakeAuth {
    fn signed_in(user_id: &str) -> Arc<Self> {
        Arc::new(Self {
            user: Mutex::new(Some(user_id.to_string())),
        })
    }

    fn signed_out() -> Arc<Self> {
        Arc::new(Self {
            user: Mutex::new(None),
        })
    }

    fn set_user(&self, user_id: Option<&str>) {
        *self.user.lock() = user_id.map(str::to_string);
    }
}

impl AuthProvider for FakeAuth {
    fn current_user_id(&self) -> Option<String> {
        self.user.lock().clone()
    }
}

#[derive(Default)]
struct FakeRemote {
    records: Mutex<HashMap<String, CloudFavoriteRecord>>,
    merge_failures: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl FakeRemote {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self, book_id: &str) -> Option<CloudFavoriteRecord> {
        self.records.lock().get(book_id).cloned()
    }

    fn seed(&self, record: CloudFavoriteRecord) {
        self.records.lock().insert(record.book_id.clone(), record);
    }

    fn fail_merge_on(&self, book_id: &str) {
        self.merge_failures.lock().insert(book_id.to_string());
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn get(&self, _user_id: &str, book_id: &str) -> Result<Option<CloudFavoriteRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.lock().get(book_id).cloned())
    }

    async fn list(&self, _user_id: &str) -> Result<Vec<CloudFavoriteRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut records: Vec<_> = self.records.lock().values().cloned().collect();
        records.sort_by(|a, b| a.book_id.cmp(&b.book_id));
        Ok(records)
    }

    async fn set_merge(&self, _user_id: &str, record: &CloudFavoriteRecord) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.merge_failures.lock().contains(&record.book_id) {
            return Err(AppError::Remote("simulated backend failure".to_string()));
        }
        self.records
            .lock()
            .insert(record.book_id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, _user_id: &str, book_id: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.records.lock().remove(book_id);
        Ok(())
    }
}

fn test_bridge(db: &Database, auth: Arc<FakeAuth>, remote: Arc<FakeRemote>) -> SyncBridge {
    SyncBridge::new(db.clone(), auth, remote)
}

struct StaticSource {
    books: Vec<SourceBook>,
}

#[async_trait]
impl BookSource for StaticSource {
    async fn fetch_by_query(&self, query: &str) -> Result<Vec<SourceBook>> {
        let needle = query.to_lowercase();
        Ok(self
            .books
            .iter()
            .filter(|b| b.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn fetch_by_category(&self, _category: &str) -> Result<Vec<SourceBook>> {
        Ok(self.books.clone())
    }
}

// ========== CACHE ==========

#[tokio::test]
async fn fetched_batch_lands_in_cache() {
    let db = test_db();
    let cache = BookCache::with_default_ttl(db.clone());
    assert_eq!(cache.ttl(), Duration::from_secs(3600));

    let source = StaticSource {
        books: vec![source_book("b1", "Dune"), source_book("b2", "Dune Messiah")],
    };

    let fetched = source.fetch_by_category("fiction").await.unwrap();
    cache.cache(&fetched, "fiction").unwrap();
    assert_eq!(cache.by_category("fiction", false).len(), 2);

    let queried = source.fetch_by_query("messiah").await.unwrap();
    assert_eq!(queried.len(), 1);
    cache.cache(&queried, "search:messiah").unwrap();
    assert_eq!(cache.get("b2").unwrap().category, "search:messiah");
}

#[test]
fn cache_upsert_is_idempotent() {
    let db = test_db();
    let cache = BookCache::with_default_ttl(db.clone());

    let batch = vec![source_book("b1", "Dune"), source_book("b2", "Dune Messiah")];
    cache.cache(&batch, "fiction").unwrap();
    cache.cache(&batch, "fiction").unwrap();

    let books = cache.by_category("fiction", false);
    assert_eq!(books.len(), 2);

    let dune = cache.get("b1").unwrap();
    assert_eq!(dune.title, "Dune");
    assert_eq!(dune.author, "Frank Herbert");
    assert_eq!(dune.rating, 4.5);
}

#[test]
fn cache_upsert_preserves_user_fields() {
    let db = test_db();
    let cache = BookCache::with_default_ttl(db.clone());
    let ledger = FavoritesLedger::new(db.clone());

    cache.cache(&[source_book("b1", "Dune")], "fiction").unwrap();
    let book = cache.get("b1").unwrap();
    ledger.add(&book).unwrap();
    ledger.set_rating("b1", 5.0).unwrap();

    // Re-fetch overwrites source fields only.
    let mut refreshed = source_book("b1", "Dune (Deluxe Edition)");
    refreshed.rating = Some(4.8);
    cache.cache(&[refreshed], "fiction").unwrap();

    let book = cache.get("b1").unwrap();
    assert_eq!(book.title, "Dune (Deluxe Edition)");
    assert_eq!(book.rating, 4.8);
    assert!(book.is_favorite);
    assert_eq!(book.user_rating, Some(5.0));
}

#[test]
fn cache_ttl_boundary() {
    let db = test_db();

    let fresh = cached_book("b1", "Fresh", "fiction", 60);
    let expired = cached_book("b2", "Expired", "fiction", -60);
    db.upsert_books(&[fresh, expired]).unwrap();

    let current = db.get_books_by_category("fiction", false).unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].id, "b1");
    assert!(!current[0].is_expired(now_timestamp()));

    let all = db.get_books_by_category("fiction", true).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn cache_category_overwritten_on_refetch() {
    let db = test_db();
    let cache = BookCache::with_default_ttl(db.clone());

    cache.cache(&[source_book("b1", "Dune")], "fiction").unwrap();
    cache.cache(&[source_book("b1", "Dune")], "romance").unwrap();

    assert!(cache.by_category("fiction", true).is_empty());
    assert_eq!(cache.by_category("romance", true).len(), 1);
}

#[test]
fn cache_search_is_case_insensitive() {
    let db = test_db();
    let cache = BookCache::with_default_ttl(db.clone());

    cache
        .cache(
            &[source_book("b1", "Dune"), source_book("b2", "Foundation")],
            "fiction",
        )
        .unwrap();

    let by_title = cache.search("dUnE", 10);
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].id, "b1");

    // Both rows share author and description.
    assert_eq!(cache.search("herbert", 10).len(), 2);
    assert_eq!(cache.search("desert planet", 10).len(), 2);
    assert_eq!(cache.search("herbert", 1).len(), 1);
    assert!(cache.search("zzz-no-match", 10).is_empty());
}

// ========== REAPER / EVICTION ==========

#[test]
fn reaper_spares_favorites() {
    let db = test_db();
    let ledger = FavoritesLedger::new(db.clone());

    let favorite = cached_book("b1", "Kept", "fiction", -60);
    let doomed = cached_book("b2", "Purged", "fiction", -60);
    db.upsert_books(&[favorite.clone(), doomed]).unwrap();
    ledger.add(&favorite).unwrap();

    let removed = db.delete_expired_non_favorites().unwrap();
    assert_eq!(removed, 1);

    assert!(db.get_book("b1").unwrap().is_some());
    assert!(db.get_book("b2").unwrap().is_none());
}

#[test]
fn reaper_run_once_counts_purged_rows() {
    let db = test_db();

    db.upsert_books(&[
        cached_book("b1", "Old A", "fiction", -10),
        cached_book("b2", "Old B", "fiction", -10),
        cached_book("b3", "Fresh", "fiction", 600),
    ])
    .unwrap();

    let reaper = Reaper::new(db.clone(), Duration::from_secs(60));
    assert_eq!(reaper.run_once().unwrap(), 2);
    // Idempotent: a second pass has nothing left to purge.
    assert_eq!(reaper.run_once().unwrap(), 0);
}

#[test]
fn dune_scenario() {
    let db = test_db();
    let ledger = FavoritesLedger::new(db.clone());

    // Cached under "fiction", still inside the freshness window.
    db.upsert_books(&[cached_book("b1", "Dune", "fiction", 1800)])
        .unwrap();
    assert_eq!(db.get_books_by_category("fiction", false).unwrap().len(), 1);

    // Window elapsed: excluded from fresh reads, still there for offline fallback.
    db.upsert_books(&[cached_book("b1", "Dune", "fiction", -100)])
        .unwrap();
    assert!(db.get_books_by_category("fiction", false).unwrap().is_empty());
    assert_eq!(db.get_books_by_category("fiction", true).unwrap().len(), 1);

    // Favoriting exempts the expired row from the reaper.
    let book = db.get_book("b1").unwrap().unwrap();
    ledger.add(&book).unwrap();
    db.delete_expired_non_favorites().unwrap();
    assert!(db.get_book("b1").unwrap().is_some());
}

// ========== FAVORITES ==========

#[test]
fn favorite_round_trip() {
    let db = test_db();
    let ledger = FavoritesLedger::new(db.clone());

    let book = cached_book("b1", "Dune", "fiction", 3600);
    db.upsert_books(&[book.clone()]).unwrap();

    ledger.add(&book).unwrap();
    assert!(ledger.is_favorite("b1"));

    ledger.remove("b1").unwrap();
    assert!(!ledger.is_favorite("b1"));

    // The cache row survives an unfavorite until it separately expires.
    let remaining = db.get_book("b1").unwrap().unwrap();
    assert!(!remaining.is_favorite);
}

#[test]
fn favorite_survives_for_evicted_book() {
    let db = test_db();
    let ledger = FavoritesLedger::new(db.clone());

    // Favoriting a book that fell out of cache recreates the row.
    let book = cached_book("b1", "Dune", "fiction", 3600);
    let entry = ledger.add(&book).unwrap();
    assert_eq!(entry.title, "Dune");

    let row = db.get_book("b1").unwrap().unwrap();
    assert!(row.is_favorite);
}

#[test]
fn favorites_ordered_newest_first() {
    let db = test_db();
    let ledger = FavoritesLedger::new(db.clone());

    ledger.add(&cached_book("b1", "First", "fiction", 3600)).unwrap();
    ledger.add(&cached_book("b2", "Second", "fiction", 3600)).unwrap();

    let all = ledger.all();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].book_id, "b2");
    assert_eq!(all[1].book_id, "b1");
}

#[test]
fn rating_persisted_unclamped() {
    let db = test_db();
    let ledger = FavoritesLedger::new(db.clone());

    ledger.add(&cached_book("b1", "Dune", "fiction", 3600)).unwrap();
    ledger.set_rating("b1", 7.5).unwrap();

    let entry = db.get_favorite("b1").unwrap().unwrap();
    assert_eq!(entry.user_rating, Some(7.5));

    let row = db.get_book("b1").unwrap().unwrap();
    assert_eq!(row.user_rating, Some(7.5));
}

#[test]
fn rating_on_absent_id_is_noop() {
    let db = test_db();
    let ledger = FavoritesLedger::new(db.clone());

    ledger.set_rating("missing", 4.0).unwrap();
    assert!(db.get_book("missing").unwrap().is_none());
}

#[test]
fn status_transitions_are_unconditional() {
    let db = test_db();
    let ledger = FavoritesLedger::new(db.clone());

    ledger.add(&cached_book("b1", "Dune", "fiction", 3600)).unwrap();

    ledger.set_status("b1", ReadingStatus::Finished).unwrap();
    assert_eq!(
        db.get_favorite("b1").unwrap().unwrap().status,
        ReadingStatus::Finished
    );

    // No state-machine guard: Finished can go straight back to Unstarted.
    ledger.set_status("b1", ReadingStatus::Unstarted).unwrap();
    assert_eq!(
        db.get_favorite("b1").unwrap().unwrap().status,
        ReadingStatus::Unstarted
    );
}

#[test]
fn progress_fraction_clamped() {
    let db = test_db();
    let ledger = FavoritesLedger::new(db.clone());

    ledger.add(&cached_book("b1", "Dune", "fiction", 3600)).unwrap();

    ledger.set_progress("b1", 150, 300).unwrap();
    assert_eq!(db.get_favorite("b1").unwrap().unwrap().progress, 0.5);

    ledger.set_progress("b1", 500, 300).unwrap();
    assert_eq!(db.get_favorite("b1").unwrap().unwrap().progress, 1.0);

    ledger.set_progress("b1", 10, 0).unwrap();
    assert_eq!(db.get_favorite("b1").unwrap().unwrap().progress, 0.0);
}

#[test]
fn set_favorite_point_mutation() {
    let db = test_db();

    // Absent id is a no-op, not an error.
    assert!(!db.set_favorite("missing", true).unwrap());

    db.upsert_books(&[cached_book("b1", "Dune", "fiction", 3600)])
        .unwrap();
    assert!(db.set_favorite("b1", true).unwrap());
    assert!(db.is_favorite("b1").unwrap());

    assert!(db.set_favorite("b1", false).unwrap());
    assert!(!db.is_favorite("b1").unwrap());
}

#[tokio::test]
async fn observe_favorites_emits_initially_and_on_mutation() {
    let db = test_db();
    let ledger = FavoritesLedger::new(db.clone());

    let mut watch = ledger.observe();
    assert!(watch.next().await.unwrap().is_empty());

    ledger.add(&cached_book("b1", "Dune", "fiction", 3600)).unwrap();
    let list = watch.next().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].book_id, "b1");

    ledger.set_rating("b1", 5.0).unwrap();
    let list = watch.next().await.unwrap();
    assert_eq!(list[0].user_rating, Some(5.0));

    ledger.remove("b1").unwrap();
    assert!(watch.next().await.unwrap().is_empty());
}

#[test]
fn favorites_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.db");

    {
        let db = Database::open(&path).unwrap();
        let ledger = FavoritesLedger::new(db.clone());
        ledger.add(&cached_book("b1", "Dune", "fiction", -60)).unwrap();
        db.delete_expired_non_favorites().unwrap();
    }

    let db = Database::open(&path).unwrap();
    let favorites = db.list_favorites().unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].title, "Dune");
    // The reopened store seeds its watch channel from disk.
    assert_eq!(db.observe_favorites().latest().len(), 1);
}

// ========== CLOUD SYNC ==========

#[test]
fn http_remote_store_builds() {
    assert!(HttpRemoteStore::new("https://api.example.com/").is_ok());
}

#[test]
fn auth_provider_signed_in_check() {
    assert!(FakeAuth::signed_in("user-1").is_signed_in());
    assert!(!FakeAuth::signed_out().is_signed_in());
}

#[tokio::test]
async fn sync_short_circuits_when_signed_out() {
    let db = test_db();
    let remote = FakeRemote::new();
    let bridge = test_bridge(&db, FakeAuth::signed_out(), remote.clone());
    let ledger = FavoritesLedger::new(db.clone());

    let entry = ledger.add(&cached_book("b1", "Dune", "fiction", 3600)).unwrap();

    assert!(bridge.push_favorite(&entry).await.unwrap_err().is_not_authenticated());
    assert!(bridge.pull_once().await.unwrap_err().is_not_authenticated());
    assert!(bridge.bulk_push(&[entry]).await.unwrap_err().is_not_authenticated());
    assert!(bridge.remove_remote("b1").await.unwrap_err().is_not_authenticated());

    // No network call was attempted, and local state is untouched.
    assert_eq!(remote.call_count(), 0);
    assert!(ledger.is_favorite("b1"));
}

#[tokio::test]
async fn push_mirrors_entry_with_millis_timestamps() {
    let db = test_db();
    let remote = FakeRemote::new();
    let bridge = test_bridge(&db, FakeAuth::signed_in("user-1"), remote.clone());
    let ledger = FavoritesLedger::new(db.clone());

    let entry = ledger.add(&cached_book("b1", "Dune", "fiction", 3600)).unwrap();
    bridge.push_favorite(&entry).await.unwrap();

    let record = remote.record("b1").unwrap();
    assert_eq!(record.title, "Dune");
    assert_eq!(record.reading_status, "UNSTARTED");
    assert_eq!(record.added_timestamp, entry.added_at * 1000);
    assert_eq!(record.last_updated, entry.updated_at * 1000);
}

#[tokio::test]
async fn push_skipped_when_remote_is_newer() {
    let db = test_db();
    let remote = FakeRemote::new();
    let bridge = test_bridge(&db, FakeAuth::signed_in("user-1"), remote.clone());
    let ledger = FavoritesLedger::new(db.clone());

    let entry = ledger.add(&cached_book("b1", "Dune", "fiction", 3600)).unwrap();

    // Another device wrote this favorite later.
    let mut newer = CloudFavoriteRecord::from_entry(&entry);
    newer.title = "Dune (other device)".to_string();
    newer.last_updated = (entry.updated_at + 3600) * 1000;
    remote.seed(newer.clone());

    bridge.push_favorite(&entry).await.unwrap();
    assert_eq!(remote.record("b1").unwrap(), newer);
}

#[tokio::test]
async fn bulk_push_continues_past_failures() {
    let db = test_db();
    let remote = FakeRemote::new();
    let bridge = test_bridge(&db, FakeAuth::signed_in("user-1"), remote.clone());
    let ledger = FavoritesLedger::new(db.clone());

    for id in ["b1", "b2", "b3"] {
        ledger.add(&cached_book(id, id, "fiction", 3600)).unwrap();
    }
    remote.fail_merge_on("b2");

    let pushed = bridge.push_all().await.unwrap();
    assert_eq!(pushed, 2);
    assert!(remote.record("b1").is_some());
    assert!(remote.record("b2").is_none());
    assert!(remote.record("b3").is_some());
}

#[tokio::test]
async fn pull_once_returns_remote_collection() {
    let db = test_db();
    let remote = FakeRemote::new();
    let bridge = test_bridge(&db, FakeAuth::signed_in("user-1"), remote.clone());
    let ledger = FavoritesLedger::new(db.clone());

    let entry = ledger.add(&cached_book("b1", "Dune", "fiction", 3600)).unwrap();
    remote.seed(CloudFavoriteRecord::from_entry(&entry));

    let records = bridge.pull_once().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].book_id, "b1");
}

#[tokio::test]
async fn live_observation_recovers_from_failures() {
    let db = test_db();
    let auth = FakeAuth::signed_in("user-1");
    let remote = FakeRemote::new();
    let bridge = test_bridge(&db, auth.clone(), remote.clone());

    let mut live = bridge.observe_live(Duration::from_millis(10));

    // Immediate initial snapshot.
    let first = tokio::time::timeout(Duration::from_secs(1), live.next())
        .await
        .unwrap()
        .unwrap();
    assert!(first.unwrap().is_empty());

    // A remote write shows up on a later poll.
    let entry = FavoritesLedger::new(db.clone())
        .add(&cached_book("b1", "Dune", "fiction", 3600))
        .unwrap();
    remote.seed(CloudFavoriteRecord::from_entry(&entry));

    let next = tokio::time::timeout(Duration::from_secs(1), live.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next.unwrap().len(), 1);

    // Sign-out surfaces as a failure element, not a terminated stream.
    auth.set_user(None);
    let failed = tokio::time::timeout(Duration::from_secs(1), live.next())
        .await
        .unwrap()
        .unwrap();
    assert!(failed.unwrap_err().is_not_authenticated());

    auth.set_user(Some("user-1"));
    let recovered = tokio::time::timeout(Duration::from_secs(1), live.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recovered.unwrap().len(), 1);

    drop(live);
}

#[tokio::test]
async fn ledger_mirrors_mutations_when_attached() {
    let db = test_db();
    let remote = FakeRemote::new();
    let bridge = Arc::new(test_bridge(&db, FakeAuth::signed_in("user-1"), remote.clone()));
    let ledger = FavoritesLedger::with_sync(db.clone(), bridge);

    ledger.add(&cached_book("b1", "Dune", "fiction", 3600)).unwrap();

    // The detached push lands shortly after the local write returns.
    for _ in 0..100 {
        if remote.record("b1").is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(remote.record("b1").is_some());

    ledger.remove("b1").unwrap();
    for _ in 0..100 {
        if remote.record("b1").is_none() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(remote.record("b1").is_none());
}

#[test]
fn cloud_record_wire_field_names() {
    let db = test_db();
    let ledger = FavoritesLedger::new(db.clone());
    let entry = ledger.add(&cached_book("b1", "Dune", "fiction", 3600)).unwrap();

    let value = serde_json::to_value(CloudFavoriteRecord::from_entry(&entry)).unwrap();
    let obj = value.as_object().unwrap();

    for key in [
        "bookId",
        "title",
        "author",
        "subtitle",
        "coverImageUrl",
        "description",
        "rating",
        "publishedDate",
        "readingStatus",
        "userRating",
        "addedTimestamp",
        "lastUpdated",
    ] {
        assert!(obj.contains_key(key), "missing wire field {}", key);
    }
}

// ========== CONFIG ==========

#[test]
fn config_parse_toml() {
    let toml = r#"
[database]
path = "/tmp/test.db"

[cache]
ttl_seconds = 120

[reaper]
interval_seconds = 600

[remote]
base_url = "https://api.example.com"
poll_interval_seconds = 5
"#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.database.path.to_str(), Some("/tmp/test.db"));
    assert_eq!(config.cache.ttl_seconds, 120);
    assert_eq!(config.reaper.interval_seconds, 600);
    assert!(config.remote.enabled());
    assert_eq!(config.remote.poll_interval_seconds, 5);
}

#[test]
fn config_default_values() {
    let config = Config::default();
    assert_eq!(config.cache.ttl_seconds, 3600);
    assert_eq!(config.reaper.interval_seconds, 86_400);
    assert!(!config.remote.enabled());
    assert_eq!(config.remote.poll_interval_seconds, 30);
}

#[test]
fn config_generated_default_parses() {
    let config: Config = toml::from_str(&Config::generate_default()).unwrap();
    assert_eq!(config.cache.ttl_seconds, 3600);
}

#[test]
fn config_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[cache]\nttl_seconds = 42\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.cache.ttl_seconds, 42);
    assert_eq!(config.reaper.interval_seconds, 86_400);

    assert!(Config::load(&dir.path().join("missing.toml")).is_err());
}
