//! Freshness-window cache over a [`SupplierStore`]

use super::store::{CacheSnapshot, SupplierStore};
use super::{build_directory, filter_by_category, supplier_query};
use chrono::{DateTime, Duration, Utc};
use erp_client::EntitySource;
use shared::{Supplier, SupplierCategory};
use std::sync::Arc;

pub const DEFAULT_FRESHNESS_MINUTES: i64 = 59;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing stored, or the stored file is unreadable
    Missing,
    /// Stored, but at least one freshness window old
    Stale,
    Fresh,
}

/// Supplier directory cache
///
/// Concurrent callers that observe a stale cache may each refresh it; the
/// last write wins.
#[derive(Clone)]
pub struct SupplierCache {
    store: Arc<dyn SupplierStore>,
    source: Arc<dyn EntitySource>,
    freshness: Duration,
}

impl SupplierCache {
    pub fn new(store: Arc<dyn SupplierStore>, source: Arc<dyn EntitySource>) -> Self {
        Self {
            store,
            source,
            freshness: Duration::minutes(DEFAULT_FRESHNESS_MINUTES),
        }
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    fn state_of(&self, snapshot: Option<&CacheSnapshot>, now: DateTime<Utc>) -> CacheState {
        match snapshot {
            None => CacheState::Missing,
            Some(snapshot) if now - snapshot.written_at < self.freshness => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }

    pub fn state(&self) -> CacheState {
        self.state_of(self.store.read().as_ref(), Utc::now())
    }

    pub fn is_fresh(&self) -> bool {
        self.state() == CacheState::Fresh
    }

    /// Stored directory regardless of age
    pub fn load(&self) -> Option<Vec<Supplier>> {
        self.store.read().map(|snapshot| snapshot.suppliers)
    }

    /// Refetch the full directory and persist it.
    ///
    /// An incomplete fetch is never persisted: its rows are returned as they
    /// are, or the stored directory when it delivered nothing. An empty
    /// directory never replaces a non-empty stored one.
    pub async fn refresh(&self) -> Vec<Supplier> {
        let outcome = self.source.fetch(&supplier_query()).await;
        let suppliers = build_directory(&outcome.rows);

        if let Some(failure) = &outcome.failure {
            tracing::warn!(
                source = self.source.name(),
                failed_page = failure.page,
                error = %failure.error,
                suppliers = suppliers.len(),
                "Supplier fetch incomplete, cache not updated"
            );
            if suppliers.is_empty() {
                return self.load().unwrap_or_default();
            }
            return suppliers;
        }

        if suppliers.is_empty()
            && let Some(stored) = self.load().filter(|stored| !stored.is_empty())
        {
            tracing::warn!(
                source = self.source.name(),
                stored = stored.len(),
                "Supplier fetch returned no rows, keeping stored directory"
            );
            return stored;
        }

        match self.store.write(&suppliers) {
            Ok(written_at) => tracing::info!(
                suppliers = suppliers.len(),
                written_at = %written_at,
                "Supplier cache refreshed"
            ),
            Err(e) => tracing::warn!(error = %e, "Failed to persist supplier cache"),
        }
        suppliers
    }

    /// Full directory, refreshed first when missing or stale
    pub async fn directory(&self) -> Vec<Supplier> {
        let snapshot = self.store.read();
        match self.state_of(snapshot.as_ref(), Utc::now()) {
            CacheState::Fresh => {
                let suppliers = snapshot.map(|s| s.suppliers).unwrap_or_default();
                tracing::debug!(suppliers = suppliers.len(), "Supplier cache hit");
                suppliers
            }
            state => {
                tracing::debug!(state = ?state, "Supplier cache refresh required");
                self.refresh().await
            }
        }
    }

    /// Suppliers of one category, served from the cache when fresh
    pub async fn get_or_refresh(&self, category: SupplierCategory) -> Vec<Supplier> {
        Self::filter(&self.directory().await, category)
    }

    pub fn filter(suppliers: &[Supplier], category: SupplierCategory) -> Vec<Supplier> {
        filter_by_category(suppliers, category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suppliers::MemorySupplierStore;
    use async_trait::async_trait;
    use erp_client::{ClientError, FetchOutcome, ODataQuery};
    use serde_json::json;
    use shared::RawRow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeDirectory {
        rows: Vec<RawRow>,
        fail_at: Option<usize>,
        calls: AtomicUsize,
    }

    impl FakeDirectory {
        fn new(fail_at: Option<usize>) -> Arc<Self> {
            let rows = [
                json!({"Fornecedor": "1", "NomeFornecedor": "Cooperativa", "CNPJ": "111"}),
                json!({"Fornecedor": "2", "NomeFornecedor": "Joao", "CPF": "222"}),
            ]
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
            Arc::new(Self {
                rows,
                fail_at,
                calls: AtomicUsize::new(0),
            })
        }

        fn empty() -> Arc<Self> {
            Arc::new(Self {
                rows: Vec::new(),
                fail_at: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EntitySource for FakeDirectory {
        fn name(&self) -> &str {
            "suppliers"
        }

        async fn fetch(&self, _query: &ODataQuery) -> FetchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_at {
                None => FetchOutcome::complete(self.rows.clone(), 1),
                Some(keep) => {
                    let error = ClientError::Status {
                        status: 503,
                        body: String::new(),
                    };
                    let rows = self.rows.iter().take(keep).cloned().collect();
                    FetchOutcome::failed(rows, 2, error)
                }
            }
        }
    }

    fn cached(name: &str) -> Vec<Supplier> {
        vec![Supplier {
            id: "9".into(),
            name: name.into(),
            tax_number: "999".into(),
            category: Some(SupplierCategory::Individual),
        }]
    }

    fn aged(minutes: i64) -> Arc<MemorySupplierStore> {
        Arc::new(MemorySupplierStore::with_snapshot(
            cached("Cached"),
            Utc::now() - Duration::minutes(minutes),
        ))
    }

    #[tokio::test]
    async fn test_fresh_cache_is_served_without_fetch() {
        let store = aged(58);
        let source = FakeDirectory::new(None);
        let cache = SupplierCache::new(store.clone(), source.clone());

        assert_eq!(cache.state(), CacheState::Fresh);
        let suppliers = cache.get_or_refresh(SupplierCategory::Individual).await;

        assert_eq!(suppliers, cached("Cached"));
        assert_eq!(source.calls(), 0);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_stale_cache_refetches_once() {
        let store = aged(60);
        let source = FakeDirectory::new(None);
        let cache = SupplierCache::new(store.clone(), source.clone());

        assert_eq!(cache.state(), CacheState::Stale);
        let individuals = cache.get_or_refresh(SupplierCategory::Individual).await;
        let organizations = cache.get_or_refresh(SupplierCategory::Organization).await;

        assert_eq!(source.calls(), 1);
        assert_eq!(store.writes(), 1);
        assert_eq!(individuals.len(), 1);
        assert_eq!(individuals[0].id, "2");
        assert_eq!(organizations[0].id, "1");
        assert!(cache.is_fresh());
    }

    #[tokio::test]
    async fn test_missing_cache_is_populated() {
        let store = Arc::new(MemorySupplierStore::new());
        let source = FakeDirectory::new(None);
        let cache = SupplierCache::new(store.clone(), source.clone());

        assert_eq!(cache.state(), CacheState::Missing);
        let directory = cache.directory().await;

        assert_eq!(directory.len(), 2);
        assert_eq!(cache.load(), Some(directory));
    }

    #[tokio::test]
    async fn test_incomplete_refresh_is_not_persisted() {
        let store = aged(120);
        let source = FakeDirectory::new(Some(1));
        let cache = SupplierCache::new(store.clone(), source);

        let directory = cache.directory().await;

        assert_eq!(directory.len(), 1);
        assert_eq!(store.writes(), 0);
        assert_eq!(cache.load(), Some(cached("Cached")));
    }

    #[tokio::test]
    async fn test_failed_refresh_falls_back_to_stored_directory() {
        let store = aged(120);
        let cache = SupplierCache::new(store, FakeDirectory::new(Some(0)));

        assert_eq!(cache.refresh().await, cached("Cached"));
    }

    #[tokio::test]
    async fn test_custom_freshness_window() {
        let cache = SupplierCache::new(aged(10), FakeDirectory::new(None))
            .with_freshness(Duration::minutes(5));
        assert_eq!(cache.state(), CacheState::Stale);
    }

    #[tokio::test]
    async fn test_empty_refresh_keeps_stored_directory() {
        let store = aged(120);
        let source = FakeDirectory::empty();
        let cache = SupplierCache::new(store.clone(), source.clone());

        let directory = cache.directory().await;

        assert_eq!(directory, cached("Cached"));
        assert_eq!(source.calls(), 1);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_empty_refresh_without_stored_directory_is_persisted() {
        let store = Arc::new(MemorySupplierStore::new());
        let cache = SupplierCache::new(store.clone(), FakeDirectory::empty());

        assert!(cache.refresh().await.is_empty());
        assert_eq!(store.writes(), 1);
    }
}
