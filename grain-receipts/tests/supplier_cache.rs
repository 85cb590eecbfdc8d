//! Supplier cache over the file store: freshness is the file modification time.

use async_trait::async_trait;
use erp_client::{EntitySource, FetchOutcome, ODataQuery};
use grain_receipts::{CacheState, FileSupplierStore, SupplierCache, SupplierStore};
use serde_json::json;
use shared::{Supplier, SupplierCategory};
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

#[derive(Default)]
struct CountingDirectory {
    calls: AtomicUsize,
}

#[async_trait]
impl EntitySource for CountingDirectory {
    fn name(&self) -> &str {
        "ZC_MM_FORNECEDOR_Q001"
    }

    async fn fetch(&self, _query: &ODataQuery) -> FetchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let rows = [
            json!({"Fornecedor": "1", "NomeFornecedor": "Fresh Org", "CNPJ": "111", "CPF": ""}),
            json!({"Fornecedor": "2", "NomeFornecedor": "Fresh Person", "CNPJ": "", "CPF": "222"}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
        FetchOutcome::complete(rows, 1)
    }
}

fn seeded(path: &Path, minutes_old: u64) {
    let suppliers = vec![Supplier {
        id: "9".into(),
        name: "Cached Org".into(),
        tax_number: "999".into(),
        category: Some(SupplierCategory::Organization),
    }];
    FileSupplierStore::new(path).write(&suppliers).unwrap();
    let mtime = SystemTime::now() - Duration::from_secs(minutes_old * 60);
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(mtime)
        .unwrap();
}

fn cache(path: &Path, source: Arc<CountingDirectory>) -> SupplierCache {
    SupplierCache::new(Arc::new(FileSupplierStore::new(path)), source)
}

#[tokio::test]
async fn test_58_minute_old_file_is_served() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("suppliers.json");
    seeded(&path, 58);
    let source = Arc::new(CountingDirectory::default());
    let cache = cache(&path, source.clone());

    assert_eq!(cache.state(), CacheState::Fresh);
    let organizations = cache.get_or_refresh(SupplierCategory::Organization).await;

    assert_eq!(organizations[0].name, "Cached Org");
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_60_minute_old_file_is_refetched_once() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("suppliers.json");
    seeded(&path, 60);
    let source = Arc::new(CountingDirectory::default());
    let cache = cache(&path, source.clone());

    assert_eq!(cache.state(), CacheState::Stale);
    let first = cache.get_or_refresh(SupplierCategory::Organization).await;
    let second = cache.get_or_refresh(SupplierCategory::Organization).await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
    assert_eq!(first[0].name, "Fresh Org");
    assert_eq!(cache.state(), CacheState::Fresh);
}

#[tokio::test]
async fn test_corrupt_file_forces_refresh() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("suppliers.json");
    fs::write(&path, b"[{\"id\": truncated").unwrap();
    let source = Arc::new(CountingDirectory::default());
    let cache = cache(&path, source.clone());

    assert_eq!(cache.state(), CacheState::Missing);
    let individuals = cache.get_or_refresh(SupplierCategory::Individual).await;

    assert_eq!(individuals.len(), 1);
    assert_eq!(individuals[0].tax_number, "222");
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    let persisted: Vec<Supplier> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(persisted.len(), 2);
}
