//! Supplier directory persistence
//!
//! The store only knows how to read and write the full directory together
//! with its last-write timestamp; freshness decisions live in the cache.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use shared::Supplier;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A persisted directory and the moment it was written
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot {
    pub suppliers: Vec<Supplier>,
    pub written_at: DateTime<Utc>,
}

/// Storage backend of the supplier cache
pub trait SupplierStore: Send + Sync {
    /// Current snapshot; `None` when nothing usable is stored
    fn read(&self) -> Option<CacheSnapshot>;

    /// Replace the stored directory, returning the committed timestamp
    fn write(&self, suppliers: &[Supplier]) -> Result<DateTime<Utc>, CacheError>;
}

/// JSON file store; the file modification time is the write timestamp
#[derive(Debug, Clone)]
pub struct FileSupplierStore {
    path: PathBuf,
}

impl FileSupplierStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn try_read(&self) -> Result<Option<CacheSnapshot>, CacheError> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let written_at = DateTime::<Utc>::from(metadata.modified()?);
        let json = fs::read_to_string(&self.path)?;
        let suppliers = serde_json::from_str(&json)?;
        Ok(Some(CacheSnapshot {
            suppliers,
            written_at,
        }))
    }
}

impl SupplierStore for FileSupplierStore {
    fn read(&self) -> Option<CacheSnapshot> {
        match self.try_read() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "Supplier cache unreadable, treating as missing"
                );
                None
            }
        }
    }

    /// Write to a temporary file next to the target, then rename over it
    fn write(&self, suppliers: &[Supplier]) -> Result<DateTime<Utc>, CacheError> {
        let dir = self.dir();
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, suppliers)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        let written_at = DateTime::<Utc>::from(fs::metadata(&self.path)?.modified()?);
        tracing::debug!(
            path = %self.path.display(),
            suppliers = suppliers.len(),
            "Supplier cache written"
        );
        Ok(written_at)
    }
}

/// In-process store, for tests and embedders without a writable disk
#[derive(Debug, Default)]
pub struct MemorySupplierStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    snapshot: Option<CacheSnapshot>,
    writes: usize,
}

impl MemorySupplierStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a snapshot written at `written_at`
    pub fn with_snapshot(suppliers: Vec<Supplier>, written_at: DateTime<Utc>) -> Self {
        Self {
            inner: Mutex::new(MemoryState {
                snapshot: Some(CacheSnapshot {
                    suppliers,
                    written_at,
                }),
                writes: 0,
            }),
        }
    }

    /// Number of writes since creation
    pub fn writes(&self) -> usize {
        self.inner.lock().writes
    }
}

impl SupplierStore for MemorySupplierStore {
    fn read(&self) -> Option<CacheSnapshot> {
        self.inner.lock().snapshot.clone()
    }

    fn write(&self, suppliers: &[Supplier]) -> Result<DateTime<Utc>, CacheError> {
        let written_at = Utc::now();
        let mut inner = self.inner.lock();
        inner.snapshot = Some(CacheSnapshot {
            suppliers: suppliers.to_vec(),
            written_at,
        });
        inner.writes += 1;
        Ok(written_at)
    }
}
