//! Grain receipts
//!
//! Reads weighing tickets and invoices of agricultural receipts from the ERP
//! OData services, reconciles them into one table and serves the supplier
//! directory from a disk cache.
//!
//! ```text
//! grain-receipts/src/
//! ├── reconcile/     # ticket + invoice fetch and left join
//! ├── normalize.rs   # raw rows -> NormalizedTable
//! ├── suppliers/     # supplier directory, store and cache
//! ├── service.rs     # ReceiptService facade
//! ├── config.rs      # environment configuration
//! └── utils/         # logging
//! ```

pub mod config;
pub mod normalize;
pub mod reconcile;
pub mod service;
pub mod suppliers;
pub mod utils;

pub use config::Config;
pub use normalize::normalize;
pub use reconcile::{Reconciled, Reconciler, SourceStatus};
pub use service::{ReceiptService, TransactionSet};
pub use suppliers::{
    CacheError, CacheSnapshot, CacheState, FileSupplierStore, MemorySupplierStore, SupplierCache,
    SupplierStore,
};
pub use utils::init_logger_with_file;
