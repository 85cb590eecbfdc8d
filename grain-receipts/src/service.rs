//! Receipt service
//!
//! Entry point used by consumers: transactions go through
//! fetch -> join -> normalize, suppliers through the disk cache.

use crate::config::Config;
use crate::normalize::normalize;
use crate::reconcile::sources::{INVOICE_ENTITY_SET, TICKET_ENTITY_SET};
use crate::reconcile::{Reconciler, SourceStatus};
use crate::suppliers::{FileSupplierStore, SUPPLIER_ENTITY_SET, SupplierCache};
use erp_client::ClientResult;
use serde::Serialize;
use shared::{DateRange, NormalizedTable, Supplier, SupplierCategory, WeightTotals};
use std::sync::Arc;

/// Normalized transactions plus how each source fared
#[derive(Debug, Clone, Serialize)]
pub struct TransactionSet {
    pub range: String,
    pub partner: Option<String>,
    pub table: NormalizedTable,
    pub totals: WeightTotals,
    pub tickets: SourceStatus,
    pub invoices: SourceStatus,
}

impl TransactionSet {
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Whether any source stopped early
    pub fn is_degraded(&self) -> bool {
        self.tickets.is_degraded() || self.invoices.is_degraded()
    }
}

#[derive(Clone)]
pub struct ReceiptService {
    reconciler: Reconciler,
    suppliers: SupplierCache,
}

impl ReceiptService {
    pub fn new(reconciler: Reconciler, suppliers: SupplierCache) -> Self {
        Self {
            reconciler,
            suppliers,
        }
    }

    /// Wire the service to the configured ERP and cache file
    pub fn from_config(config: &Config) -> ClientResult<Self> {
        let client = config.erp.build_client()?;
        let erp = &config.erp;

        let reconciler = Reconciler::new(
            Arc::new(client.entity_set(&erp.ticket_service_url, TICKET_ENTITY_SET)),
            Arc::new(client.entity_set(&erp.invoice_service_url, INVOICE_ENTITY_SET)),
        );
        let suppliers = SupplierCache::new(
            Arc::new(FileSupplierStore::new(&config.supplier_cache_path)),
            Arc::new(client.entity_set(&erp.supplier_service_url, SUPPLIER_ENTITY_SET)),
        )
        .with_freshness(chrono::Duration::minutes(config.supplier_cache_ttl_minutes));

        Ok(Self::new(reconciler, suppliers))
    }

    /// Normalized transactions in `range`, optionally for one partner
    pub async fn fetch_transactions(&self, range: DateRange, partner: Option<&str>) -> TransactionSet {
        let reconciled = self.reconciler.fetch(&range, partner).await;
        let table = normalize(reconciled.rows);
        let totals = table.totals();

        TransactionSet {
            range: range.to_string(),
            partner: partner.map(str::trim).filter(|p| !p.is_empty()).map(String::from),
            table,
            totals,
            tickets: reconciled.tickets,
            invoices: reconciled.invoices,
        }
    }

    /// Suppliers of one category, from the cache when fresh
    pub async fn fetch_suppliers(&self, category: SupplierCategory) -> Vec<Supplier> {
        self.suppliers.get_or_refresh(category).await
    }

    /// Force a directory refresh, then filter it
    pub async fn refresh_suppliers(&self, category: SupplierCategory) -> Vec<Supplier> {
        SupplierCache::filter(&self.suppliers.refresh().await, category)
    }

    pub fn supplier_cache(&self) -> &SupplierCache {
        &self.suppliers
    }
}
