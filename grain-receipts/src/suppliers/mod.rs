//! Supplier directory
//!
//! The directory changes slowly, so it is fetched in full and cached on disk.
//! Callers filter the cached directory by category in memory.

pub mod cache;
pub mod store;

pub use cache::{CacheState, DEFAULT_FRESHNESS_MINUTES, SupplierCache};
pub use store::{CacheError, CacheSnapshot, FileSupplierStore, MemorySupplierStore, SupplierStore};

use erp_client::ODataQuery;
use serde_json::Value;
use shared::{RawRow, Supplier, SupplierCategory};
use std::collections::HashSet;

pub const SUPPLIER_ENTITY_SET: &str = "ZC_MM_FORNECEDOR_Q001";

pub const SUPPLIER_ID_FIELD: &str = "Fornecedor";
pub const SUPPLIER_NAME_FIELD: &str = "NomeFornecedor";
pub const ORGANIZATION_TAX_FIELD: &str = "CNPJ";
pub const INDIVIDUAL_TAX_FIELD: &str = "CPF";

pub const SUPPLIER_FIELDS: [&str; 4] = [
    SUPPLIER_ID_FIELD,
    SUPPLIER_NAME_FIELD,
    ORGANIZATION_TAX_FIELD,
    INDIVIDUAL_TAX_FIELD,
];

/// Full-directory query; the directory is never filtered server-side
pub fn supplier_query() -> ODataQuery {
    ODataQuery::new().select(SUPPLIER_FIELDS)
}

fn text(row: &RawRow, field: &str) -> String {
    match row.get(field) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Map one ERP row to a supplier; rows without an identifier are unusable
pub fn supplier_from_raw(row: &RawRow) -> Option<Supplier> {
    let id = text(row, SUPPLIER_ID_FIELD);
    if id.is_empty() {
        return None;
    }

    let cnpj = text(row, ORGANIZATION_TAX_FIELD);
    let cpf = text(row, INDIVIDUAL_TAX_FIELD);
    let (tax_number, category) = if !cnpj.is_empty() {
        (cnpj, Some(SupplierCategory::Organization))
    } else if !cpf.is_empty() {
        (cpf, Some(SupplierCategory::Individual))
    } else {
        (String::new(), None)
    };

    Some(Supplier {
        id,
        name: text(row, SUPPLIER_NAME_FIELD),
        tax_number,
        category,
    })
}

/// Build the directory: deduplicate on (id, tax number) keeping the first
/// occurrence, then sort by name and id
pub fn build_directory(rows: &[RawRow]) -> Vec<Supplier> {
    let mut seen = HashSet::new();
    let mut suppliers: Vec<Supplier> = rows
        .iter()
        .filter_map(supplier_from_raw)
        .filter(|s| seen.insert((s.id.clone(), s.tax_number.clone())))
        .collect();
    suppliers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    suppliers
}

/// Suppliers of one category; uncategorized entries never match
pub fn filter_by_category(suppliers: &[Supplier], category: SupplierCategory) -> Vec<Supplier> {
    suppliers
        .iter()
        .filter(|s| s.is_category(category))
        .cloned()
        .collect()
}
