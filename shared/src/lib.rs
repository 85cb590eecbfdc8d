//! Shared types for the grain receipts workspace
//!
//! Row and cell types used by the ERP client and the reconciliation
//! pipeline, the canonical transaction table, supplier records, and
//! the validated date range callers query with.

pub mod models;
pub mod range;
pub mod row;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    is_numeric_header, Column, NormalizedTable, ParseCategoryError, Supplier, SupplierCategory,
    WeightTotals, CANONICAL_COLUMNS,
};
pub use range::{DateRange, RangeError, MAX_RANGE_DAYS};
pub use row::{CellValue, RawRow};
