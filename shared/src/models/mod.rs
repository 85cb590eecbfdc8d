//! Data models
//!
//! - `transaction`: canonical columns and the normalized transaction table
//! - `supplier`: supplier directory entries

pub mod supplier;
pub mod transaction;

pub use supplier::{ParseCategoryError, Supplier, SupplierCategory};
pub use transaction::{
    is_numeric_header, Column, NormalizedTable, WeightTotals, CANONICAL_COLUMNS,
};
