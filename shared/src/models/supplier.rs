//! Supplier Model

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Supplier category, by tax document type (CPF for individuals, CNPJ for organizations)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplierCategory {
    Individual,
    Organization,
}

impl SupplierCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierCategory::Individual => "individual",
            SupplierCategory::Organization => "organization",
        }
    }
}

impl std::fmt::Display for SupplierCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown supplier category '{0}' (expected 'individual' or 'organization')")]
pub struct ParseCategoryError(pub String);

impl FromStr for SupplierCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "individual" | "cpf" => Ok(SupplierCategory::Individual),
            "organization" | "cnpj" => Ok(SupplierCategory::Organization),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

/// Supplier directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub tax_number: String,
    /// `None` when the ERP record carries no tax document
    #[serde(default)]
    pub category: Option<SupplierCategory>,
}

impl Supplier {
    pub fn is_category(&self, category: SupplierCategory) -> bool {
        self.category == Some(category)
    }
}
