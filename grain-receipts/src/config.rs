//! Application configuration
//!
//! | Variable | Default |
//! |---|---|
//! | SAP_USER / SAP_PASS | required |
//! | API_ROMANEIO_URL / API_FATURA_URL | required |
//! | API_FORNECEDOR_URL | API_ROMANEIO_URL |
//! | ERP_TIMEOUT_SECS | 120 |
//! | ERP_PAGE_SIZE | 20000 |
//! | SUPPLIER_CACHE_PATH | ./work_dir/cache/suppliers.json |
//! | SUPPLIER_CACHE_TTL_MINUTES | 59 |
//! | LOG_LEVEL | info |
//! | LOG_JSON | false |
//! | LOG_DIR | (console only) |

use crate::suppliers::DEFAULT_FRESHNESS_MINUTES;
use erp_client::{ConfigError, ErpConfig};
use std::path::PathBuf;

pub const DEFAULT_SUPPLIER_CACHE_PATH: &str = "./work_dir/cache/suppliers.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub erp: ErpConfig,
    pub supplier_cache_path: PathBuf,
    pub supplier_cache_ttl_minutes: i64,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let erp = ErpConfig::from_lookup(&lookup)?;
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let supplier_cache_ttl_minutes = match non_empty("SUPPLIER_CACHE_TTL_MINUTES") {
            None => DEFAULT_FRESHNESS_MINUTES,
            Some(v) => match v.trim().parse::<i64>() {
                Ok(minutes) if minutes > 0 => minutes,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "SUPPLIER_CACHE_TTL_MINUTES",
                        reason: format!("expected a positive number of minutes, got '{v}'"),
                    });
                }
            },
        };

        Ok(Self {
            erp,
            supplier_cache_path: non_empty("SUPPLIER_CACHE_PATH")
                .unwrap_or_else(|| DEFAULT_SUPPLIER_CACHE_PATH.into())
                .into(),
            supplier_cache_ttl_minutes,
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: non_empty("LOG_JSON")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            log_dir: non_empty("LOG_DIR"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let mut map: HashMap<String, String> = [
            ("SAP_USER", "svc_grain"),
            ("SAP_PASS", "secret"),
            ("API_ROMANEIO_URL", "https://erp.example.com/sap/opu/odata/sap/ROMANEIO_SRV"),
            ("API_FATURA_URL", "https://erp.example.com/sap/opu/odata/sap/FATURA_SRV"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in vars {
            map.insert(k.to_string(), v.to_string());
        }
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.supplier_cache_path, PathBuf::from(DEFAULT_SUPPLIER_CACHE_PATH));
        assert_eq!(config.supplier_cache_ttl_minutes, 59);
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert!(config.log_dir.is_none());
        assert_eq!(config.erp.timeout, 120);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("SUPPLIER_CACHE_PATH", "/var/cache/grain/suppliers.json"),
            ("SUPPLIER_CACHE_TTL_MINUTES", "15"),
            ("LOG_LEVEL", "debug"),
            ("LOG_JSON", "true"),
            ("LOG_DIR", "/var/log/grain"),
        ]))
        .unwrap();
        assert_eq!(config.supplier_cache_path, PathBuf::from("/var/cache/grain/suppliers.json"));
        assert_eq!(config.supplier_cache_ttl_minutes, 15);
        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/grain"));
    }

    #[test]
    fn test_invalid_ttl() {
        let err = Config::from_lookup(lookup(&[("SUPPLIER_CACHE_TTL_MINUTES", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SUPPLIER_CACHE_TTL_MINUTES", .. }));
    }

    #[test]
    fn test_missing_erp_credentials() {
        let err = Config::from_lookup(lookup(&[("SAP_PASS", "")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SAP_PASS"));
    }
}
