//! ERP Client - OData client for the SAP Gateway services
//!
//! Provides basic-authenticated, paginated reads of the entity sets the
//! receipts pipeline consumes.

pub mod config;
pub mod error;
pub mod filter;
pub mod odata;

pub use config::ErpConfig;
pub use error::{ClientError, ClientResult, ConfigError};
pub use filter::{Filter, ODataQuery};
pub use odata::{EntitySet, EntitySource, FetchFailure, FetchOutcome, ODataClient};

// Re-export shared types for convenience
pub use shared::RawRow;
