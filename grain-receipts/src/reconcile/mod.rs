//! Ticket/invoice reconciliation
//!
//! Tickets are the primary source; invoices only enrich them. Both are read
//! independently and joined on the application document number:
//!
//! 1. read tickets for the range (and partner)
//! 2. no tickets: stop, invoices are not queried
//! 3. read invoices for the same range (and partner)
//! 4. left-join tickets onto invoices
//!
//! Multiple invoices for one document fan the ticket out, one row per invoice.

pub mod join;
pub mod keys;
pub mod sources;

pub use join::left_join;
pub use keys::{derive_key, key_of};

use erp_client::{EntitySource, FetchOutcome};
use serde::Serialize;
use shared::{DateRange, RawRow};
use std::sync::Arc;

/// How one source contributed to a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    /// Every page was read
    Complete { rows: usize },
    /// Not queried
    Skipped,
    /// Pagination stopped on an error; `rows` arrived before it
    Degraded {
        rows: usize,
        failed_page: usize,
        reason: String,
    },
}

impl SourceStatus {
    fn from_outcome(outcome: &FetchOutcome) -> Self {
        match &outcome.failure {
            None => SourceStatus::Complete {
                rows: outcome.rows.len(),
            },
            Some(failure) => SourceStatus::Degraded {
                rows: outcome.rows.len(),
                failed_page: failure.page,
                reason: failure.error.to_string(),
            },
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SourceStatus::Degraded { .. })
    }
}

/// Joined rows plus the status of each source
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub rows: Vec<RawRow>,
    pub tickets: SourceStatus,
    pub invoices: SourceStatus,
}

/// Reads and joins weighing tickets and invoices
#[derive(Clone)]
pub struct Reconciler {
    tickets: Arc<dyn EntitySource>,
    invoices: Arc<dyn EntitySource>,
}

impl Reconciler {
    pub fn new(tickets: Arc<dyn EntitySource>, invoices: Arc<dyn EntitySource>) -> Self {
        Self { tickets, invoices }
    }

    /// Fetch tickets in `range` (optionally for one partner) joined with their invoices
    pub async fn fetch(&self, range: &DateRange, partner: Option<&str>) -> Reconciled {
        let partner = partner.map(str::trim).filter(|p| !p.is_empty());

        let ticket_outcome = self
            .tickets
            .fetch(&sources::ticket_query(range, partner))
            .await;
        let tickets = SourceStatus::from_outcome(&ticket_outcome);

        if ticket_outcome.is_empty() {
            match &tickets {
                SourceStatus::Degraded { reason, .. } => {
                    tracing::warn!(range = %range, reason = %reason, "Ticket fetch failed, no data")
                }
                _ => tracing::info!(range = %range, "No tickets in range"),
            }
            return Reconciled {
                rows: Vec::new(),
                tickets,
                invoices: SourceStatus::Skipped,
            };
        }

        let invoice_outcome = self
            .invoices
            .fetch(&sources::invoice_query(range, partner))
            .await;
        let invoices = SourceStatus::from_outcome(&invoice_outcome);
        if invoices.is_degraded() {
            tracing::warn!(
                source = self.invoices.name(),
                rows = invoice_outcome.rows.len(),
                "Invoice fetch incomplete, unmatched tickets will carry empty invoice fields"
            );
        }

        let fallback: Vec<String> = sources::INVOICE_FIELDS.iter().map(|f| f.to_string()).collect();
        let ticket_count = ticket_outcome.rows.len();
        let rows = left_join(
            ticket_outcome.rows,
            sources::TICKET_KEY_FIELD,
            &invoice_outcome.rows,
            sources::INVOICE_KEY_FIELD,
            &fallback,
        );

        tracing::info!(
            tickets = ticket_count,
            invoices = invoice_outcome.rows.len(),
            joined = rows.len(),
            "Reconciled tickets with invoices"
        );

        Reconciled {
            rows,
            tickets,
            invoices,
        }
    }
}
