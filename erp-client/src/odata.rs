//! OData page fetcher
//!
//! Reads an entity set page by page, following the `d.__next` continuation
//! link until the server stops sending one. Reads are best-effort: the first
//! failing page ends pagination and whatever arrived before it is returned
//! together with the failure.

use crate::{ClientError, ClientResult, ErpConfig, ODataQuery};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use shared::RawRow;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Transport-only field the Gateway attaches to every record
const METADATA_FIELD: &str = "__metadata";

/// Longest response-body excerpt kept in a status error
const ERROR_BODY_LIMIT: usize = 200;

/// OData V2 JSON envelope: `{"d": {"results": [...], "__next": "..."}}`
#[derive(Debug, Deserialize)]
struct ODataEnvelope {
    d: ODataPage,
}

#[derive(Debug, Deserialize)]
struct ODataPage {
    #[serde(default)]
    results: Vec<RawRow>,
    #[serde(rename = "__next")]
    next: Option<String>,
}

/// Page that ended a read early
#[derive(Debug)]
pub struct FetchFailure {
    /// 1-based number of the page that failed
    pub page: usize,
    pub error: ClientError,
}

/// Result of reading one entity set
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Rows of every successful page, in arrival order
    pub rows: Vec<RawRow>,
    /// Number of pages read successfully
    pub pages: usize,
    /// Set when pagination stopped on an error rather than on the last page
    pub failure: Option<FetchFailure>,
}

impl FetchOutcome {
    /// Outcome of a read that finished normally
    pub fn complete(rows: Vec<RawRow>, pages: usize) -> Self {
        Self {
            rows,
            pages,
            failure: None,
        }
    }

    /// Outcome of a read that stopped on `error` at page `page`
    pub fn failed(rows: Vec<RawRow>, page: usize, error: ClientError) -> Self {
        Self {
            rows,
            pages: page.saturating_sub(1),
            failure: Some(FetchFailure { page, error }),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Basic-authenticated OData client
#[derive(Clone)]
pub struct ODataClient {
    client: Client,
    username: String,
    password: String,
    page_size: u32,
}

impl std::fmt::Debug for ODataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ODataClient")
            .field("username", &self.username)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl ODataClient {
    /// Create a new client from configuration
    pub fn new(config: &ErpConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            username: config.username.clone(),
            password: config.password.clone(),
            page_size: config.page_size,
        })
    }

    /// Bind this client to one entity set
    pub fn entity_set(&self, service_url: &str, name: &str) -> EntitySet {
        EntitySet {
            client: self.clone(),
            service_url: service_url.trim_end_matches('/').to_string(),
            name: name.to_string(),
        }
    }

    /// Read every page of `entity_set` under `service_url` matching `query`
    #[tracing::instrument(skip(self, query))]
    pub async fn fetch_all(
        &self,
        service_url: &str,
        entity_set: &str,
        query: &ODataQuery,
    ) -> FetchOutcome {
        let url = format!("{}/{}", service_url.trim_end_matches('/'), entity_set);
        let params = query.params(self.page_size);

        let mut rows: Vec<RawRow> = Vec::new();
        let mut pages = 0usize;
        let mut next: Option<String> = None;
        let mut visited: HashSet<String> = HashSet::new();

        loop {
            let page_no = pages + 1;
            // Continuation links already encode every query option
            let request = match &next {
                None => self.client.get(&url).query(&params),
                Some(link) => self.client.get(link),
            };

            let page = match self.get_page(request).await {
                Ok(page) => page,
                Err(error) => {
                    tracing::warn!(
                        page = page_no,
                        rows = rows.len(),
                        error = %error,
                        "OData page fetch failed, returning partial result"
                    );
                    return FetchOutcome::failed(rows, page_no, error);
                }
            };

            pages = page_no;
            let batch = page.results.len();
            rows.extend(page.results.into_iter().map(strip_metadata));
            tracing::debug!(page = page_no, batch, total = rows.len(), "OData page received");

            match page.next {
                Some(link) if batch > 0 => {
                    if !visited.insert(link.clone()) {
                        tracing::warn!(
                            link = %link,
                            rows = rows.len(),
                            "Continuation link repeated, stopping pagination"
                        );
                        let error = ClientError::RepeatedCursor(link);
                        return FetchOutcome::failed(rows, page_no + 1, error);
                    }
                    next = Some(link);
                }
                _ => break,
            }
        }

        tracing::info!(pages, rows = rows.len(), "OData read complete");
        FetchOutcome::complete(rows, pages)
    }

    /// Send one page request and decode its envelope
    async fn get_page(&self, request: RequestBuilder) -> ClientResult<ODataPage> {
        let response = request
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > ERROR_BODY_LIMIT {
                let cut = (0..=ERROR_BODY_LIMIT)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let envelope: ODataEnvelope = serde_json::from_str(&text)?;
        Ok(envelope.d)
    }
}

fn strip_metadata(mut row: RawRow) -> RawRow {
    row.shift_remove(METADATA_FIELD);
    row
}

/// A readable entity set
///
/// The seam between the pipeline and the network; tests substitute fakes.
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Entity set name, for logging
    fn name(&self) -> &str;

    /// Read all rows matching `query`
    async fn fetch(&self, query: &ODataQuery) -> FetchOutcome;
}

/// Entity set on a concrete OData service
#[derive(Debug, Clone)]
pub struct EntitySet {
    client: ODataClient,
    service_url: String,
    name: String,
}

impl EntitySet {
    pub fn service_url(&self) -> &str {
        &self.service_url
    }
}

#[async_trait]
impl EntitySource for EntitySet {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, query: &ODataQuery) -> FetchOutcome {
        self.client
            .fetch_all(&self.service_url, &self.name, query)
            .await
    }
}

#[async_trait]
impl<T: EntitySource + ?Sized> EntitySource for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch(&self, query: &ODataQuery) -> FetchOutcome {
        (**self).fetch(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parsing() {
        let body = r#"{"d":{"results":[{"__metadata":{"uri":"x"},"Parceiro":"42"}],"__next":"https://erp/next"}}"#;
        let envelope: ODataEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.d.results.len(), 1);
        assert_eq!(envelope.d.next.as_deref(), Some("https://erp/next"));

        let row = strip_metadata(envelope.d.results.into_iter().next().unwrap());
        assert!(!row.contains_key(METADATA_FIELD));
        assert_eq!(row["Parceiro"], "42");
    }

    #[test]
    fn test_envelope_without_results() {
        let envelope: ODataEnvelope = serde_json::from_str(r#"{"d":{}}"#).unwrap();
        assert!(envelope.d.results.is_empty());
        assert!(envelope.d.next.is_none());
    }

    #[test]
    fn test_failed_outcome_counts_pages() {
        let error = ClientError::Status {
            status: 500,
            body: String::new(),
        };
        let outcome = FetchOutcome::failed(Vec::new(), 3, error);
        assert_eq!(outcome.pages, 2);
        assert!(!outcome.is_complete());
    }
}
