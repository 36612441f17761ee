//! Persistence collaborator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{RecordId, RecordUpdate, UrlRecord};

/// Key-value store of URL records.
///
/// Implementations report every backend failure as
/// [`CrawlerError::StoreUnavailable`](crate::error::CrawlerError::StoreUnavailable).
#[async_trait]
pub trait UrlStore: Send + Sync {
    /// Get a record by its raw URL.
    async fn get_by_url(&self, raw_url: &str) -> Result<Option<UrlRecord>>;

    /// Get every record for a normalized domain.
    async fn get_by_domain(&self, domain: &str) -> Result<Vec<UrlRecord>>;

    /// Most recent scrape time among records of a domain.
    async fn last_scrape_time(&self, domain: &str) -> Result<Option<DateTime<Utc>>> {
        let records = self.get_by_domain(domain).await?;
        Ok(records.iter().map(|r| r.last_scrape_time).max())
    }

    /// Insert or overwrite the record keyed by `raw_url`.
    ///
    /// Only fields present in `update` overwrite; on insert the rest default
    /// to empty. Returns the record's identifier.
    async fn upsert(&self, raw_url: &str, domain: &str, update: &RecordUpdate) -> Result<RecordId>;
}
