//! In-memory URL store for tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::error::{CrawlerError, Result};
use crate::traits::UrlStore;
use crate::types::{RecordId, RecordUpdate, UrlRecord};

/// In-memory URL records keyed by raw URL.
///
/// Data is lost on restart. [`MemoryUrlStore::set_unavailable`] makes every
/// call fail with `StoreUnavailable`.
#[derive(Default)]
pub struct MemoryUrlStore {
    records: RwLock<HashMap<String, UrlRecord>>,
    unavailable: AtomicBool,
}

impl MemoryUrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable backend.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Seed a record directly, bypassing upsert semantics.
    pub fn insert(&self, record: UrlRecord) {
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(record.raw_url.clone(), record);
    }

    pub fn record_count(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// All records, in no particular order.
    pub fn records(&self) -> Vec<UrlRecord> {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CrawlerError::store(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "memory store marked unavailable",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UrlStore for MemoryUrlStore {
    async fn get_by_url(&self, raw_url: &str) -> Result<Option<UrlRecord>> {
        self.check_available()?;
        Ok(self
            .records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(raw_url)
            .cloned())
    }

    async fn get_by_domain(&self, domain: &str) -> Result<Vec<UrlRecord>> {
        self.check_available()?;
        Ok(self
            .records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|r| r.domain == domain)
            .cloned()
            .collect())
    }

    async fn last_scrape_time(&self, domain: &str) -> Result<Option<DateTime<Utc>>> {
        self.check_available()?;
        Ok(self
            .records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|r| r.domain == domain)
            .map(|r| r.last_scrape_time)
            .max())
    }

    async fn upsert(&self, raw_url: &str, domain: &str, update: &RecordUpdate) -> Result<RecordId> {
        self.check_available()?;
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());

        let record = records
            .entry(raw_url.to_string())
            .and_modify(|existing| existing.apply(domain, update))
            .or_insert_with(|| UrlRecord::from_update(raw_url, domain, update));
        Ok(record.id)
    }
}
