//! Freshness gate: skip domains scraped within the freshness window.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::traits::UrlStore;

pub const DEFAULT_FRESHNESS_WINDOW_DAYS: i64 = 90;

/// Decides whether a domain was scraped too recently to crawl again.
///
/// Store failures propagate; the gate never fails open or closed.
#[derive(Clone)]
pub struct FreshnessGate {
    store: Arc<dyn UrlStore>,
    window: Duration,
}

impl FreshnessGate {
    pub fn new(store: Arc<dyn UrlStore>, window: Duration) -> Self {
        Self { store, window }
    }

    pub fn with_days(store: Arc<dyn UrlStore>, days: i64) -> Self {
        Self::new(store, Duration::days(days))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// True iff the domain has a record scraped within the window.
    pub async fn should_skip(&self, domain: &str) -> Result<bool> {
        self.should_skip_at(domain, Utc::now()).await
    }

    pub async fn should_skip_at(&self, domain: &str, now: DateTime<Utc>) -> Result<bool> {
        let Some(last) = self.store.last_scrape_time(domain).await? else {
            debug!(domain = %domain, "No previous scrape");
            return Ok(false);
        };

        let fresh = now - last < self.window;
        debug!(domain = %domain, last_scrape = %last, fresh, "Freshness checked");
        Ok(fresh)
    }
}
