//! Crawl session: single-domain frontier traversal as an explicit state machine.
//!
//! Pages are processed one at a time:
//!
//! ```text
//! Created → Fetching → Classifying → Extracting → Persisting → ExpandingFrontier → (Fetching | Done)
//! ```
//!
//! The session alone mutates `visited` and `notified`; nothing is shared
//! across sessions.

use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::debug_dump::HtmlDump;
use super::notify::NotificationEmitter;
use super::persist::persist_page;
use crate::classify::analyze;
use crate::domain::{canonical_seed, is_login_page, normalize_domain};
use crate::error::{CrawlerError, RenderError, Result};
use crate::traits::{PageRenderer, UrlStore};
use crate::types::RecordUpdate;

/// Page cap applied in quick-crawl test mode.
pub const QUICK_CRAWL_PAGE_CAP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Created,
    Fetching,
    Classifying,
    Extracting,
    Persisting,
    ExpandingFrontier,
    Done,
}

/// Collaborators a session runs against.
#[derive(Clone)]
pub struct SessionDeps {
    pub renderer: Arc<dyn PageRenderer>,
    pub store: Arc<dyn UrlStore>,
    pub notifier: NotificationEmitter,
    /// Raw HTML dump, when enabled
    pub html_dump: Option<HtmlDump>,
}

/// Summary logged when a session ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub seed: String,
    pub domain: String,
    /// Fetch attempts
    pub pages_visited: usize,
    pub pages_persisted: usize,
    pub products_found: usize,
    /// Login pages, robots exclusions and failed fetches
    pub pages_skipped: usize,
    pub notified: bool,
}

/// One crawl of a seed URL and its same-domain reachable pages.
pub struct CrawlSession {
    seed: String,
    domain: String,
    requester: String,
    origin_id: Option<String>,
    visited: HashSet<String>,
    frontier: VecDeque<String>,
    notified: bool,
    state: SessionState,
    page_cap: Option<usize>,
    report: SessionReport,
}

impl CrawlSession {
    /// Create a session for a seed URL.
    ///
    /// The seed's scheme defaults to `http://`. Fails with `MalformedUrl`
    /// when no domain can be derived from the seed.
    pub fn new(
        seed_url: &str,
        requester: impl Into<String>,
        origin_id: Option<String>,
    ) -> Result<Self> {
        let seed = canonical_seed(seed_url);
        let domain = normalize_domain(&seed)?;

        let mut visited = HashSet::new();
        visited.insert(seed.clone());

        Ok(Self {
            report: SessionReport {
                seed: seed.clone(),
                domain: domain.clone(),
                ..Default::default()
            },
            frontier: VecDeque::from([seed.clone()]),
            seed,
            domain,
            requester: requester.into(),
            origin_id,
            visited,
            notified: false,
            state: SessionState::Created,
            page_cap: None,
        })
    }

    /// Cap the number of fetch attempts.
    pub fn with_page_cap(mut self, cap: Option<usize>) -> Self {
        self.page_cap = cap;
        self
    }

    /// Quick-crawl test mode: at most [`QUICK_CRAWL_PAGE_CAP`] pages.
    pub fn quick(self) -> Self {
        self.with_page_cap(Some(QUICK_CRAWL_PAGE_CAP))
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn requester(&self) -> &str {
        &self.requester
    }

    pub fn origin_id(&self) -> Option<&str> {
        self.origin_id.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn notified(&self) -> bool {
        self.notified
    }

    /// Once set, never cleared.
    pub(crate) fn mark_notified(&mut self) {
        self.notified = true;
        self.report.notified = true;
    }

    pub fn has_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Drive the traversal until the frontier is exhausted or the page cap is hit.
    ///
    /// Page-level failures are logged and skipped. `StoreUnavailable` ends the
    /// session with an error.
    pub async fn run(&mut self, deps: &SessionDeps) -> Result<SessionReport> {
        info!(
            seed = %self.seed,
            domain = %self.domain,
            renderer = deps.renderer.name(),
            page_cap = ?self.page_cap,
            "Crawl session started"
        );

        while let Some(url) = self.frontier.pop_front() {
            if self.page_cap_reached() {
                info!(seed = %self.seed, pages = self.report.pages_visited, "Page cap reached");
                break;
            }

            if let Err(e) = self.process_page(&url, deps).await {
                error!(seed = %self.seed, url = %url, error = %e, "Crawl session aborted");
                return Err(e);
            }
        }

        self.transition(SessionState::Done);
        info!(
            seed = %self.seed,
            domain = %self.domain,
            visited = self.report.pages_visited,
            persisted = self.report.pages_persisted,
            products = self.report.products_found,
            skipped = self.report.pages_skipped,
            notified = self.notified,
            "Crawl session finished"
        );
        Ok(self.report.clone())
    }

    fn page_cap_reached(&self) -> bool {
        self.page_cap
            .is_some_and(|cap| self.report.pages_visited >= cap)
    }

    async fn process_page(&mut self, url: &str, deps: &SessionDeps) -> Result<()> {
        self.transition(SessionState::Fetching);

        if is_login_page(url) {
            self.skip_page(&RenderError::LoginPageDetected {
                url: url.to_string(),
            });
            return Ok(());
        }

        self.report.pages_visited += 1;
        let page = match deps.renderer.render(url).await {
            Ok(page) => page,
            Err(e) => {
                self.skip_page(&e);
                return Ok(());
            }
        };

        if let Some(dump) = &deps.html_dump {
            dump.append(&page).await;
        }

        self.transition(SessionState::Classifying);
        let analysis = analyze(&page);
        debug!(
            url = %url,
            source_type = %analysis.likelihood.source_type,
            score = analysis.likelihood.score,
            links = analysis.links.len(),
            "Page classified"
        );

        let mut update = RecordUpdate::new(page.fetched_at).with_meta(analysis.meta);
        if let Some(extraction) = analysis.extraction {
            self.transition(SessionState::Extracting);
            self.report.products_found += 1;
            update = update
                .with_product(extraction.product)
                .with_price(extraction.price)
                .with_images(extraction.images);
        }

        self.transition(SessionState::Persisting);
        let record_id = match persist_page(deps.store.as_ref(), url, &update).await {
            Ok(id) => id,
            Err(CrawlerError::MalformedUrl { url }) => {
                warn!(url = %url, "Malformed URL, page not persisted");
                self.report.pages_skipped += 1;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        self.report.pages_persisted += 1;

        deps.notifier
            .notify_if_qualifying(self, record_id, &update)
            .await;

        self.transition(SessionState::ExpandingFrontier);
        self.expand_frontier(&analysis.links);
        Ok(())
    }

    fn skip_page(&mut self, reason: &RenderError) {
        self.report.pages_skipped += 1;
        if reason.is_policy_skip() {
            debug!(seed = %self.seed, reason = %reason, "Page skipped by policy");
        } else {
            warn!(seed = %self.seed, error = %reason, "Page fetch failed, continuing");
        }
    }

    /// Admit newly discovered links.
    ///
    /// Every unseen link is marked visited before dispatch; only same-domain
    /// links are queued for fetching.
    fn expand_frontier(&mut self, links: &[String]) {
        let mut admitted = 0;
        for link in links {
            if link.starts_with("javascript:") {
                continue;
            }
            if !self.visited.insert(link.clone()) {
                continue;
            }
            match normalize_domain(link) {
                Ok(domain) if domain == self.domain => {
                    self.frontier.push_back(link.clone());
                    admitted += 1;
                }
                _ => {}
            }
        }
        debug!(seed = %self.seed, admitted, frontier = self.frontier.len(), "Frontier expanded");
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!(seed = %self.seed, from = ?self.state, to = ?next, "Session state");
            self.state = next;
        }
    }
}
