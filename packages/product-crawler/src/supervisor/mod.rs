//! Session supervisor: admits start-crawl requests and dispatches sessions.
//!
//! Admission order for a seed:
//!
//! 1. canonicalize the seed (`http://` by default, fragment dropped), so
//!    equivalent spellings share one registry entry
//! 2. claim the seed in the [`ActiveTaskRegistry`]
//! 3. run the [`FreshnessGate`] on the seed's domain
//! 4. enqueue a [`CrawlJob`] and acknowledge immediately
//!
//! The registry is claimed before the freshness check, so two concurrent
//! requests for one seed can never both reach the gate.

pub mod jobs;
pub mod registry;

pub use jobs::{
    CrawlJob, JobHandle, JobOutcome, JobQueue, JobRunner, LocalJobQueue, SessionJobRunner,
    DEFAULT_MAX_CONCURRENT_CRAWLS,
};
pub use registry::{ActiveTaskRegistry, TaskHandle, TaskLease};

use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::crawl::FreshnessGate;
use crate::domain::{canonical_seed, normalize_domain};

/// Acknowledgment for a start-crawl request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    /// A session was dispatched
    Accepted { seed: String, job_id: Uuid },
    /// A session for this seed is already running
    AlreadyRunning { seed: String, job_id: Uuid },
    /// The domain was scraped within the freshness window
    Fresh { seed: String, domain: String },
    /// Malformed seed or store failure; details are logged
    Rejected { seed: String, reason: String },
}

impl Ack {
    pub fn seed(&self) -> &str {
        match self {
            Self::Accepted { seed, .. }
            | Self::AlreadyRunning { seed, .. }
            | Self::Fresh { seed, .. }
            | Self::Rejected { seed, .. } => seed,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

pub struct SessionSupervisor {
    registry: ActiveTaskRegistry,
    gate: FreshnessGate,
    queue: Arc<dyn JobQueue>,
}

impl SessionSupervisor {
    pub fn new(registry: ActiveTaskRegistry, gate: FreshnessGate, queue: Arc<dyn JobQueue>) -> Self {
        Self {
            registry,
            gate,
            queue,
        }
    }

    pub fn registry(&self) -> &ActiveTaskRegistry {
        &self.registry
    }

    /// Number of sessions currently registered.
    pub fn active_sessions(&self) -> usize {
        self.registry.len()
    }

    /// Admit a start-crawl request. The crawl itself runs asynchronously.
    pub async fn on_start_crawl_request(
        &self,
        seed_url: &str,
        requester: &str,
        origin_id: Option<String>,
    ) -> Ack {
        self.submit(seed_url, requester, origin_id).await.0
    }

    /// Admit a request and return the job handle when a session was dispatched.
    pub async fn submit(
        &self,
        seed_url: &str,
        requester: &str,
        origin_id: Option<String>,
    ) -> (Ack, Option<JobHandle>) {
        let seed = canonical_seed(seed_url);

        let domain = match normalize_domain(&seed) {
            Ok(domain) => domain,
            Err(e) => {
                warn!(seed = %seed, error = %e, "Rejected start-crawl request");
                return (
                    Ack::Rejected {
                        seed,
                        reason: e.to_string(),
                    },
                    None,
                );
            }
        };

        let lease = match self.registry.try_register(&seed) {
            Ok(lease) => lease,
            Err(existing) => {
                info!(seed = %seed, job_id = %existing.job_id, "Crawl already in progress");
                return (
                    Ack::AlreadyRunning {
                        seed,
                        job_id: existing.job_id,
                    },
                    None,
                );
            }
        };

        // Dropping the lease on an early return releases the seed
        match self.gate.should_skip(&domain).await {
            Ok(false) => {}
            Ok(true) => {
                info!(seed = %seed, domain = %domain, "Domain scraped recently, skipping");
                return (Ack::Fresh { seed, domain }, None);
            }
            Err(e) => {
                error!(seed = %seed, domain = %domain, error = %e, "Freshness check failed, request aborted");
                return (
                    Ack::Rejected {
                        seed,
                        reason: e.to_string(),
                    },
                    None,
                );
            }
        }

        let handle = self
            .queue
            .enqueue(CrawlJob::new(seed.clone(), requester, origin_id), lease);
        info!(seed = %seed, domain = %domain, job_id = %handle.job_id, "Crawl accepted");

        (
            Ack::Accepted {
                seed,
                job_id: handle.job_id,
            },
            Some(handle),
        )
    }

    /// Run one crawl to completion without an origin id, so no notification is sent.
    pub async fn crawl_now(&self, seed_url: &str, requester: &str) -> (Ack, Option<JobOutcome>) {
        match self.submit(seed_url, requester, None).await {
            (ack, Some(handle)) => (ack, Some(handle.wait().await)),
            (ack, None) => (ack, None),
        }
    }
}
