//! Crawl jobs and the bounded worker pool that runs them.
//!
//! ```text
//! enqueue(job, lease)
//!     │
//!     └─► supervising task ── waits for a pool permit
//!             │
//!             ├─► worker task: JobRunner::run(job)
//!             └─► outcome logged, lease dropped (registry entry released)
//! ```
//!
//! The worker runs in its own task, so a panicking crawl surfaces as a
//! `JoinError` in the supervising task instead of taking the process down.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::registry::TaskLease;
use crate::crawl::{CrawlSession, SessionDeps, SessionReport};
use crate::error::Result;

/// Default worker-pool size.
pub const DEFAULT_MAX_CONCURRENT_CRAWLS: usize = 5;

/// Serializable descriptor of one crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlJob {
    pub seed_url: String,
    /// Sender identity for notifications
    pub requester: String,
    /// Caller correlation token; `None` suppresses notification
    pub origin_id: Option<String>,
}

impl CrawlJob {
    pub const JOB_TYPE: &'static str = "crawl_seed";

    pub fn new(
        seed_url: impl Into<String>,
        requester: impl Into<String>,
        origin_id: Option<String>,
    ) -> Self {
        Self {
            seed_url: seed_url.into(),
            requester: requester.into(),
            origin_id,
        }
    }
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed(SessionReport),
    Failed(String),
    /// The worker panicked or was cancelled
    Crashed(String),
}

/// Handle to an enqueued job.
pub struct JobHandle {
    pub job_id: Uuid,
    completion: JoinHandle<JobOutcome>,
}

impl JobHandle {
    /// Wait for the job to finish.
    pub async fn wait(self) -> JobOutcome {
        self.completion
            .await
            .unwrap_or_else(|e| JobOutcome::Crashed(e.to_string()))
    }
}

/// Executes one crawl job.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, job: CrawlJob) -> Result<SessionReport>;
}

/// Dispatches accepted crawls to isolated execution units.
pub trait JobQueue: Send + Sync {
    /// Enqueue a job. The lease is held until the job ends.
    fn enqueue(&self, job: CrawlJob, lease: TaskLease) -> JobHandle;
}

/// Runs a crawl session per job.
pub struct SessionJobRunner {
    deps: SessionDeps,
    page_cap: Option<usize>,
}

impl SessionJobRunner {
    pub fn new(deps: SessionDeps, page_cap: Option<usize>) -> Self {
        Self { deps, page_cap }
    }
}

#[async_trait]
impl JobRunner for SessionJobRunner {
    async fn run(&self, job: CrawlJob) -> Result<SessionReport> {
        let mut session = CrawlSession::new(&job.seed_url, job.requester, job.origin_id)?
            .with_page_cap(self.page_cap);
        session.run(&self.deps).await
    }
}

/// In-process worker pool bounded by a semaphore.
pub struct LocalJobQueue {
    runner: Arc<dyn JobRunner>,
    permits: Arc<Semaphore>,
}

impl LocalJobQueue {
    pub fn new(runner: Arc<dyn JobRunner>, max_concurrent: usize) -> Self {
        Self {
            runner,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn available_workers(&self) -> usize {
        self.permits.available_permits()
    }
}

impl JobQueue for LocalJobQueue {
    fn enqueue(&self, job: CrawlJob, lease: TaskLease) -> JobHandle {
        let job_id = lease.job_id();
        let runner = Arc::clone(&self.runner);
        let permits = Arc::clone(&self.permits);

        let completion = tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    warn!(job_id = %job_id, error = %e, "Worker pool closed, job dropped");
                    return JobOutcome::Failed(e.to_string());
                }
            };

            let seed = job.seed_url.clone();
            info!(job_id = %job_id, job_type = CrawlJob::JOB_TYPE, seed = %seed, "Crawl job started");

            let worker = tokio::spawn(async move { runner.run(job).await });
            let outcome = match worker.await {
                Ok(Ok(report)) => JobOutcome::Completed(report),
                Ok(Err(e)) => {
                    error!(job_id = %job_id, seed = %seed, error = %e, "Crawl job failed");
                    JobOutcome::Failed(e.to_string())
                }
                Err(e) => {
                    error!(job_id = %job_id, seed = %seed, error = %e, "Crawl worker crashed");
                    JobOutcome::Crashed(e.to_string())
                }
            };

            drop(lease);
            outcome
        });

        JobHandle { job_id, completion }
    }
}
