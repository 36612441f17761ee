//! Crawler dependencies (using traits for testability)
//!
//! Builds every collaborator from [`Config`] and assembles the supervisor.
//! Tests assemble [`CrawlerDeps`] directly from mocks.

use anyhow::{Context, Result};
use chrono::Duration;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::crawl::{FreshnessGate, HtmlDump, NotificationEmitter, SessionDeps};
use crate::messaging::{DisabledRouter, NatsRouter};
use crate::renderers::{HttpRenderer, HttpRendererOptions};
use crate::stores::PostgresUrlStore;
use crate::supervisor::{ActiveTaskRegistry, LocalJobQueue, SessionJobRunner, SessionSupervisor};
use crate::traits::{MessageRouter, PageRenderer, UrlStore};

/// Collaborators shared by every session.
#[derive(Clone)]
pub struct CrawlerDeps {
    pub renderer: Arc<dyn PageRenderer>,
    pub store: Arc<dyn UrlStore>,
    pub router: Arc<dyn MessageRouter>,
    pub html_dump: Option<HtmlDump>,
    pub freshness_window: Duration,
    pub page_cap: Option<usize>,
    pub max_concurrent_crawls: usize,
}

impl CrawlerDeps {
    /// Connect to Postgres and the routing server and build the HTTP renderer.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = PostgresUrlStore::new(&config.database_url)
            .await
            .context("Failed to connect URL store")?;
        info!("URL store connected");

        let router: Arc<dyn MessageRouter> = match &config.routing_server {
            Some(server) => {
                let router = NatsRouter::connect(server, config.routing_subject.clone())
                    .await
                    .context("Failed to connect to routing server")?;
                info!(server = %server, subject = %config.routing_subject, "Routing server connected");
                Arc::new(router)
            }
            None => {
                warn!("ROUTING_SERVER not set, notifications disabled");
                Arc::new(DisabledRouter)
            }
        };

        let renderer = HttpRenderer::new(HttpRendererOptions {
            proxy: config.proxy.clone(),
            obey_robots: config.obey_robots,
            robots_agent: config.scraper_identity.clone(),
            accept_invalid_certs: config.accept_invalid_certs,
            ..Default::default()
        })
        .context("Failed to build HTTP renderer")?;

        Ok(Self {
            renderer: Arc::new(renderer),
            store: Arc::new(store),
            router,
            html_dump: config
                .debug_html
                .then(|| HtmlDump::new(config.debug_html_path.clone())),
            freshness_window: Duration::days(config.freshness_window_days),
            page_cap: config.page_cap(),
            max_concurrent_crawls: config.max_concurrent_crawls,
        })
    }

    pub fn with_page_cap(mut self, page_cap: Option<usize>) -> Self {
        self.page_cap = page_cap;
        self
    }

    pub fn session_deps(&self) -> SessionDeps {
        SessionDeps {
            renderer: Arc::clone(&self.renderer),
            store: Arc::clone(&self.store),
            notifier: NotificationEmitter::new(Arc::clone(&self.router)),
            html_dump: self.html_dump.clone(),
        }
    }

    /// Supervisor over a local worker pool running crawl sessions.
    pub fn supervisor(&self) -> SessionSupervisor {
        let runner = SessionJobRunner::new(self.session_deps(), self.page_cap);
        let queue = LocalJobQueue::new(Arc::new(runner), self.max_concurrent_crawls);
        let gate = FreshnessGate::new(Arc::clone(&self.store), self.freshness_window);

        SessionSupervisor::new(ActiveTaskRegistry::new(), gate, Arc::new(queue))
    }
}
