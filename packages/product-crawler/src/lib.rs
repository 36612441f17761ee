//! Single-domain product crawler.
//!
//! Crawls a seed URL and every same-domain page reachable from it, detects
//! pages that describe a purchasable product, persists per-URL records, and
//! notifies the routing server once per session when the first product with
//! a title and images turns up.
//!
//! # Usage
//!
//! ```rust,ignore
//! use product_crawler::{CrawlSession, SessionDeps, NotificationEmitter};
//! use product_crawler::renderers::MockRenderer;
//! use product_crawler::stores::MemoryUrlStore;
//! use product_crawler::messaging::TestRouter;
//!
//! let deps = SessionDeps {
//!     renderer: Arc::new(MockRenderer::new().with_page("http://shop.com/", html)),
//!     store: Arc::new(MemoryUrlStore::new()),
//!     notifier: NotificationEmitter::new(Arc::new(TestRouter::new())),
//!     html_dump: None,
//! };
//! let report = CrawlSession::new("shop.com", "client", None)?.quick().run(&deps).await?;
//! ```
//!
//! # Modules
//!
//! - [`domain`] - Domain normalization shared by lookups and inserts
//! - [`classify`] - Product detection and extraction
//! - [`crawl`] - Crawl session state machine, freshness gate, persistence, notification
//! - [`supervisor`] - Active-task registry, worker pool, request admission
//! - [`server`] - HTTP control endpoint
//! - [`traits`] - Collaborator seams (renderer, store, router)
//! - [`renderers`], [`stores`], [`messaging`] - Collaborator implementations

pub mod classify;
pub mod config;
pub mod crawl;
pub mod deps;
pub mod domain;
pub mod error;
pub mod messaging;
pub mod renderers;
pub mod security;
pub mod server;
pub mod stores;
pub mod supervisor;
pub mod traits;
pub mod types;

pub use config::Config;
pub use crawl::{
    CrawlSession, FreshnessGate, NotificationEmitter, SessionDeps, SessionReport, SessionState,
};
pub use deps::CrawlerDeps;
pub use domain::{canonical_seed, ensure_scheme, normalize_domain};
pub use error::{CrawlerError, MessagingError, RenderError, Result};
pub use supervisor::{Ack, ActiveTaskRegistry, SessionSupervisor};
pub use traits::{MessageRouter, PageRenderer, RenderedPage, UrlStore};
pub use types::{ProductLikelihood, RecordId, RecordUpdate, SourceType, UrlRecord};
