//! Crawl sessions and the per-page pipeline they drive.

pub mod debug_dump;
pub mod freshness;
pub mod notify;
pub mod persist;
pub mod session;

pub use debug_dump::HtmlDump;
pub use freshness::{FreshnessGate, DEFAULT_FRESHNESS_WINDOW_DAYS};
pub use notify::NotificationEmitter;
pub use persist::persist_page;
pub use session::{
    CrawlSession, SessionDeps, SessionReport, SessionState, QUICK_CRAWL_PAGE_CAP,
};
