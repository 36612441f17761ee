//! Typed errors for the product crawler.
//!
//! Uses `thiserror` for library errors; binaries wrap these with `anyhow`.

use thiserror::Error;

/// Errors that can occur while running a crawl.
#[derive(Debug, Error)]
pub enum CrawlerError {
    /// No host-like substring could be derived from the URL
    #[error("malformed URL: {url}")]
    MalformedUrl { url: String },

    /// Persistence collaborator unreachable or failed
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Fetch-and-render collaborator failed
    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    /// Outbound notification failed
    #[error("notification failed: {0}")]
    Notify(#[from] MessagingError),

    /// A structured-data block could not be parsed
    #[error("structured data parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Local I/O failure (debug dumps, sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl CrawlerError {
    /// Wrap any store failure as `StoreUnavailable`.
    pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::StoreUnavailable(Box::new(e))
    }

    pub fn malformed(url: impl Into<String>) -> Self {
        Self::MalformedUrl { url: url.into() }
    }
}

/// Errors reported by the fetch-and-render collaborator.
#[derive(Debug, Error)]
pub enum RenderError {
    /// URL looks like a log-in or authentication page
    #[error("login page detected: {url}")]
    LoginPageDetected { url: String },

    /// Transport failure or non-success status
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The page was fetched but could not be turned into a document
    #[error("render failed for {url}: {reason}")]
    Render { url: String, reason: String },

    /// robots.txt disallows crawling
    #[error("robots.txt disallows: {url}")]
    RobotsDisallowed { url: String },

    /// URL could not be parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl RenderError {
    pub fn fetch(url: impl Into<String>, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Fetch {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Policy skips are not failures: the page is dropped without expanding the frontier.
    pub fn is_policy_skip(&self) -> bool {
        matches!(
            self,
            Self::LoginPageDetected { .. } | Self::RobotsDisallowed { .. }
        )
    }
}

/// Errors reported by the messaging collaborator.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// No routing server configured
    #[error("routing server not configured")]
    NotConfigured,

    /// Transport-level failure
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The routing server answered with `success: false`
    #[error("routing server rejected message on topic {topic}")]
    Rejected { topic: String },

    /// Envelope could not be encoded or the reply decoded
    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for render operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Result type alias for messaging operations.
pub type MessagingResult<T> = std::result::Result<T, MessagingError>;
