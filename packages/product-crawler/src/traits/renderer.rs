//! Fetch-and-render collaborator.
//!
//! Traversal logic only ever sees a [`RenderedPage`] and its DOM handle, so
//! the HTTP fetcher can be swapped for a headless browser without touching
//! the crawl session.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::Html;

use crate::error::RenderResult;

/// A page returned by the renderer.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL that was requested
    pub url: String,

    /// URL after redirects
    pub final_url: String,

    /// Rendered HTML
    pub html: String,

    /// HTTP status, when the renderer knows it
    pub status: Option<u16>,

    pub fetched_at: DateTime<Utc>,
}

impl RenderedPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            html: html.into(),
            status: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn with_final_url(mut self, final_url: impl Into<String>) -> Self {
        self.final_url = final_url.into();
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Parse the HTML into a queryable DOM.
    ///
    /// `Html` is not `Send`; parse inside synchronous code and drop it before
    /// the next `.await`.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Fetch and render a single URL.
    async fn render(&self, url: &str) -> RenderResult<RenderedPage>;

    /// Renderer name (for logging).
    fn name(&self) -> &str {
        "unknown"
    }
}
