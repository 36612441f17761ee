//! Mock renderer for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::error::{RenderError, RenderResult};
use crate::traits::{PageRenderer, RenderedPage};

/// Serves canned HTML by URL and records every request.
///
/// Unknown URLs fail with a fetch error. URLs marked with
/// [`MockRenderer::disallow_url`] fail as robots.txt exclusions.
///
/// # Example
///
/// ```rust
/// use product_crawler::renderers::MockRenderer;
///
/// let mock = MockRenderer::new()
///     .with_page("https://www.shop.com/", r#"<a href="/cap">Cap</a>"#);
/// ```
#[derive(Default, Clone)]
pub struct MockRenderer {
    pages: Arc<RwLock<HashMap<String, String>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    disallowed: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&self, url: impl Into<String>, html: impl Into<String>) {
        self.pages
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.into(), html.into());
    }

    /// Builder form of [`MockRenderer::add_page`].
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.add_page(url, html);
        self
    }

    /// Make a URL fail with a fetch error even if a page is registered.
    pub fn fail_url(&self, url: impl Into<String>) {
        self.failing
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.into());
    }

    /// Make a URL fail as if robots.txt disallowed it.
    pub fn disallow_url(&self, url: impl Into<String>) {
        self.disallowed
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.into());
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl PageRenderer for MockRenderer {
    async fn render(&self, url: &str) -> RenderResult<RenderedPage> {
        self.calls
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());

        if self
            .disallowed
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(url)
        {
            return Err(RenderError::RobotsDisallowed {
                url: url.to_string(),
            });
        }

        if self
            .failing
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(url)
        {
            return Err(RenderError::fetch(url, "simulated fetch failure"));
        }

        let html = self
            .pages
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(url)
            .cloned();

        match html {
            Some(html) => Ok(RenderedPage::new(url, html).with_status(200)),
            None => Err(RenderError::fetch(url, "HTTP 404 Not Found")),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
